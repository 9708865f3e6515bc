//! Catalog seeding from config.toml
//!
//! Shows listed under `[[shows]]` (each with `[[shows.showtimes]]` entries) are
//! created on startup through the normal show creation pipeline. Re-running
//! the seed against an existing database hits the "time slot already exists"
//! conflict for shows already present; those are logged and skipped.

use crate::core::schedule::ShowtimeSlot;
use crate::core::show::{NewShow, ShowService};
use crate::errors::{ErrorKind, Result};
use serde::Deserialize;
use tracing::{info, warn};

/// Configuration for a single seeded show
#[derive(Debug, Deserialize, Clone)]
pub struct ShowSeed {
    /// Show name
    pub name: String,
    /// Long-form description
    pub description: String,
    /// Catalog category (e.g. "play", "musical")
    pub category: String,
    /// Venue
    pub location: String,
    /// Price in points
    pub price: i64,
    /// Optional poster image
    #[serde(default)]
    pub image_url: Option<String>,
    /// Seats per showtime
    pub total_seats: i32,
    /// Slots with `date = "YYYY-MM-DD"`, `start_time`/`end_time = "HH:MM:SS"`
    pub showtimes: Vec<ShowtimeSlot>,
}

impl From<ShowSeed> for NewShow {
    fn from(seed: ShowSeed) -> Self {
        Self {
            name: seed.name,
            description: seed.description,
            category: seed.category,
            location: seed.location,
            price: seed.price,
            image_url: seed.image_url,
            total_seats: seed.total_seats,
            showtimes: seed.showtimes,
        }
    }
}

/// Outcome counts of a seeding run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    /// Shows created or extended by this run
    pub created: usize,
    /// Shows skipped because their slots were already stored
    pub skipped: usize,
}

/// Creates every seeded show, skipping ones whose slots already exist.
///
/// # Errors
/// Any failure other than a schedule conflict aborts the run.
pub async fn seed_catalog(service: &ShowService, seeds: &[ShowSeed]) -> Result<SeedSummary> {
    info!("Seeding catalog with {} show(s) from config", seeds.len());
    let mut summary = SeedSummary::default();
    for seed in seeds {
        match service.create_show(&NewShow::from(seed.clone())).await {
            Ok(details) => {
                info!(
                    show_id = details.show.id,
                    showtimes = details.showtimes.len(),
                    "Seeded show '{}'",
                    seed.name
                );
                summary.created += 1;
            }
            Err(e) if e.kind() == ErrorKind::ScheduleConflict => {
                warn!("Show '{}' already seeded ({}). Skipping.", seed.name, e);
                summary.skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::config::settings::{BookingSettings, parse_config};
    use crate::test_utils::setup_test_db;

    const SEED: &str = r#"
        [[shows]]
        name = "The Tempest"
        description = "Shakespeare in the park"
        category = "play"
        location = "Open Air Stage"
        price = 50
        total_seats = 120

        [[shows.showtimes]]
        date = "2024-05-01"
        start_time = "18:00:00"
        end_time = "20:00:00"

        [[shows.showtimes]]
        date = "2024-05-02"
        start_time = "18:00:00"
        end_time = "20:00:00"
    "#;

    #[test]
    fn test_parse_show_seed() {
        let config = parse_config(SEED).unwrap();
        assert_eq!(config.shows.len(), 1);
        let seed = &config.shows[0];
        assert_eq!(seed.name, "The Tempest");
        assert_eq!(seed.total_seats, 120);
        assert!(seed.image_url.is_none());
        assert_eq!(seed.showtimes.len(), 2);
        assert_eq!(seed.showtimes[1].date.to_string(), "2024-05-02");
    }

    #[tokio::test]
    async fn test_seed_is_repeatable() -> Result<()> {
        let db = setup_test_db().await?;
        let config = parse_config(SEED)?;
        let service = ShowService::new(db, BookingSettings::default());

        let first = seed_catalog(&service, &config.shows).await?;
        assert_eq!(first, SeedSummary { created: 1, skipped: 0 });

        let second = seed_catalog(&service, &config.shows).await?;
        assert_eq!(second, SeedSummary { created: 0, skipped: 1 });
        Ok(())
    }
}

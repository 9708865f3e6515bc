//! Show creation - Validates a schedule and writes the show with its seat inventory.
//!
//! The whole pipeline runs in one transaction: look up an identical show (per
//! [`ExistingShowPolicy`]), validate the proposed showtimes against it, insert
//! the show if it is new, then open the seat inventory for each showtime.

use crate::{
    config::settings::{BookingSettings, ExistingShowPolicy},
    core::{
        catalog::ShowDetails,
        ledger,
        schedule::{self, ScheduleRules, ShowRef, ShowtimeSlot},
    },
    entities::{Show, Showtime, show, showtime},
    errors::{Error, Result},
};
use sea_orm::{DatabaseTransaction, QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Deserialize;
use tracing::{info, instrument};

/// A show creation request.
#[derive(Debug, Clone, Deserialize)]
pub struct NewShow {
    /// Display name, must not be blank
    pub name: String,
    /// Long-form description
    pub description: String,
    /// Catalog category (e.g. "musical")
    pub category: String,
    /// Venue
    pub location: String,
    /// Price in points, non-negative
    pub price: i64,
    /// Optional poster image
    #[serde(default)]
    pub image_url: Option<String>,
    /// Seats per showtime, positive
    pub total_seats: i32,
    /// Slots to schedule, at least one
    pub showtimes: Vec<ShowtimeSlot>,
}

impl NewShow {
    fn validate(&self) -> Result<()> {
        let invalid = |message: &str| -> Result<()> {
            Err(Error::InvalidInput {
                message: message.to_string(),
            })
        };
        if self.name.trim().is_empty() {
            return invalid("show name cannot be empty");
        }
        if self.price < 0 {
            return invalid("price cannot be negative");
        }
        if self.total_seats <= 0 {
            return invalid("total_seats must be positive");
        }
        Ok(())
    }
}

/// Creates shows and their showtimes.
#[derive(Debug, Clone)]
pub struct ShowService {
    db: DatabaseConnection,
    settings: BookingSettings,
}

impl ShowService {
    /// Creates a service over `db` governed by `settings`.
    #[must_use]
    pub const fn new(db: DatabaseConnection, settings: BookingSettings) -> Self {
        Self { db, settings }
    }

    /// Creates a show, or extends an identical existing show's schedule.
    ///
    /// # Errors
    /// `InvalidInput` for bad show fields or an empty/malformed schedule,
    /// `ScheduleConflict` for overlapping or already persisted slots.
    #[instrument(skip(self, new_show), fields(name = %new_show.name))]
    pub async fn create_show(&self, new_show: &NewShow) -> Result<ShowDetails> {
        new_show.validate()?;

        let txn = self.db.begin().await?;

        let existing = match self.settings.existing_show_policy {
            ExistingShowPolicy::AppendShowtimes => find_identical_show(&txn, new_show).await?,
            ExistingShowPolicy::AlwaysCreate => None,
        };

        let rules = ScheduleRules {
            check_overlap_with_persisted: self.settings.check_overlap_with_persisted,
        };

        let (show, mut showtimes, schedule) = match existing {
            Some((show, persisted)) => {
                let show_ref = ShowRef::Existing {
                    total_seats: show.total_seats,
                    showtimes: &persisted,
                };
                let schedule = schedule::validate_and_materialize_schedule_with(
                    &show_ref,
                    &new_show.showtimes,
                    rules,
                )?;
                info!(show_id = show.id, "Appending showtimes to existing show");
                (show, persisted, schedule)
            }
            None => {
                let show_ref = ShowRef::New {
                    total_seats: new_show.total_seats,
                };
                let schedule = schedule::validate_and_materialize_schedule_with(
                    &show_ref,
                    &new_show.showtimes,
                    rules,
                )?;
                let show = insert_show(&txn, new_show).await?;
                info!(show_id = show.id, "Created show");
                (show, Vec::new(), schedule)
            }
        };

        showtimes.extend(ledger::open_inventory(&txn, show.id, &schedule).await?);
        txn.commit().await?;

        Ok(ShowDetails::new(show, showtimes))
    }
}

/// Looks up a show equal to `new_show` on every descriptive field, with its showtimes.
async fn find_identical_show(
    txn: &DatabaseTransaction,
    new_show: &NewShow,
) -> Result<Option<(show::Model, Vec<showtime::Model>)>> {
    let mut query = Show::find()
        .filter(show::Column::Name.eq(new_show.name.trim()))
        .filter(show::Column::Description.eq(new_show.description.as_str()))
        .filter(show::Column::Category.eq(new_show.category.as_str()))
        .filter(show::Column::Location.eq(new_show.location.as_str()))
        .filter(show::Column::Price.eq(new_show.price))
        .filter(show::Column::TotalSeats.eq(new_show.total_seats));
    query = match &new_show.image_url {
        Some(url) => query.filter(show::Column::ImageUrl.eq(url.as_str())),
        None => query.filter(show::Column::ImageUrl.is_null()),
    };

    let Some(show) = query.order_by_asc(show::Column::Id).one(txn).await? else {
        return Ok(None);
    };
    let showtimes = Showtime::find()
        .filter(showtime::Column::ShowId.eq(show.id))
        .all(txn)
        .await?;
    Ok(Some((show, showtimes)))
}

async fn insert_show(txn: &DatabaseTransaction, new_show: &NewShow) -> Result<show::Model> {
    let now = chrono::Utc::now();
    let show = show::ActiveModel {
        name: Set(new_show.name.trim().to_string()),
        description: Set(new_show.description.clone()),
        category: Set(new_show.category.clone()),
        location: Set(new_show.location.clone()),
        price: Set(new_show.price),
        image_url: Set(new_show.image_url.clone()),
        total_seats: Set(new_show.total_seats),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(show.insert(txn).await?)
}

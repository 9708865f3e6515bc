//! Booking policy settings loaded from config.toml
//!
//! The `[booking]` table tunes the reservation engine; the `[[shows]]` array
//! seeds the catalog (see [`crate::config::catalog`]). Every field has a
//! default, and a missing config file yields the defaults with no seed shows.

use crate::config::catalog::ShowSeed;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

/// Default config location, overridable with `BOOKING_CONFIG`.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// What show creation does when an identical show already exists.
///
/// Two shows are identical when name, description, category, location, price,
/// image and seat count all match exactly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExistingShowPolicy {
    /// Add the proposed showtimes to the identical show's schedule.
    #[default]
    AppendShowtimes,
    /// Never match; every request creates a new show.
    AlwaysCreate,
}

/// Tunables for the reservation engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BookingSettings {
    /// Retries for transient lock conflicts before surfacing a storage failure
    pub max_transaction_retries: u32,
    /// Linear backoff step between retries, in milliseconds
    pub retry_backoff_ms: u64,
    /// Report an empty reservation listing as `NoReservations` instead of `Ok([])`
    pub empty_listing_is_error: bool,
    /// Matching rule for show creation against existing shows
    pub existing_show_policy: ExistingShowPolicy,
    /// Apply the overlap rule to persisted showtimes, not only exact duplicates
    pub check_overlap_with_persisted: bool,
    /// Balance given to users created without an explicit one
    pub default_user_points: i64,
}

impl Default for BookingSettings {
    fn default() -> Self {
        Self {
            max_transaction_retries: 3,
            retry_backoff_ms: 20,
            empty_listing_is_error: true,
            existing_show_policy: ExistingShowPolicy::AppendShowtimes,
            check_overlap_with_persisted: false,
            default_user_points: 1_000_000,
        }
    }
}

/// The whole config.toml file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Engine policy
    pub booking: BookingSettings,
    /// Shows to seed at startup
    pub shows: Vec<ShowSeed>,
}

/// Parses configuration from a TOML string.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads configuration from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read or its TOML is invalid.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;
    parse_config(&contents)
}

/// Loads configuration from `BOOKING_CONFIG` or `./config.toml`.
///
/// A missing file is not an error: defaults are used and nothing is seeded.
pub fn load_default_config() -> Result<AppConfig> {
    let path = std::env::var("BOOKING_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    if !Path::new(&path).exists() {
        warn!("No config file at {}, using default booking settings", path);
        return Ok(AppConfig::default());
    }
    load_config(path)
}

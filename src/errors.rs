//! Unified error type for the booking engine.
//!
//! Every business-rule violation is a distinct variant so the request layer can
//! pick a response category from [`Error::kind`] without string matching.

use chrono::{NaiveDate, NaiveTime};
use std::fmt;
use thiserror::Error;

/// Why a proposed schedule was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// Two slots on the same date intersect.
    Overlap,
    /// The exact `(date, start, end)` slot is already persisted for the show.
    SlotExists,
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overlap => f.write_str("showtime overlap"),
            Self::SlotExists => f.write_str("time slot already exists"),
        }
    }
}

/// Coarse outcome categories exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or empty input.
    InvalidInput,
    /// Overlapping or duplicate showtime.
    ScheduleConflict,
    /// User, show, showtime or reservations absent.
    NotFound,
    /// No seats left for the showtime.
    SoldOut,
    /// Point balance below the show price.
    InsufficientFunds,
    /// The user already holds a reservation for this showtime.
    DuplicateReservation,
    /// Transaction or commit failure from the persistence layer.
    StorageFailure,
    /// Startup configuration problem.
    Config,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Schedule conflict ({kind}) on {date} {start_time}-{end_time}")]
    ScheduleConflict {
        kind: ConflictKind,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    },

    #[error("User {id} not found")]
    UserNotFound { id: i64 },

    #[error("Show {id} not found")]
    ShowNotFound { id: i64 },

    #[error("Showtime {showtime_id} not found for show {show_id}")]
    ShowtimeNotFound { show_id: i64, showtime_id: i64 },

    #[error("No reservations found")]
    NoReservations,

    #[error("Showtime {showtime_id} is sold out")]
    SoldOut { showtime_id: i64 },

    #[error("Insufficient points: balance {current}, required {required}")]
    InsufficientFunds { current: i64, required: i64 },

    #[error("User {user_id} already holds a reservation for showtime {showtime_id}")]
    DuplicateReservation { user_id: i64, showtime_id: i64 },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Collapses the variant to the category the caller maps to a response.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Config { .. } | Self::Io(_) => ErrorKind::Config,
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::ScheduleConflict { .. } => ErrorKind::ScheduleConflict,
            Self::UserNotFound { .. }
            | Self::ShowNotFound { .. }
            | Self::ShowtimeNotFound { .. }
            | Self::NoReservations => ErrorKind::NotFound,
            Self::SoldOut { .. } => ErrorKind::SoldOut,
            Self::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            Self::DuplicateReservation { .. } => ErrorKind::DuplicateReservation,
            Self::Database(_) => ErrorKind::StorageFailure,
        }
    }

    /// True for lock contention the transaction manager may retry.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        let Self::Database(err) = self else {
            return false;
        };
        let message = err.to_string().to_ascii_lowercase();
        [
            "database is locked",
            "database table is locked",
            "sqlite_busy",
            "deadlock detected",
            "could not serialize access",
            "lock wait timeout",
        ]
        .iter()
        .any(|needle| message.contains(needle))
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

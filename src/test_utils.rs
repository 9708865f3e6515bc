//! Shared test utilities for the booking engine.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    config::settings::BookingSettings,
    core::{
        ledger,
        schedule::{MaterializedShowtime, ShowtimeSlot},
        show::{NewShow, ShowService},
        user,
    },
    entities::{show, showtime},
    errors::Result,
};
use chrono::{Days, NaiveDate, NaiveTime};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set, TransactionTrait};
use tempfile::TempDir;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a file-backed `SQLite` database in a fresh temporary directory.
///
/// Unlike `sqlite::memory:`, this gets a real multi-connection pool, so
/// concurrent transactions contend for the write lock. Keep the returned
/// [`TempDir`] alive for as long as the connection is used.
pub async fn setup_file_test_db() -> Result<(TempDir, DatabaseConnection)> {
    let dir = TempDir::new()?;
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("booking.sqlite").display());
    let db = sea_orm::Database::connect(url).await?;
    crate::config::database::create_tables(&db).await?;
    Ok((dir, db))
}

/// 2024-05-01, the date every default test slot falls on.
#[must_use]
pub fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 1).unwrap_or_default()
}

/// A time of day on the whole minute.
#[must_use]
pub fn test_time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
}

/// Builds a slot from an ISO date and `(hour, minute)` pairs.
#[must_use]
pub fn test_slot(date: &str, start: (u32, u32), end: (u32, u32)) -> ShowtimeSlot {
    ShowtimeSlot {
        date: date.parse().unwrap_or_else(|_| test_date()),
        start_time: test_time(start.0, start.1),
        end_time: test_time(end.0, end.1),
    }
}

/// A show creation request with one 18:00-20:00 slot on [`test_date`].
///
/// # Defaults
/// * `description`: "A test show"
/// * `category`: "general"
/// * `location`: "Main Hall"
/// * `image_url`: None
#[must_use]
pub fn test_new_show(name: &str, price: i64, total_seats: i32) -> NewShow {
    NewShow {
        name: name.to_string(),
        description: "A test show".to_string(),
        category: "general".to_string(),
        location: "Main Hall".to_string(),
        price,
        image_url: None,
        total_seats,
        showtimes: vec![test_slot("2024-05-01", (18, 0), (20, 0))],
    }
}

/// Creates a user with the given balance.
pub async fn create_test_user(
    db: &DatabaseConnection,
    username: &str,
    points: i64,
) -> Result<crate::entities::user::Model> {
    user::create_user(db, username, points).await
}

/// Inserts a show row without any showtimes.
pub async fn create_test_show(
    db: &DatabaseConnection,
    name: &str,
    price: i64,
    total_seats: i32,
) -> Result<show::Model> {
    let now = chrono::Utc::now();
    let show = show::ActiveModel {
        name: Set(name.to_string()),
        description: Set("A test show".to_string()),
        category: Set("general".to_string()),
        location: Set("Main Hall".to_string()),
        price: Set(price),
        image_url: Set(None),
        total_seats: Set(total_seats),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(show.insert(db).await?)
}

/// Adds `count` 18:00-20:00 showtimes on consecutive days from [`test_date`].
pub async fn add_test_showtimes(
    db: &DatabaseConnection,
    show_id: i64,
    seats: i32,
    count: u64,
) -> Result<Vec<showtime::Model>> {
    let schedule: Vec<MaterializedShowtime> = (0..count)
        .map(|offset| MaterializedShowtime {
            slot: ShowtimeSlot {
                date: test_date()
                    .checked_add_days(Days::new(offset))
                    .unwrap_or_default(),
                start_time: test_time(18, 0),
                end_time: test_time(20, 0),
            },
            available_seats: seats,
        })
        .collect();

    let txn = db.begin().await?;
    let created = ledger::open_inventory(&txn, show_id, &schedule).await?;
    txn.commit().await?;
    Ok(created)
}

/// Creates a show with a single showtime through the normal creation pipeline.
/// Returns (show, showtime).
pub async fn create_show_with_showtime(
    db: &DatabaseConnection,
    name: &str,
    price: i64,
    total_seats: i32,
) -> Result<(show::Model, showtime::Model)> {
    let service = ShowService::new(db.clone(), BookingSettings::default());
    let mut details = service
        .create_show(&test_new_show(name, price, total_seats))
        .await?;
    let showtime = details.showtimes.remove(0);
    Ok((details.show, showtime))
}

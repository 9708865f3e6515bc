//! Database configuration module for the booking engine.
//!
//! Handles the `SQLite` connection and table creation using `SeaORM`. Tables are
//! generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust models. The uniqueness of
//! `(user, show, showtime)` on reservations is enforced here with a unique index,
//! backing up the duplicate check done inside the reservation transaction.

use crate::entities::{Reservation, Show, Showtime, User, reservation};
use crate::errors::Result;
use sea_orm::sea_query::Index;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::{debug, info};

/// Fallback used when `DATABASE_URL` is not set.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/showtime_booking.sqlite?mode=rwc";

/// Name of the unique index guarding one reservation per user and showtime.
pub const RESERVATION_UNIQUE_INDEX: &str = "idx_reservations_user_show_showtime";

/// Gets the database URL from environment variable or returns default `SQLite` path.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database at `database_url`.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Connecting to database at {}", database_url);
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates all booking tables and indexes if they do not exist yet.
///
/// Tables are created parent-first so the foreign keys generated from the
/// `belongs_to` relations resolve.
pub async fn create_tables<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let user_table = schema.create_table_from_entity(User).if_not_exists().to_owned();
    let show_table = schema.create_table_from_entity(Show).if_not_exists().to_owned();
    let showtime_table = schema
        .create_table_from_entity(Showtime)
        .if_not_exists()
        .to_owned();
    let reservation_table = schema
        .create_table_from_entity(Reservation)
        .if_not_exists()
        .to_owned();

    db.execute(builder.build(&user_table)).await?;
    db.execute(builder.build(&show_table)).await?;
    db.execute(builder.build(&showtime_table)).await?;
    db.execute(builder.build(&reservation_table)).await?;

    let unique_reservation = Index::create()
        .name(RESERVATION_UNIQUE_INDEX)
        .table(Reservation)
        .col(reservation::Column::UserId)
        .col(reservation::Column::ShowId)
        .col(reservation::Column::ShowtimeId)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&unique_reservation)).await?;

    info!("Booking schema is ready");
    Ok(())
}

//! Reservation transactions - Books one seat for one user, atomically.
//!
//! `create_reservation` loads the user, show and showtime, checks the booking
//! preconditions, applies both ledger mutations and writes the reservation row,
//! all inside a single database transaction. Any failure drops the transaction,
//! so no seat decrement or point debit outlives a failed attempt.
//!
//! The early checks give precise errors for the common case. Under concurrency
//! they may read stale counters, so the guarded ledger updates and the unique
//! reservation index are what actually enforce the invariants.

use crate::{
    config::settings::BookingSettings,
    core::{
        catalog::{self, ReservationDetails},
        ledger,
    },
    entities::{Reservation, Show, Showtime, User, reservation, showtime},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, SqlErr, TransactionTrait, prelude::*};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Owns the reservation transaction boundary.
#[derive(Debug, Clone)]
pub struct ReservationManager {
    db: DatabaseConnection,
    settings: BookingSettings,
}

impl ReservationManager {
    /// Creates a manager over `db` governed by `settings`.
    #[must_use]
    pub const fn new(db: DatabaseConnection, settings: BookingSettings) -> Self {
        Self { db, settings }
    }

    /// Reserves a seat on `showtime_id` of `show_id` for `user_id`, paying the show price.
    ///
    /// Transient lock conflicts are retried up to `max_transaction_retries`
    /// times; every other error is returned as is.
    ///
    /// # Errors
    /// `UserNotFound`, `ShowNotFound`, `ShowtimeNotFound` (also when the
    /// showtime belongs to another show), `SoldOut`, `InsufficientFunds`,
    /// `DuplicateReservation`, or `Database` for storage failures.
    #[instrument(skip(self))]
    pub async fn create_reservation(
        &self,
        user_id: i64,
        show_id: i64,
        showtime_id: i64,
    ) -> Result<reservation::Model> {
        retry_transient(&self.settings, move || {
            self.try_create(user_id, show_id, showtime_id)
        })
        .await
    }

    async fn try_create(
        &self,
        user_id: i64,
        show_id: i64,
        showtime_id: i64,
    ) -> Result<reservation::Model> {
        let txn = self.db.begin().await?;

        let user = User::find_by_id(user_id)
            .one(&txn)
            .await?
            .ok_or(Error::UserNotFound { id: user_id })?;
        let show = Show::find_by_id(show_id)
            .one(&txn)
            .await?
            .ok_or(Error::ShowNotFound { id: show_id })?;
        let showtime = Showtime::find_by_id(showtime_id)
            .filter(showtime::Column::ShowId.eq(show_id))
            .one(&txn)
            .await?
            .ok_or(Error::ShowtimeNotFound {
                show_id,
                showtime_id,
            })?;

        if showtime.available_seats <= 0 {
            return Err(Error::SoldOut { showtime_id });
        }
        if user.points < show.price {
            return Err(Error::InsufficientFunds {
                current: user.points,
                required: show.price,
            });
        }

        let already_booked = Reservation::find()
            .filter(reservation::Column::UserId.eq(user_id))
            .filter(reservation::Column::ShowId.eq(show_id))
            .filter(reservation::Column::ShowtimeId.eq(showtime_id))
            .one(&txn)
            .await?
            .is_some();
        if already_booked {
            return Err(Error::DuplicateReservation {
                user_id,
                showtime_id,
            });
        }

        ledger::debit_points(&txn, user_id, show.price).await?;
        ledger::reserve_seat(&txn, showtime_id).await?;

        let now = chrono::Utc::now();
        let new_reservation = reservation::ActiveModel {
            user_id: Set(user_id),
            show_id: Set(show_id),
            showtime_id: Set(showtime_id),
            status: Set(reservation::STATUS_CONFIRMED.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let created = new_reservation
            .insert(&txn)
            .await
            .map_err(|e| match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => Error::DuplicateReservation {
                    user_id,
                    showtime_id,
                },
                _ => Error::from(e),
            })?;

        txn.commit().await?;
        info!(
            reservation_id = created.id,
            price = show.price,
            "Reservation confirmed"
        );
        Ok(created)
    }

    /// Lists one user's reservations, newest first, joined with show and showtime.
    ///
    /// # Errors
    /// `NoReservations` when the user has none and `empty_listing_is_error` is set.
    pub async fn list_reservations_for_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<ReservationDetails>> {
        let rows = Reservation::find()
            .filter(reservation::Column::UserId.eq(user_id))
            .order_by_desc(reservation::Column::CreatedAt)
            .order_by_desc(reservation::Column::Id)
            .all(&self.db)
            .await?;
        debug!(user_id, count = rows.len(), "Loaded user reservations");
        let details = catalog::reservation_details(&self.db, rows, false).await?;
        self.check_listing(details)
    }

    /// Lists every reservation, newest first, including the holder's username.
    ///
    /// # Errors
    /// `NoReservations` when there are none and `empty_listing_is_error` is set.
    pub async fn list_all_reservations(&self) -> Result<Vec<ReservationDetails>> {
        let rows = Reservation::find()
            .order_by_desc(reservation::Column::CreatedAt)
            .order_by_desc(reservation::Column::Id)
            .all(&self.db)
            .await?;
        let details = catalog::reservation_details(&self.db, rows, true).await?;
        self.check_listing(details)
    }

    fn check_listing(&self, details: Vec<ReservationDetails>) -> Result<Vec<ReservationDetails>> {
        if details.is_empty() && self.settings.empty_listing_is_error {
            return Err(Error::NoReservations);
        }
        Ok(details)
    }
}

/// Runs `operation` until it succeeds, fails permanently, or exhausts
/// `max_transaction_retries` retries of transient errors.
///
/// Each retry sleeps `retry_backoff_ms * attempt` first.
pub(crate) async fn retry_transient<T, F, Fut>(
    settings: &BookingSettings,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut attempt: u32 = 0;
    loop {
        match operation().await {
            Err(e) if e.is_transient() && attempt < settings.max_transaction_retries => {
                attempt += 1;
                warn!(attempt, error = %e, "Transient storage conflict, retrying");
                let backoff = settings.retry_backoff_ms * u64::from(attempt);
                tokio::time::sleep(Duration::from_millis(backoff)).await;
            }
            result => return result,
        }
    }
}

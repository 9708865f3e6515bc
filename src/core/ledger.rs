//! Inventory ledger - The two guarded counters: seats per showtime and points per user.
//!
//! Every mutation takes a `&DatabaseTransaction`, so it can only run inside a
//! transaction owned by the caller. There is no release or refund API: a failed
//! reservation is undone by dropping the transaction, never by a compensating
//! increment.
//!
//! The check and the write are a single conditional statement, e.g.
//! `UPDATE showtimes SET available_seats = available_seats - 1 WHERE id = ? AND available_seats > 0`.
//! The database evaluates the guard against the current row under its write
//! lock, so two concurrent callers can never both pass it for the last seat or
//! the last spendable points. `rows_affected` tells us whether the guard held.

use crate::{
    core::schedule::MaterializedShowtime,
    entities::{Showtime, User, showtime, user},
    errors::{Error, Result},
};
use sea_orm::{DatabaseTransaction, Set, prelude::*, sea_query::Expr};
use tracing::debug;

/// Inserts the validated showtimes for `show_id` with their initial seat counters.
pub async fn open_inventory(
    txn: &DatabaseTransaction,
    show_id: i64,
    schedule: &[MaterializedShowtime],
) -> Result<Vec<showtime::Model>> {
    let now = chrono::Utc::now();
    let mut created = Vec::with_capacity(schedule.len());
    for entry in schedule {
        let model = showtime::ActiveModel {
            show_id: Set(show_id),
            date: Set(entry.slot.date),
            start_time: Set(entry.slot.start_time),
            end_time: Set(entry.slot.end_time),
            available_seats: Set(entry.available_seats),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        created.push(model.insert(txn).await?);
    }
    debug!(show_id, count = created.len(), "Opened seat inventory");
    Ok(created)
}

/// Takes one seat from `showtime_id`.
///
/// # Errors
/// `SoldOut` when no seat is left; the counter is untouched in that case.
pub async fn reserve_seat(txn: &DatabaseTransaction, showtime_id: i64) -> Result<()> {
    let result = Showtime::update_many()
        .col_expr(
            showtime::Column::AvailableSeats,
            Expr::col(showtime::Column::AvailableSeats).sub(1),
        )
        .col_expr(showtime::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(showtime::Column::Id.eq(showtime_id))
        .filter(showtime::Column::AvailableSeats.gt(0))
        .exec(txn)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::SoldOut { showtime_id });
    }
    Ok(())
}

/// Debits `amount` points from `user_id`.
///
/// # Errors
/// `InsufficientFunds` when the balance is below `amount`, `UserNotFound` when
/// the user row is gone. The balance is untouched in both cases.
pub async fn debit_points(txn: &DatabaseTransaction, user_id: i64, amount: i64) -> Result<()> {
    if amount < 0 {
        return Err(Error::InvalidInput {
            message: format!("cannot debit a negative amount ({amount})"),
        });
    }

    let result = User::update_many()
        .col_expr(user::Column::Points, Expr::col(user::Column::Points).sub(amount))
        .col_expr(user::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(user::Column::Id.eq(user_id))
        .filter(user::Column::Points.gte(amount))
        .exec(txn)
        .await?;

    if result.rows_affected == 0 {
        let current = User::find_by_id(user_id)
            .one(txn)
            .await?
            .ok_or(Error::UserNotFound { id: user_id })?
            .points;
        return Err(Error::InsufficientFunds {
            current,
            required: amount,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::schedule::ShowtimeSlot;
    use crate::test_utils::*;
    use sea_orm::TransactionTrait;

    #[tokio::test]
    async fn test_open_inventory_sets_counters() -> Result<()> {
        let db = setup_test_db().await?;
        let show = create_test_show(&db, "Inventory", 50, 3).await?;
        let slot = ShowtimeSlot {
            date: test_date(),
            start_time: test_time(18, 0),
            end_time: test_time(20, 0),
        };

        let txn = db.begin().await?;
        let created = open_inventory(
            &txn,
            show.id,
            &[MaterializedShowtime {
                slot,
                available_seats: 3,
            }],
        )
        .await?;
        txn.commit().await?;

        assert_eq!(created.len(), 1);
        assert_eq!(created[0].available_seats, 3);
        assert_eq!(created[0].show_id, show.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_reserve_seat_until_sold_out() -> Result<()> {
        let db = setup_test_db().await?;
        let (_, showtime) = create_show_with_showtime(&db, "Tiny", 10, 2).await?;

        let txn = db.begin().await?;
        reserve_seat(&txn, showtime.id).await?;
        reserve_seat(&txn, showtime.id).await?;
        let third = reserve_seat(&txn, showtime.id).await;
        assert!(matches!(third, Err(Error::SoldOut { .. })));
        txn.commit().await?;

        let after = Showtime::find_by_id(showtime.id).one(&db).await?.unwrap();
        assert_eq!(after.available_seats, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_debit_points_guard() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "alice", 100).await?;

        let txn = db.begin().await?;
        debit_points(&txn, user.id, 60).await?;
        let second = debit_points(&txn, user.id, 60).await;
        assert!(matches!(
            second,
            Err(Error::InsufficientFunds {
                current: 40,
                required: 60
            })
        ));
        txn.commit().await?;

        let after = User::find_by_id(user.id).one(&db).await?.unwrap();
        assert_eq!(after.points, 40);
        Ok(())
    }

    #[tokio::test]
    async fn test_debit_points_missing_user() -> Result<()> {
        let db = setup_test_db().await?;
        let txn = db.begin().await?;
        let result = debit_points(&txn, 404, 10).await;
        assert!(matches!(result, Err(Error::UserNotFound { id: 404 })));
        Ok(())
    }

    #[tokio::test]
    async fn test_rollback_discards_mutations() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "bob", 100).await?;
        let (_, showtime) = create_show_with_showtime(&db, "Rollback", 10, 1).await?;

        {
            let txn = db.begin().await?;
            debit_points(&txn, user.id, 100).await?;
            reserve_seat(&txn, showtime.id).await?;
            txn.rollback().await?;
        }

        let user_after = User::find_by_id(user.id).one(&db).await?.unwrap();
        let showtime_after = Showtime::find_by_id(showtime.id).one(&db).await?.unwrap();
        assert_eq!(user_after.points, 100);
        assert_eq!(showtime_after.available_seats, 1);
        Ok(())
    }

    async fn debit_then_oversell(
        db: &DatabaseConnection,
        user_id: i64,
        showtime_id: i64,
    ) -> Result<()> {
        let txn = db.begin().await?;
        debit_points(&txn, user_id, 40).await?;
        reserve_seat(&txn, showtime_id).await?;
        reserve_seat(&txn, showtime_id).await?;
        txn.commit().await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_transaction_dropped_on_error_discards_mutations() -> Result<()> {
        let db = setup_test_db().await?;
        let user = create_test_user(&db, "carol", 100).await?;
        let (_, showtime) = create_show_with_showtime(&db, "Dropped", 10, 1).await?;

        let err = debit_then_oversell(&db, user.id, showtime.id)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::SoldOut { .. }));

        let user_after = User::find_by_id(user.id).one(&db).await?.unwrap();
        let showtime_after = Showtime::find_by_id(showtime.id).one(&db).await?.unwrap();
        assert_eq!(user_after.points, 100);
        assert_eq!(showtime_after.available_seats, 1);
        Ok(())
    }
}

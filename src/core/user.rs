//! User records as far as the booking engine needs them.
//!
//! Signup and authentication happen elsewhere; these functions only create the
//! balance-bearing row and read it back.

use crate::{
    config::settings::BookingSettings,
    entities::{User, user},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};

/// Creates a user with an explicit starting balance.
///
/// # Errors
/// Returns `InvalidInput` for an empty username or a negative balance.
pub async fn create_user<C>(db: &C, username: &str, points: i64) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    if username.trim().is_empty() {
        return Err(Error::InvalidInput {
            message: "username cannot be empty".to_string(),
        });
    }
    if points < 0 {
        return Err(Error::InvalidInput {
            message: format!("starting balance cannot be negative ({points})"),
        });
    }

    let now = chrono::Utc::now();
    let user = user::ActiveModel {
        username: Set(username.trim().to_string()),
        points: Set(points),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(user.insert(db).await?)
}

/// Creates a user with the configured signup balance.
pub async fn create_user_with_default_balance<C>(
    db: &C,
    username: &str,
    settings: &BookingSettings,
) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    create_user(db, username, settings.default_user_points).await
}

/// Finds a user by id, returning None if absent.
pub async fn get_user_by_id<C>(db: &C, user_id: i64) -> Result<Option<user::Model>>
where
    C: ConnectionTrait,
{
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

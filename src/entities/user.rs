//! User entity - Only the fields the booking core touches.
//!
//! Credentials and identity live with the authentication collaborator; the
//! booking engine only reads and debits the point balance.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier supplied to the core by the authentication context
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name, carried into reservation listings
    pub username: String,
    /// Spendable point balance, never negative
    pub points: i64,
    /// When the user was created
    pub created_at: DateTimeUtc,
    /// When the balance was last changed
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user holds many reservations
    #[sea_orm(has_many = "super::reservation::Entity")]
    Reservations,
}

impl Related<super::reservation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reservations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

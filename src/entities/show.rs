//! Show entity - A bookable production with a fixed seat count.
//!
//! A show owns its showtimes; deleting a show cascades to them.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Show database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shows")]
pub struct Model {
    /// Unique identifier for the show
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name
    pub name: String,
    /// Long-form description
    #[sea_orm(column_type = "Text")]
    pub description: String,
    /// Free-form category used by catalog filtering (e.g. "musical")
    pub category: String,
    /// Venue where every showtime takes place
    pub location: String,
    /// Price in points, non-negative
    pub price: i64,
    /// Optional poster image
    pub image_url: Option<String>,
    /// Seats per showtime, fixed at creation
    pub total_seats: i32,
    /// When the show was created
    pub created_at: DateTimeUtc,
    /// When the show row last changed
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Show and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One show has many showtimes
    #[sea_orm(has_many = "super::showtime::Entity")]
    Showtimes,
    /// One show has many reservations
    #[sea_orm(has_many = "super::reservation::Entity")]
    Reservations,
}

impl Related<super::showtime::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Showtimes.def()
    }
}

impl Related<super::reservation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reservations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

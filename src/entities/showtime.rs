//! Showtime entity - One scheduled occurrence of a show with its own seat inventory.
//!
//! `available_seats` starts at the show's `total_seats` and only ever decreases,
//! through the inventory ledger.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Showtime database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "showtimes")]
pub struct Model {
    /// Unique identifier for the showtime
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning show
    pub show_id: i64,
    /// Calendar date of the performance
    pub date: Date,
    /// Start of the half-open `[start_time, end_time)` slot
    pub start_time: Time,
    /// End of the slot
    pub end_time: Time,
    /// Remaining seats, within `[0, show.total_seats]`
    pub available_seats: i32,
    /// When the showtime was created
    pub created_at: DateTimeUtc,
    /// When the seat counter last changed
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Showtime and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each showtime belongs to one show
    #[sea_orm(
        belongs_to = "super::show::Entity",
        from = "Column::ShowId",
        to = "super::show::Column::Id",
        on_delete = "Cascade"
    )]
    Show,
    /// One showtime has many reservations
    #[sea_orm(has_many = "super::reservation::Entity")]
    Reservations,
}

impl Related<super::show::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Show.def()
    }
}

impl Related<super::reservation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reservations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

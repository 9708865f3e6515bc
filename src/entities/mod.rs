//! Entity module - SeaORM entity definitions for the booking tables.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod reservation;
pub mod show;
pub mod showtime;
pub mod user;

// Re-export specific types to avoid conflicts
pub use reservation::{
    Column as ReservationColumn, Entity as Reservation, Model as ReservationModel,
};
pub use show::{Column as ShowColumn, Entity as Show, Model as ShowModel};
pub use showtime::{Column as ShowtimeColumn, Entity as Showtime, Model as ShowtimeModel};
pub use user::{Column as UserColumn, Entity as User, Model as UserModel};

//! Catalog reads - Plain projections of shows, showtimes and reservations.
//!
//! Nothing here mutates state or takes locks. Joins are explicit batch queries
//! assembled into value structs rather than lazily traversed relations.

use crate::{
    entities::{Show, Showtime, User, reservation, show, showtime},
    errors::{Error, Result},
};
use chrono::{NaiveDate, NaiveTime};
use sea_orm::{QueryOrder, prelude::*};
use serde::Serialize;
use std::collections::HashMap;

/// A show with its showtimes ordered by date, then start time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShowDetails {
    /// The show row
    pub show: show::Model,
    /// Every showtime of the show
    pub showtimes: Vec<showtime::Model>,
}

impl ShowDetails {
    /// Pairs `show` with `showtimes`, sorting them by date, start time and id.
    #[must_use]
    pub fn new(show: show::Model, mut showtimes: Vec<showtime::Model>) -> Self {
        showtimes.sort_by_key(|s| (s.date, s.start_time, s.id));
        Self { show, showtimes }
    }
}

/// A reservation joined with the show and showtime it refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReservationDetails {
    /// The reservation row
    pub reservation: reservation::Model,
    /// Name of the booked show
    pub show_name: String,
    /// Venue of the booked show
    pub location: String,
    /// Current show price in points
    pub price: i64,
    /// Date of the booked showtime
    pub date: NaiveDate,
    /// Start of the booked showtime
    pub start_time: NaiveTime,
    /// End of the booked showtime
    pub end_time: NaiveTime,
    /// Only filled by the all-users listing
    pub username: Option<String>,
}

/// Read-only catalog queries.
#[derive(Debug, Clone)]
pub struct Catalog {
    db: DatabaseConnection,
}

impl Catalog {
    /// Creates a catalog reader over `db`.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Loads one show with its showtimes.
    ///
    /// # Errors
    /// `ShowNotFound` if no show has this id.
    pub async fn get_show(&self, show_id: i64) -> Result<ShowDetails> {
        let show = Show::find_by_id(show_id)
            .one(&self.db)
            .await?
            .ok_or(Error::ShowNotFound { id: show_id })?;
        let showtimes = Showtime::find()
            .filter(showtime::Column::ShowId.eq(show_id))
            .all(&self.db)
            .await?;
        Ok(ShowDetails::new(show, showtimes))
    }

    /// Lists every show, optionally restricted to one category.
    pub async fn list_shows(&self, category: Option<&str>) -> Result<Vec<ShowDetails>> {
        let mut query = Show::find().order_by_asc(show::Column::Id);
        if let Some(category) = category {
            query = query.filter(show::Column::Category.eq(category));
        }
        let shows = query.all(&self.db).await?;
        self.attach_showtimes(shows).await
    }

    /// Lists shows whose name contains `name`.
    pub async fn search_shows(&self, name: &str) -> Result<Vec<ShowDetails>> {
        let shows = Show::find()
            .filter(show::Column::Name.contains(name))
            .order_by_asc(show::Column::Id)
            .all(&self.db)
            .await?;
        self.attach_showtimes(shows).await
    }

    async fn attach_showtimes(&self, shows: Vec<show::Model>) -> Result<Vec<ShowDetails>> {
        if shows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = shows.iter().map(|s| s.id).collect();
        let mut by_show: HashMap<i64, Vec<showtime::Model>> = HashMap::new();
        for st in Showtime::find()
            .filter(showtime::Column::ShowId.is_in(ids))
            .all(&self.db)
            .await?
        {
            by_show.entry(st.show_id).or_default().push(st);
        }
        Ok(shows
            .into_iter()
            .map(|show| {
                let showtimes = by_show.remove(&show.id).unwrap_or_default();
                ShowDetails::new(show, showtimes)
            })
            .collect())
    }
}

/// Joins `reservations` with their show and showtime, keeping the input order.
///
/// Rows whose show or showtime has vanished are skipped.
pub async fn reservation_details<C>(
    db: &C,
    reservations: Vec<reservation::Model>,
    with_username: bool,
) -> Result<Vec<ReservationDetails>>
where
    C: ConnectionTrait,
{
    if reservations.is_empty() {
        return Ok(Vec::new());
    }

    let show_ids: Vec<i64> = reservations.iter().map(|r| r.show_id).collect();
    let showtime_ids: Vec<i64> = reservations.iter().map(|r| r.showtime_id).collect();

    let shows: HashMap<i64, show::Model> = Show::find()
        .filter(show::Column::Id.is_in(show_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();
    let showtimes: HashMap<i64, showtime::Model> = Showtime::find()
        .filter(showtime::Column::Id.is_in(showtime_ids))
        .all(db)
        .await?
        .into_iter()
        .map(|s| (s.id, s))
        .collect();
    let usernames: HashMap<i64, String> = if with_username {
        let user_ids: Vec<i64> = reservations.iter().map(|r| r.user_id).collect();
        User::find()
            .filter(crate::entities::user::Column::Id.is_in(user_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|u| (u.id, u.username))
            .collect()
    } else {
        HashMap::new()
    };

    Ok(reservations
        .into_iter()
        .filter_map(|reservation| {
            let show = shows.get(&reservation.show_id)?;
            let showtime = showtimes.get(&reservation.showtime_id)?;
            Some(ReservationDetails {
                show_name: show.name.clone(),
                location: show.location.clone(),
                price: show.price,
                date: showtime.date,
                start_time: showtime.start_time,
                end_time: showtime.end_time,
                username: usernames.get(&reservation.user_id).cloned(),
                reservation,
            })
        })
        .collect())
}

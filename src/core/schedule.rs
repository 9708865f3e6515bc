//! Schedule validation - Checks a proposed showtime set before anything is written.
//!
//! Pure logic: no database access. Callers load the show's persisted showtimes
//! (if the show already exists) and pass them in through [`ShowRef`].

use crate::{
    entities::showtime,
    errors::{ConflictKind, Error, Result},
};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// A requested `[start_time, end_time)` slot on `date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowtimeSlot {
    /// Calendar date of the performance
    pub date: NaiveDate,
    /// Inclusive start
    pub start_time: NaiveTime,
    /// Exclusive end, strictly after `start_time`
    pub end_time: NaiveTime,
}

impl ShowtimeSlot {
    /// Half-open interval intersection on the same date.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.date == other.date
            && self.start_time < other.end_time
            && other.start_time < self.end_time
    }

    fn conflict(&self, kind: ConflictKind) -> Error {
        Error::ScheduleConflict {
            kind,
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }
}

impl From<&showtime::Model> for ShowtimeSlot {
    fn from(model: &showtime::Model) -> Self {
        Self {
            date: model.date,
            start_time: model.start_time,
            end_time: model.end_time,
        }
    }
}

/// The show a schedule is being validated for.
#[derive(Debug, Clone, Copy)]
pub enum ShowRef<'a> {
    /// A show that does not exist yet.
    New {
        /// Seats each new showtime opens with
        total_seats: i32,
    },
    /// An existing show together with its persisted showtimes.
    Existing {
        /// Seats each new showtime opens with
        total_seats: i32,
        /// Showtimes already stored for the show
        showtimes: &'a [showtime::Model],
    },
}

impl ShowRef<'_> {
    const fn total_seats(&self) -> i32 {
        match self {
            Self::New { total_seats } | Self::Existing { total_seats, .. } => *total_seats,
        }
    }
}

/// Optional tightening of the checks against persisted showtimes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScheduleRules {
    /// Reject proposed slots that overlap a persisted slot, not only exact copies.
    pub check_overlap_with_persisted: bool,
}

/// A validated slot with its seat counter initialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterializedShowtime {
    /// The validated slot
    pub slot: ShowtimeSlot,
    /// Initial seat counter, equal to the show's `total_seats`
    pub available_seats: i32,
}

/// Validates `proposed` for `show_ref` with the default rules.
pub fn validate_and_materialize_schedule(
    show_ref: &ShowRef<'_>,
    proposed: &[ShowtimeSlot],
) -> Result<Vec<MaterializedShowtime>> {
    validate_and_materialize_schedule_with(show_ref, proposed, ScheduleRules::default())
}

/// Validates `proposed` for `show_ref`.
///
/// Checks run in order: non-empty input, well-formed slots, pairwise overlap
/// within the proposal, then conflicts with persisted showtimes. Every
/// materialized showtime starts with `available_seats == total_seats`.
pub fn validate_and_materialize_schedule_with(
    show_ref: &ShowRef<'_>,
    proposed: &[ShowtimeSlot],
    rules: ScheduleRules,
) -> Result<Vec<MaterializedShowtime>> {
    if proposed.is_empty() {
        return Err(Error::InvalidInput {
            message: "no showtimes supplied".to_string(),
        });
    }

    if let Some(slot) = proposed.iter().find(|s| s.end_time <= s.start_time) {
        return Err(Error::InvalidInput {
            message: format!(
                "showtime on {} ends at {} before it starts at {}",
                slot.date, slot.end_time, slot.start_time
            ),
        });
    }

    for (i, slot) in proposed.iter().enumerate() {
        if let Some(other) = proposed[i + 1..].iter().find(|o| slot.overlaps(o)) {
            return Err(other.conflict(ConflictKind::Overlap));
        }
    }

    if let ShowRef::Existing { showtimes, .. } = show_ref {
        for slot in proposed {
            for persisted in showtimes.iter().map(ShowtimeSlot::from) {
                if persisted == *slot {
                    return Err(slot.conflict(ConflictKind::SlotExists));
                }
                if rules.check_overlap_with_persisted && persisted.overlaps(slot) {
                    return Err(slot.conflict(ConflictKind::Overlap));
                }
            }
        }
    }

    let available_seats = show_ref.total_seats();
    Ok(proposed
        .iter()
        .map(|slot| MaterializedShowtime {
            slot: *slot,
            available_seats,
        })
        .collect())
}

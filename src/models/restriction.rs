//! Room restriction model: a date range during which a room cannot be booked

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Kind of restriction, stored as `restriction_id` referencing the `restrictions` table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum RestrictionKind {
    Reservation = 1,
    OwnerBlock = 2,
}

impl RestrictionKind {
    pub fn id(self) -> i32 {
        self as i32
    }
}

/// Restriction row. `reservation_id` is NULL (or 0 in legacy rows) for owner blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct RoomRestriction {
    pub id: i32,
    pub room_id: i32,
    pub reservation_id: Option<i32>,
    pub restriction_id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RoomRestriction {
    /// Reservation backing this restriction, if any
    pub fn reservation(&self) -> Option<i32> {
        self.reservation_id.filter(|id| *id > 0)
    }

    /// Half-open overlap with `[start, end)`
    pub fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start_date < end && self.end_date > start
    }
}

/// Restriction to insert
#[derive(Debug, Clone, PartialEq)]
pub struct NewRestriction {
    pub room_id: i32,
    pub reservation_id: Option<i32>,
    pub kind: RestrictionKind,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl NewRestriction {
    /// One-day owner block covering `[day, day + 1)`
    pub fn owner_block(room_id: i32, day: NaiveDate) -> Self {
        Self {
            room_id,
            reservation_id: None,
            kind: RestrictionKind::OwnerBlock,
            start_date: day,
            end_date: day + Days::new(1),
        }
    }
}

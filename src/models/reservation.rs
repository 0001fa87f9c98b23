//! Reservation model and the in-session booking draft

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::{fmt, str::FromStr};

use crate::error::AppError;

/// Reservation joined with its room name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Reservation {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub room_id: i32,
    /// 0 = new, 1 = processed by an admin
    pub processed: i32,
    pub room_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Reservation {
    pub fn is_processed(&self) -> bool {
        self.processed != 0
    }

    pub fn guest(&self) -> GuestDetails {
        GuestDetails {
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
        }
    }
}

/// Guest contact fields, as typed in the reservation form
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuestDetails {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

/// Reservation to insert
#[derive(Debug, Clone, PartialEq)]
pub struct NewReservation {
    pub guest: GuestDetails,
    pub room_id: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Reservation being assembled across the search, choose-room and form steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReservationDraft {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub room_id: Option<i32>,
    pub room_name: Option<String>,
    #[serde(default)]
    pub guest: GuestDetails,
    /// Set once the reservation has been stored
    pub reservation_id: Option<i32>,
}

impl ReservationDraft {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            room_id: None,
            room_name: None,
            guest: GuestDetails::default(),
            reservation_id: None,
        }
    }

    pub fn for_room(room_id: i32, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            room_id: Some(room_id),
            ..Self::new(start_date, end_date)
        }
    }

    /// Insert payload, once a room has been chosen
    pub fn to_new_reservation(&self) -> Option<NewReservation> {
        Some(NewReservation {
            guest: self.guest.clone(),
            room_id: self.room_id?,
            start_date: self.start_date,
            end_date: self.end_date,
        })
    }
}

/// Admin page a reservation was opened from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReservationSource {
    New,
    All,
    /// Opened from the reservations calendar
    Calendar,
}

impl ReservationSource {
    pub fn as_str(self) -> &'static str {
        match self {
            ReservationSource::New => "new",
            ReservationSource::All => "all",
            ReservationSource::Calendar => "cal",
        }
    }

    /// Path of the list page this source points back to
    pub fn list_path(self) -> String {
        match self {
            ReservationSource::Calendar => "/admin/reservations-calendar".to_string(),
            list => format!("/admin/reservations-{}", list.as_str()),
        }
    }
}

impl FromStr for ReservationSource {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(ReservationSource::New),
            "all" => Ok(ReservationSource::All),
            "cal" => Ok(ReservationSource::Calendar),
            other => Err(AppError::BadRequest(format!("Unknown reservation list '{}'", other))),
        }
    }
}

impl fmt::Display for ReservationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_without_room_cannot_be_inserted() {
        let start = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 6, 3).unwrap();
        assert!(ReservationDraft::new(start, end).to_new_reservation().is_none());

        let insert = ReservationDraft::for_room(2, start, end)
            .to_new_reservation()
            .unwrap();
        assert_eq!(insert.room_id, 2);
        assert_eq!(insert.start_date, start);
    }

    #[test]
    fn source_parses_known_lists_only() {
        assert_eq!("new".parse::<ReservationSource>().unwrap(), ReservationSource::New);
        assert_eq!(ReservationSource::All.list_path(), "/admin/reservations-all");
        assert_eq!("cal".parse::<ReservationSource>().unwrap(), ReservationSource::Calendar);
        assert_eq!(ReservationSource::Calendar.list_path(), "/admin/reservations-calendar");
        assert!("archive".parse::<ReservationSource>().is_err());
    }
}

//! Room availability over a stay

use std::sync::Arc;

use chrono::NaiveDate;

use crate::{
    error::{AppError, AppResult},
    models::Room,
    repository::BookingRepository,
};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` form value
pub fn parse_date(field: &str, value: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| AppError::BadRequest(format!("Invalid {} date '{}'", field, value)))
}

/// A stay needs at least one night
pub fn validate_range(start: NaiveDate, end: NaiveDate) -> AppResult<()> {
    if end <= start {
        return Err(AppError::BadRequest(
            "Departure must be after arrival".to_string(),
        ));
    }
    Ok(())
}

/// Parse and check the `start`/`end` pair of a search form
pub fn parse_stay(start: &str, end: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    let start = parse_date("start", start)?;
    let end = parse_date("end", end)?;
    validate_range(start, end)?;
    Ok((start, end))
}

#[derive(Clone)]
pub struct AvailabilityService {
    store: Arc<dyn BookingRepository>,
}

impl AvailabilityService {
    pub fn new(store: Arc<dyn BookingRepository>) -> Self {
        Self { store }
    }

    /// Rooms free for every night of `[start, end)`
    pub async fn search(&self, start: NaiveDate, end: NaiveDate) -> AppResult<Vec<Room>> {
        validate_range(start, end)?;
        let rooms = self.store.available_rooms(start, end).await?;
        tracing::debug!(%start, %end, available = rooms.len(), "Availability search");
        Ok(rooms)
    }

    pub async fn room_available(&self, room_id: i32, start: NaiveDate, end: NaiveDate) -> AppResult<bool> {
        validate_range(start, end)?;
        self.store.is_room_available(room_id, start, end).await
    }

    pub async fn room(&self, room_id: i32) -> AppResult<Room> {
        self.store.room_by_id(room_id).await
    }
}

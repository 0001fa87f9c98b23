//! Admin reservations calendar: per-room, per-day occupancy maps and owner block edits

use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use chrono::{Datelike, Days, Months, NaiveDate};

use crate::{
    error::{AppError, AppResult},
    models::{ReservationSource, Room, RoomRestriction},
    repository::BookingRepository,
};

/// Map from day key to an id, 0 meaning "free"
pub type DayMap = BTreeMap<String, i32>;

/// Day key layout: zero-padded month, day without leading zero (`2025-06-5`)
pub const DAY_KEY_FORMAT: &str = "%Y-%m-%-d";

/// Years the calendar accepts from a query
const YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

const ADD_BLOCK_PREFIX: &str = "add_block_";
const REMOVE_BLOCK_PREFIX: &str = "remove_block_";

pub fn day_key(day: NaiveDate) -> String {
    day.format(DAY_KEY_FORMAT).to_string()
}

pub fn parse_day_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, "%Y-%m-%d").ok()
}

/// Form field an admin checks to add a block on a free day
pub fn add_block_field(room_id: i32, day: &str) -> String {
    format!("{}{}_{}", ADD_BLOCK_PREFIX, room_id, day)
}

/// Form field that stays checked while an existing block is kept
pub fn remove_block_field(room_id: i32, day: &str) -> String {
    format!("{}{}_{}", REMOVE_BLOCK_PREFIX, room_id, day)
}

/// A calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarMonth {
    first: NaiveDate,
}

impl CalendarMonth {
    pub fn new(year: i32, month: u32) -> AppResult<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .filter(|_| YEARS.contains(&year))
            .map(|first| Self { first })
            .ok_or_else(|| AppError::BadRequest(format!("Invalid month {}-{}", year, month)))
    }

    pub fn containing(day: NaiveDate) -> Self {
        Self {
            first: day.with_day(1).unwrap_or(day),
        }
    }

    /// Month from the `y`/`m` query parameters; the month of `today` when `y` is absent
    pub fn from_query(year: Option<&str>, month: Option<&str>, today: NaiveDate) -> AppResult<Self> {
        match year.filter(|y| !y.is_empty()) {
            None => Ok(Self::containing(today)),
            Some(y) => {
                let year = y
                    .parse()
                    .map_err(|_| AppError::BadRequest(format!("Invalid year '{}'", y)))?;
                let month = month
                    .unwrap_or_default()
                    .parse()
                    .map_err(|_| AppError::BadRequest("Invalid month".to_string()))?;
                Self::new(year, month)
            }
        }
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.first
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn days_in_month(&self) -> u32 {
        self.last_day().day()
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let last = self.last_day();
        self.first.iter_days().take_while(move |d| *d <= last)
    }

    /// Following month; stays put at the end of the date range
    pub fn next(&self) -> Self {
        self.first
            .checked_add_months(Months::new(1))
            .map_or(*self, |first| Self { first })
    }

    /// Preceding month; stays put at the start of the date range
    pub fn previous(&self) -> Self {
        self.first
            .checked_sub_months(Months::new(1))
            .map_or(*self, |first| Self { first })
    }

    /// e.g. "June 2025"
    pub fn label(&self) -> String {
        self.first.format("%B %Y").to_string()
    }

    /// `y=2025&m=06`
    pub fn query(&self) -> String {
        format!("y={}&m={:02}", self.year(), self.month())
    }

    pub fn path(&self) -> String {
        format!("/admin/reservations-calendar?{}", self.query())
    }
}

/// Page a reservation detail returns to: the calendar month it was opened
/// from, or its reservation list
pub fn return_path(source: ReservationSource, month: Option<CalendarMonth>) -> String {
    match (source, month) {
        (ReservationSource::Calendar, Some(month)) => month.path(),
        _ => source.list_path(),
    }
}

/// Occupancy of one room over a month
#[derive(Debug, Clone, PartialEq)]
pub struct RoomCalendar {
    pub room: Room,
    /// Day key to reservation id
    pub reservations: DayMap,
    /// Day key to owner block restriction id
    pub blocks: DayMap,
}

/// Build both day maps of a room for `month` from its restrictions.
///
/// Reservation-backed restrictions mark every night of `[start, end)`;
/// owner blocks mark their start day only. Days outside the month are ignored.
pub fn build_room_calendar(room: Room, month: &CalendarMonth, restrictions: &[RoomRestriction]) -> RoomCalendar {
    let mut reservations: DayMap = month.days().map(|d| (day_key(d), 0)).collect();
    let mut blocks = reservations.clone();

    let (first, last) = (month.first_day(), month.last_day());
    for restriction in restrictions {
        match restriction.reservation() {
            Some(reservation_id) => {
                let from = restriction.start_date.max(first);
                for day in from.iter_days().take_while(|d| *d < restriction.end_date && *d <= last) {
                    reservations.insert(day_key(day), reservation_id);
                }
            }
            None => {
                if let Some(slot) = blocks.get_mut(&day_key(restriction.start_date)) {
                    *slot = restriction.id;
                }
            }
        }
    }

    RoomCalendar {
        room,
        reservations,
        blocks,
    }
}

/// Calendar page content
#[derive(Debug, Clone)]
pub struct CalendarView {
    pub month: CalendarMonth,
    pub rooms: Vec<RoomCalendar>,
}

/// Owner block edits derived from the calendar form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockChanges {
    /// (room id, day) to block
    pub add: Vec<(i32, NaiveDate)>,
    /// Restriction ids to delete
    pub remove: Vec<i32>,
}

impl BlockChanges {
    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }
}

/// Compare the submitted calendar form against the block maps that were displayed.
///
/// A block whose `remove_block_{room}_{day}` box is no longer in the form is
/// removed; every `add_block_{room}_{day}` field adds a block.
pub fn diff_blocks(prior: &BTreeMap<i32, DayMap>, form: &HashMap<String, String>) -> BlockChanges {
    let mut changes = BlockChanges::default();

    for (room_id, blocks) in prior {
        for (day, restriction_id) in blocks {
            if *restriction_id > 0 && !form.contains_key(&remove_block_field(*room_id, day)) {
                changes.remove.push(*restriction_id);
            }
        }
    }

    for field in form.keys() {
        let Some(rest) = field.strip_prefix(ADD_BLOCK_PREFIX) else {
            continue;
        };
        let parsed = rest
            .split_once('_')
            .and_then(|(room, day)| Some((room.parse::<i32>().ok()?, parse_day_key(day)?)));
        match parsed {
            Some(entry) => changes.add.push(entry),
            None => tracing::warn!("Ignoring malformed calendar field {}", field),
        }
    }
    changes.add.sort();
    changes.remove.sort_unstable();

    changes
}

#[derive(Clone)]
pub struct CalendarService {
    store: Arc<dyn BookingRepository>,
}

impl CalendarService {
    pub fn new(store: Arc<dyn BookingRepository>) -> Self {
        Self { store }
    }

    /// Occupancy maps of every room for `month`
    pub async fn month_view(&self, month: CalendarMonth) -> AppResult<CalendarView> {
        let rooms = self.store.all_rooms().await?;
        let mut calendars = Vec::with_capacity(rooms.len());

        for room in rooms {
            let restrictions = self
                .store
                .restrictions_for_room(room.id, month.first_day(), month.last_day())
                .await?;
            calendars.push(build_room_calendar(room, &month, &restrictions));
        }

        Ok(CalendarView {
            month,
            rooms: calendars,
        })
    }

    /// Apply owner block edits
    pub async fn apply(&self, changes: &BlockChanges) -> AppResult<()> {
        for restriction_id in &changes.remove {
            match self.store.delete_block(*restriction_id).await {
                Err(AppError::NotFound(_)) => {
                    tracing::warn!(restriction_id, "Owner block already removed")
                }
                other => other?,
            }
        }
        let mut added = 0;
        for (room_id, day) in &changes.add {
            if !self.store.is_room_available(*room_id, *day, *day + Days::new(1)).await? {
                tracing::warn!(room_id, day = %day, "Skipping owner block on an occupied day");
                continue;
            }
            self.store.insert_block(*room_id, *day).await?;
            added += 1;
        }
        if !changes.is_empty() {
            tracing::info!(
                added,
                removed = changes.remove.len(),
                "Owner blocks updated"
            );
        }
        Ok(())
    }
}

//! In-memory repository, for local runs without Postgres and for tests

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;

use super::BookingRepository;
use crate::{
    error::{AppError, AppResult},
    models::{
        GuestDetails, NewReservation, NewRestriction, Reservation, RestrictionKind, Room,
        RoomRestriction, User,
    },
};

#[derive(Default)]
struct Tables {
    rooms: Vec<Room>,
    reservations: Vec<Reservation>,
    restrictions: Vec<RoomRestriction>,
    users: Vec<User>,
    last_id: i32,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }

    fn room(&self, id: i32) -> AppResult<&Room> {
        self.rooms
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Room with id {} not found", id)))
    }

    fn reservation_mut(&mut self, id: i32) -> AppResult<&mut Reservation> {
        self.reservations
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Reservation with id {} not found", id)))
    }

    fn room_is_free(&self, room_id: i32, start: NaiveDate, end: NaiveDate) -> bool {
        !self
            .restrictions
            .iter()
            .any(|r| r.room_id == room_id && r.overlaps(start, end))
    }

    fn push_restriction(&mut self, new: NewRestriction) -> i32 {
        let id = self.next_id();
        let now = Utc::now();
        self.restrictions.push(RoomRestriction {
            id,
            room_id: new.room_id,
            reservation_id: new.reservation_id,
            restriction_id: new.kind.id(),
            start_date: new.start_date,
            end_date: new.end_date,
            created_at: now,
            updated_at: now,
        });
        id
    }
}

/// Repository holding every table in process memory
#[derive(Default)]
pub struct MemoryRepository {
    tables: RwLock<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository preloaded with the two rooms of the lodging
    pub fn seeded() -> Self {
        Self::with_rooms(&["General's Quarters", "Major's Suite"])
    }

    /// Repository with one room per name, ids assigned in order starting at 1
    pub fn with_rooms(names: &[&str]) -> Self {
        let mut tables = Tables::default();
        let now = Utc::now();
        for name in names {
            let id = tables.next_id();
            tables.rooms.push(Room {
                id,
                room_name: name.to_string(),
                created_at: now,
                updated_at: now,
            });
        }
        Self {
            tables: RwLock::new(tables),
        }
    }

    /// Add an arbitrary restriction row, returning its id
    pub async fn add_restriction(&self, restriction: NewRestriction) -> i32 {
        self.tables.write().await.push_restriction(restriction)
    }

    /// Number of stored reservations
    pub async fn reservation_count(&self) -> usize {
        self.tables.read().await.reservations.len()
    }
}

fn by_start_date(mut reservations: Vec<Reservation>) -> Vec<Reservation> {
    reservations.sort_by_key(|r| (r.start_date, r.id));
    reservations
}

#[async_trait]
impl BookingRepository for MemoryRepository {
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    async fn all_rooms(&self) -> AppResult<Vec<Room>> {
        let mut rooms = self.tables.read().await.rooms.clone();
        rooms.sort_by(|a, b| a.room_name.cmp(&b.room_name));
        Ok(rooms)
    }

    async fn room_by_id(&self, id: i32) -> AppResult<Room> {
        self.tables.read().await.room(id).cloned()
    }

    async fn available_rooms(&self, start: NaiveDate, end: NaiveDate) -> AppResult<Vec<Room>> {
        let tables = self.tables.read().await;
        let mut rooms: Vec<Room> = tables
            .rooms
            .iter()
            .filter(|room| tables.room_is_free(room.id, start, end))
            .cloned()
            .collect();
        rooms.sort_by(|a, b| a.room_name.cmp(&b.room_name));
        Ok(rooms)
    }

    async fn is_room_available(&self, room_id: i32, start: NaiveDate, end: NaiveDate) -> AppResult<bool> {
        Ok(self.tables.read().await.room_is_free(room_id, start, end))
    }

    async fn create_reservation(&self, reservation: &NewReservation) -> AppResult<i32> {
        let mut tables = self.tables.write().await;
        let room_name = tables.room(reservation.room_id)?.room_name.clone();
        if !tables.room_is_free(reservation.room_id, reservation.start_date, reservation.end_date) {
            return Err(AppError::Conflict(format!(
                "room {} is not available from {} to {}",
                reservation.room_id, reservation.start_date, reservation.end_date
            )));
        }
        let id = tables.next_id();
        let now = Utc::now();

        tables.reservations.push(Reservation {
            id,
            first_name: reservation.guest.first_name.clone(),
            last_name: reservation.guest.last_name.clone(),
            email: reservation.guest.email.clone(),
            phone: reservation.guest.phone.clone(),
            start_date: reservation.start_date,
            end_date: reservation.end_date,
            room_id: reservation.room_id,
            processed: 0,
            room_name,
            created_at: now,
            updated_at: now,
        });
        tables.push_restriction(NewRestriction {
            room_id: reservation.room_id,
            reservation_id: Some(id),
            kind: RestrictionKind::Reservation,
            start_date: reservation.start_date,
            end_date: reservation.end_date,
        });

        Ok(id)
    }

    async fn all_reservations(&self) -> AppResult<Vec<Reservation>> {
        Ok(by_start_date(self.tables.read().await.reservations.clone()))
    }

    async fn new_reservations(&self) -> AppResult<Vec<Reservation>> {
        let tables = self.tables.read().await;
        Ok(by_start_date(
            tables
                .reservations
                .iter()
                .filter(|r| !r.is_processed())
                .cloned()
                .collect(),
        ))
    }

    async fn reservation_by_id(&self, id: i32) -> AppResult<Reservation> {
        self.tables
            .read()
            .await
            .reservations
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Reservation with id {} not found", id)))
    }

    async fn update_reservation_guest(&self, id: i32, guest: &GuestDetails) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        let reservation = tables.reservation_mut(id)?;
        reservation.first_name = guest.first_name.clone();
        reservation.last_name = guest.last_name.clone();
        reservation.email = guest.email.clone();
        reservation.phone = guest.phone.clone();
        reservation.updated_at = Utc::now();
        Ok(())
    }

    async fn set_reservation_processed(&self, id: i32, processed: bool) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        let reservation = tables.reservation_mut(id)?;
        reservation.processed = i32::from(processed);
        reservation.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_reservation(&self, id: i32) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        tables.reservation_mut(id)?;
        tables.reservations.retain(|r| r.id != id);
        tables.restrictions.retain(|r| r.reservation_id != Some(id));
        Ok(())
    }

    async fn restrictions_for_room(
        &self,
        room_id: i32,
        first: NaiveDate,
        last: NaiveDate,
    ) -> AppResult<Vec<RoomRestriction>> {
        let tables = self.tables.read().await;
        let mut restrictions: Vec<RoomRestriction> = tables
            .restrictions
            .iter()
            .filter(|r| r.room_id == room_id && r.end_date > first && r.start_date <= last)
            .cloned()
            .collect();
        restrictions.sort_by_key(|r| r.start_date);
        Ok(restrictions)
    }

    async fn insert_block(&self, room_id: i32, day: NaiveDate) -> AppResult<i32> {
        let mut tables = self.tables.write().await;
        tables.room(room_id)?;
        Ok(tables.push_restriction(NewRestriction::owner_block(room_id, day)))
    }

    async fn delete_block(&self, restriction_id: i32) -> AppResult<()> {
        let mut tables = self.tables.write().await;
        let before = tables.restrictions.len();
        tables
            .restrictions
            .retain(|r| !(r.id == restriction_id && r.reservation().is_none()));
        if tables.restrictions.len() == before {
            return Err(AppError::NotFound(format!("Block {} not found", restriction_id)));
        }
        Ok(())
    }

    async fn upsert_user(&self, email: &str, password_hash: &str) -> AppResult<i32> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        if let Some(user) = tables.users.iter_mut().find(|u| u.email.eq_ignore_ascii_case(email)) {
            user.password = password_hash.to_string();
            user.updated_at = now;
            return Ok(user.id);
        }

        let id = tables.next_id();
        tables.users.push(User {
            id,
            first_name: "Admin".to_string(),
            last_name: "User".to_string(),
            email: email.to_string(),
            password: password_hash.to_string(),
            access_level: 3,
            created_at: now,
            updated_at: now,
        });
        Ok(id)
    }

    async fn user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }
}

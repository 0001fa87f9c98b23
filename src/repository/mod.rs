//! Repository layer for database operations

pub mod memory;
pub mod reservations;
pub mod restrictions;
pub mod rooms;
pub mod users;

use std::{future::Future, time::Duration};

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::{GuestDetails, NewReservation, Reservation, Room, RoomRestriction, User},
};

pub use memory::MemoryRepository;

/// Storage operations used by the services.
///
/// Availability uses half-open ranges: a restriction `[s, e)` overlaps a
/// query `[start, end)` when `s < end && e > start`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Cheap round trip used by the readiness probe
    async fn ping(&self) -> AppResult<()>;

    async fn all_rooms(&self) -> AppResult<Vec<Room>>;

    async fn room_by_id(&self, id: i32) -> AppResult<Room>;

    /// Rooms with no restriction overlapping `[start, end)`
    async fn available_rooms(&self, start: NaiveDate, end: NaiveDate) -> AppResult<Vec<Room>>;

    /// Whether `room_id` has no restriction overlapping `[start, end)`
    async fn is_room_available(&self, room_id: i32, start: NaiveDate, end: NaiveDate) -> AppResult<bool>;

    /// Insert the reservation and its restriction atomically, returning the new reservation id
    async fn create_reservation(&self, reservation: &NewReservation) -> AppResult<i32>;

    async fn all_reservations(&self) -> AppResult<Vec<Reservation>>;

    /// Reservations not yet processed by an admin
    async fn new_reservations(&self) -> AppResult<Vec<Reservation>>;

    async fn reservation_by_id(&self, id: i32) -> AppResult<Reservation>;

    async fn update_reservation_guest(&self, id: i32, guest: &GuestDetails) -> AppResult<()>;

    async fn set_reservation_processed(&self, id: i32, processed: bool) -> AppResult<()>;

    /// Delete a reservation along with its restriction
    async fn delete_reservation(&self, id: i32) -> AppResult<()>;

    /// Restrictions of a room touching the inclusive day range `[first, last]`
    async fn restrictions_for_room(
        &self,
        room_id: i32,
        first: NaiveDate,
        last: NaiveDate,
    ) -> AppResult<Vec<RoomRestriction>>;

    /// Insert a one-day owner block, returning the restriction id
    async fn insert_block(&self, room_id: i32, day: NaiveDate) -> AppResult<i32>;

    async fn delete_block(&self, restriction_id: i32) -> AppResult<()>;

    async fn user_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Create a back-office user, or reset the password of an existing one
    async fn upsert_user(&self, email: &str, password_hash: &str) -> AppResult<i32>;
}

/// Pool handle shared by the Postgres repositories, bounding each operation by a timeout
#[derive(Clone)]
pub struct Db {
    pool: Pool<Postgres>,
    query_timeout: Duration,
}

impl Db {
    pub fn new(pool: Pool<Postgres>, query_timeout: Duration) -> Self {
        Self { pool, query_timeout }
    }

    pub fn pool(&self) -> &Pool<Postgres> {
        &self.pool
    }

    /// Run a store operation, failing with `AppError::Timeout` past the configured limit
    pub async fn timed<T, F>(&self, operation: &str, fut: F) -> AppResult<T>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.query_timeout, fut).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(AppError::Timeout(operation.to_string())),
        }
    }
}

/// Postgres-backed repository
#[derive(Clone)]
pub struct PgRepository {
    db: Db,
    pub rooms: rooms::RoomsRepository,
    pub reservations: reservations::ReservationsRepository,
    pub restrictions: restrictions::RestrictionsRepository,
    pub users: users::UsersRepository,
}

impl PgRepository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>, query_timeout: Duration) -> Self {
        let db = Db::new(pool, query_timeout);
        Self {
            rooms: rooms::RoomsRepository::new(db.clone()),
            reservations: reservations::ReservationsRepository::new(db.clone()),
            restrictions: restrictions::RestrictionsRepository::new(db.clone()),
            users: users::UsersRepository::new(db.clone()),
            db,
        }
    }
}

#[async_trait]
impl BookingRepository for PgRepository {
    async fn ping(&self) -> AppResult<()> {
        self.db
            .timed("ping", sqlx::query("SELECT 1").execute(self.db.pool()))
            .await?;
        Ok(())
    }

    async fn all_rooms(&self) -> AppResult<Vec<Room>> {
        self.rooms.list().await
    }

    async fn room_by_id(&self, id: i32) -> AppResult<Room> {
        self.rooms.get_by_id(id).await
    }

    async fn available_rooms(&self, start: NaiveDate, end: NaiveDate) -> AppResult<Vec<Room>> {
        self.rooms.available(start, end).await
    }

    async fn is_room_available(&self, room_id: i32, start: NaiveDate, end: NaiveDate) -> AppResult<bool> {
        self.restrictions.room_is_free(room_id, start, end).await
    }

    async fn create_reservation(&self, reservation: &NewReservation) -> AppResult<i32> {
        self.reservations.create(reservation).await
    }

    async fn all_reservations(&self) -> AppResult<Vec<Reservation>> {
        self.reservations.list_all().await
    }

    async fn new_reservations(&self) -> AppResult<Vec<Reservation>> {
        self.reservations.list_new().await
    }

    async fn reservation_by_id(&self, id: i32) -> AppResult<Reservation> {
        self.reservations.get_by_id(id).await
    }

    async fn update_reservation_guest(&self, id: i32, guest: &GuestDetails) -> AppResult<()> {
        self.reservations.update_guest(id, guest).await
    }

    async fn set_reservation_processed(&self, id: i32, processed: bool) -> AppResult<()> {
        self.reservations.set_processed(id, processed).await
    }

    async fn delete_reservation(&self, id: i32) -> AppResult<()> {
        self.reservations.delete(id).await
    }

    async fn restrictions_for_room(
        &self,
        room_id: i32,
        first: NaiveDate,
        last: NaiveDate,
    ) -> AppResult<Vec<RoomRestriction>> {
        self.restrictions.for_room_between(room_id, first, last).await
    }

    async fn insert_block(&self, room_id: i32, day: NaiveDate) -> AppResult<i32> {
        self.restrictions.insert_block(room_id, day).await
    }

    async fn delete_block(&self, restriction_id: i32) -> AppResult<()> {
        self.restrictions.delete_block(restriction_id).await
    }

    async fn user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.users.get_by_email(email).await
    }

    async fn upsert_user(&self, email: &str, password_hash: &str) -> AppResult<i32> {
        self.users.upsert(email, password_hash).await
    }
}

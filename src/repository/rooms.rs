//! Rooms repository for database operations

use chrono::NaiveDate;

use super::Db;
use crate::{
    error::{AppError, AppResult},
    models::Room,
};

#[derive(Clone)]
pub struct RoomsRepository {
    db: Db,
}

impl RoomsRepository {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// All rooms, ordered by name
    pub async fn list(&self) -> AppResult<Vec<Room>> {
        self.db
            .timed(
                "rooms.list",
                sqlx::query_as::<_, Room>(
                    "SELECT id, room_name, created_at, updated_at FROM rooms ORDER BY room_name",
                )
                .fetch_all(self.db.pool()),
            )
            .await
    }

    /// Get room by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Room> {
        self.db
            .timed(
                "rooms.get_by_id",
                sqlx::query_as::<_, Room>(
                    "SELECT id, room_name, created_at, updated_at FROM rooms WHERE id = $1",
                )
                .bind(id)
                .fetch_optional(self.db.pool()),
            )
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Room with id {} not found", id)))
    }

    /// Rooms with no restriction overlapping `[start, end)`
    pub async fn available(&self, start: NaiveDate, end: NaiveDate) -> AppResult<Vec<Room>> {
        self.db
            .timed(
                "rooms.available",
                sqlx::query_as::<_, Room>(
                    r#"
                    SELECT r.id, r.room_name, r.created_at, r.updated_at
                    FROM rooms r
                    WHERE r.id NOT IN (
                        SELECT rr.room_id
                        FROM room_restrictions rr
                        WHERE rr.start_date < $1 AND rr.end_date > $2
                    )
                    ORDER BY r.room_name
                    "#,
                )
                .bind(end)
                .bind(start)
                .fetch_all(self.db.pool()),
            )
            .await
    }
}

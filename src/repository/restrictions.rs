//! Room restrictions repository (reservation-backed ranges and owner blocks)

use chrono::{NaiveDate, Utc};

use super::Db;
use crate::{
    error::{AppError, AppResult},
    models::{NewRestriction, RoomRestriction},
};

#[derive(Clone)]
pub struct RestrictionsRepository {
    db: Db,
}

impl RestrictionsRepository {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Whether the room has no restriction overlapping `[start, end)`
    pub async fn room_is_free(&self, room_id: i32, start: NaiveDate, end: NaiveDate) -> AppResult<bool> {
        let overlapping: i64 = self
            .db
            .timed(
                "restrictions.room_is_free",
                sqlx::query_scalar(
                    r#"
                    SELECT COUNT(id)
                    FROM room_restrictions
                    WHERE room_id = $1 AND start_date < $2 AND end_date > $3
                    "#,
                )
                .bind(room_id)
                .bind(end)
                .bind(start)
                .fetch_one(self.db.pool()),
            )
            .await?;

        Ok(overlapping == 0)
    }

    /// Restrictions for a room touching the inclusive range `[first, last]`
    pub async fn for_room_between(
        &self,
        room_id: i32,
        first: NaiveDate,
        last: NaiveDate,
    ) -> AppResult<Vec<RoomRestriction>> {
        self.db
            .timed(
                "restrictions.for_room_between",
                sqlx::query_as::<_, RoomRestriction>(
                    r#"
                    SELECT id, room_id, reservation_id, restriction_id, start_date, end_date,
                           created_at, updated_at
                    FROM room_restrictions
                    WHERE room_id = $1 AND end_date > $2 AND start_date <= $3
                    ORDER BY start_date
                    "#,
                )
                .bind(room_id)
                .bind(first)
                .bind(last)
                .fetch_all(self.db.pool()),
            )
            .await
    }

    /// Insert a one-day owner block
    pub async fn insert_block(&self, room_id: i32, day: NaiveDate) -> AppResult<i32> {
        let block = NewRestriction::owner_block(room_id, day);
        let now = Utc::now();

        self.db
            .timed(
                "restrictions.insert_block",
                sqlx::query_scalar::<_, i32>(
                    r#"
                    INSERT INTO room_restrictions
                        (start_date, end_date, room_id, reservation_id, restriction_id, created_at, updated_at)
                    VALUES ($1, $2, $3, NULL, $4, $5, $5)
                    RETURNING id
                    "#,
                )
                .bind(block.start_date)
                .bind(block.end_date)
                .bind(block.room_id)
                .bind(block.kind.id())
                .bind(now)
                .fetch_one(self.db.pool()),
            )
            .await
    }

    /// Delete an owner block. Reservation-backed rows are left alone.
    pub async fn delete_block(&self, id: i32) -> AppResult<()> {
        let result = self
            .db
            .timed(
                "restrictions.delete_block",
                sqlx::query(
                    "DELETE FROM room_restrictions WHERE id = $1 AND COALESCE(reservation_id, 0) = 0",
                )
                .bind(id)
                .execute(self.db.pool()),
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Block {} not found", id)));
        }
        Ok(())
    }
}

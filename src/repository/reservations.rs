//! Reservations repository for database operations

use chrono::Utc;

use super::Db;
use crate::{
    error::{AppError, AppResult},
    models::{GuestDetails, NewReservation, Reservation, RestrictionKind},
};

const SELECT_RESERVATION: &str = r#"
    SELECT r.id, r.first_name, r.last_name, r.email, r.phone, r.start_date, r.end_date,
           r.room_id, r.processed, rm.room_name, r.created_at, r.updated_at
    FROM reservations r
    JOIN rooms rm ON r.room_id = rm.id
"#;

#[derive(Clone)]
pub struct ReservationsRepository {
    db: Db,
}

impl ReservationsRepository {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Insert a reservation and the restriction blocking its dates in one transaction.
    ///
    /// The room row is locked while its restrictions are checked, so two
    /// overlapping bookings for one room cannot both commit. A conflict, a
    /// failure on either insert, or a timeout drops the transaction, which
    /// rolls back: no reservation is left without its restriction.
    pub async fn create(&self, reservation: &NewReservation) -> AppResult<i32> {
        let now = Utc::now();
        let pool = self.db.pool();

        let created = self
            .db
            .timed("reservations.create", async move {
                let mut tx = pool.begin().await?;

                sqlx::query("SELECT id FROM rooms WHERE id = $1 FOR UPDATE")
                    .bind(reservation.room_id)
                    .fetch_optional(&mut *tx)
                    .await?;

                let overlapping: i64 = sqlx::query_scalar(
                    r#"
                    SELECT COUNT(*) FROM room_restrictions
                    WHERE room_id = $1 AND start_date < $2 AND end_date > $3
                    "#,
                )
                .bind(reservation.room_id)
                .bind(reservation.end_date)
                .bind(reservation.start_date)
                .fetch_one(&mut *tx)
                .await?;

                if overlapping > 0 {
                    return Ok(None);
                }

                let id: i32 = sqlx::query_scalar(
                    r#"
                    INSERT INTO reservations
                        (first_name, last_name, email, phone, start_date, end_date, room_id,
                         processed, created_at, updated_at)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, 0, $8, $8)
                    RETURNING id
                    "#,
                )
                .bind(&reservation.guest.first_name)
                .bind(&reservation.guest.last_name)
                .bind(&reservation.guest.email)
                .bind(&reservation.guest.phone)
                .bind(reservation.start_date)
                .bind(reservation.end_date)
                .bind(reservation.room_id)
                .bind(now)
                .fetch_one(&mut *tx)
                .await?;

                sqlx::query(
                    r#"
                    INSERT INTO room_restrictions
                        (start_date, end_date, room_id, reservation_id, restriction_id, created_at, updated_at)
                    VALUES ($1, $2, $3, $4, $5, $6, $6)
                    "#,
                )
                .bind(reservation.start_date)
                .bind(reservation.end_date)
                .bind(reservation.room_id)
                .bind(id)
                .bind(RestrictionKind::Reservation.id())
                .bind(now)
                .execute(&mut *tx)
                .await?;

                tx.commit().await?;
                Ok::<Option<i32>, sqlx::Error>(Some(id))
            })
            .await?;

        created.ok_or_else(|| {
            AppError::Conflict(format!(
                "room {} is not available from {} to {}",
                reservation.room_id, reservation.start_date, reservation.end_date
            ))
        })
    }

    /// All reservations, ordered by start date
    pub async fn list_all(&self) -> AppResult<Vec<Reservation>> {
        let query = format!("{} ORDER BY r.start_date ASC", SELECT_RESERVATION);
        self.db
            .timed(
                "reservations.list_all",
                sqlx::query_as::<_, Reservation>(&query).fetch_all(self.db.pool()),
            )
            .await
    }

    /// Unprocessed reservations, ordered by start date
    pub async fn list_new(&self) -> AppResult<Vec<Reservation>> {
        let query = format!(
            "{} WHERE r.processed = 0 ORDER BY r.start_date ASC",
            SELECT_RESERVATION
        );
        self.db
            .timed(
                "reservations.list_new",
                sqlx::query_as::<_, Reservation>(&query).fetch_all(self.db.pool()),
            )
            .await
    }

    /// Get reservation by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Reservation> {
        let query = format!("{} WHERE r.id = $1", SELECT_RESERVATION);
        self.db
            .timed(
                "reservations.get_by_id",
                sqlx::query_as::<_, Reservation>(&query)
                    .bind(id)
                    .fetch_optional(self.db.pool()),
            )
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Reservation with id {} not found", id)))
    }

    /// Update guest contact fields
    pub async fn update_guest(&self, id: i32, guest: &GuestDetails) -> AppResult<()> {
        let result = self
            .db
            .timed(
                "reservations.update_guest",
                sqlx::query(
                    r#"
                    UPDATE reservations
                    SET first_name = $1, last_name = $2, email = $3, phone = $4, updated_at = $5
                    WHERE id = $6
                    "#,
                )
                .bind(&guest.first_name)
                .bind(&guest.last_name)
                .bind(&guest.email)
                .bind(&guest.phone)
                .bind(Utc::now())
                .bind(id)
                .execute(self.db.pool()),
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Reservation with id {} not found", id)));
        }
        Ok(())
    }

    /// Set the processed flag
    pub async fn set_processed(&self, id: i32, processed: bool) -> AppResult<()> {
        let result = self
            .db
            .timed(
                "reservations.set_processed",
                sqlx::query("UPDATE reservations SET processed = $1, updated_at = $2 WHERE id = $3")
                    .bind(i32::from(processed))
                    .bind(Utc::now())
                    .bind(id)
                    .execute(self.db.pool()),
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Reservation with id {} not found", id)));
        }
        Ok(())
    }

    /// Delete a reservation (its restriction cascades)
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = self
            .db
            .timed(
                "reservations.delete",
                sqlx::query("DELETE FROM reservations WHERE id = $1")
                    .bind(id)
                    .execute(self.db.pool()),
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Reservation with id {} not found", id)));
        }
        Ok(())
    }
}

//! Users repository for database operations

use chrono::Utc;

use super::Db;
use crate::{error::AppResult, models::User};

#[derive(Clone)]
pub struct UsersRepository {
    db: Db,
}

impl UsersRepository {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Get user by email (login identifier), case-insensitive
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        self.db
            .timed(
                "users.get_by_email",
                sqlx::query_as::<_, User>(
                    r#"
                    SELECT id, first_name, last_name, email, password, access_level, created_at, updated_at
                    FROM users
                    WHERE LOWER(email) = LOWER($1)
                    "#,
                )
                .bind(email)
                .fetch_optional(self.db.pool()),
            )
            .await
    }

    /// Insert a user keyed by email, updating the password when it already exists
    pub async fn upsert(&self, email: &str, password_hash: &str) -> AppResult<i32> {
        self.db
            .timed(
                "users.upsert",
                sqlx::query_scalar::<_, i32>(
                    r#"
                    INSERT INTO users (first_name, last_name, email, password, access_level, created_at, updated_at)
                    VALUES ('Admin', 'User', $1, $2, 3, $3, $3)
                    ON CONFLICT (email) DO UPDATE SET password = EXCLUDED.password, updated_at = EXCLUDED.updated_at
                    RETURNING id
                    "#,
                )
                .bind(email)
                .bind(password_hash)
                .bind(Utc::now())
                .fetch_one(self.db.pool()),
            )
            .await
    }
}

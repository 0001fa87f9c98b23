//! Back-office user authentication

use std::sync::Arc;

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;

use crate::{
    error::{AppError, AppResult},
    models::User,
    repository::BookingRepository,
};

#[derive(Clone)]
pub struct UsersService {
    store: Arc<dyn BookingRepository>,
}

impl UsersService {
    pub fn new(store: Arc<dyn BookingRepository>) -> Self {
        Self { store }
    }

    /// Check email and password, returning the user id
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<i32> {
        let user = self
            .store
            .user_by_email(email)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid login credentials".to_string()))?;

        if !verify_password(&user, password)? {
            return Err(AppError::Authentication("Invalid login credentials".to_string()));
        }

        tracing::info!(user_id = user.id, "User logged in");
        Ok(user.id)
    }
}

fn verify_password(user: &User, password: &str) -> AppResult<bool> {
    let parsed_hash = PasswordHash::new(&user.password)
        .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Hash a password using Argon2
pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

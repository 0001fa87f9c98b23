//! Lodging Bookings
//!
//! Reservation website for a small lodging: public pages, availability
//! search, a session-backed booking flow with email notifications, and a
//! back-office with a reservation calendar and owner blocks.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod forms;
pub mod models;
pub mod repository;
pub mod services;
pub mod session;
pub mod views;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
    pub sessions: Arc<dyn session::SessionStore>,
}

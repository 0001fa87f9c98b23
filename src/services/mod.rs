//! Business logic services

pub mod availability;
pub mod calendar;
pub mod email;
pub mod reservations;
pub mod users;

use std::sync::Arc;

use crate::{config::EmailConfig, repository::BookingRepository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub availability: availability::AvailabilityService,
    pub calendar: calendar::CalendarService,
    pub reservations: reservations::ReservationsService,
    pub users: users::UsersService,
    pub store: Arc<dyn BookingRepository>,
}

impl Services {
    /// Create all services over one store and the outbound mail queue
    pub fn new(store: Arc<dyn BookingRepository>, mail: email::MailQueue, email_config: EmailConfig) -> Self {
        Self {
            availability: availability::AvailabilityService::new(store.clone()),
            calendar: calendar::CalendarService::new(store.clone()),
            reservations: reservations::ReservationsService::new(store.clone(), mail, email_config),
            users: users::UsersService::new(store.clone()),
            store,
        }
    }
}

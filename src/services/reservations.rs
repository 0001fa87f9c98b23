//! Booking and back-office reservation management

use std::{collections::HashMap, sync::Arc};

use crate::{
    config::EmailConfig,
    error::{AppError, AppResult},
    forms::Form,
    models::{GuestDetails, Reservation, ReservationDraft, ReservationSource},
    repository::BookingRepository,
    services::email::{guest_confirmation, owner_notification, MailQueue},
};

/// Check the guest fields of a reservation form
pub fn validate_guest(values: HashMap<String, String>) -> Form {
    let mut form = Form::new(values);
    form.required(&["first_name", "last_name", "email"]);
    form.min_length("first_name", 3);
    form.is_email("email");
    form
}

pub fn guest_from_form(form: &Form) -> GuestDetails {
    GuestDetails {
        first_name: form.get("first_name").trim().to_string(),
        last_name: form.get("last_name").trim().to_string(),
        email: form.get("email").trim().to_string(),
        phone: form.get("phone").trim().to_string(),
    }
}

/// Outcome of submitting the reservation form
#[derive(Debug)]
pub enum BookingResult {
    /// Stored; the draft now carries the reservation id
    Confirmed(ReservationDraft),
    /// Form rejected; the draft holds the typed values for redisplay
    Invalid { draft: ReservationDraft, form: Form },
    /// The room was taken for these dates after it was chosen
    Unavailable(ReservationDraft),
}

#[derive(Clone)]
pub struct ReservationsService {
    store: Arc<dyn BookingRepository>,
    mail: MailQueue,
    email: EmailConfig,
}

impl ReservationsService {
    pub fn new(store: Arc<dyn BookingRepository>, mail: MailQueue, email: EmailConfig) -> Self {
        Self { store, mail, email }
    }

    /// Attach the room name to a draft that has a room but no name yet
    pub async fn with_room_name(&self, mut draft: ReservationDraft) -> AppResult<ReservationDraft> {
        if let (Some(room_id), None) = (draft.room_id, &draft.room_name) {
            draft.room_name = Some(self.store.room_by_id(room_id).await?.room_name);
        }
        Ok(draft)
    }

    /// Validate the form, store the reservation and queue both notifications
    pub async fn book(&self, draft: ReservationDraft, values: HashMap<String, String>) -> AppResult<BookingResult> {
        let form = validate_guest(values);
        let mut draft = draft;
        draft.guest = guest_from_form(&form);

        if !form.valid() {
            return Ok(BookingResult::Invalid { draft, form });
        }

        let mut draft = self.with_room_name(draft).await?;
        let new = draft
            .to_new_reservation()
            .ok_or_else(|| AppError::Session("reservation has no room".to_string()))?;

        let id = match self.store.create_reservation(&new).await {
            Err(AppError::Conflict(reason)) => {
                tracing::info!(room_id = new.room_id, "Booking refused: {}", reason);
                return Ok(BookingResult::Unavailable(draft));
            }
            other => other?,
        };
        draft.reservation_id = Some(id);
        tracing::info!(
            reservation_id = id,
            room_id = new.room_id,
            start = %new.start_date,
            end = %new.end_date,
            "Reservation created"
        );

        self.mail.enqueue(guest_confirmation(&draft, &self.email));
        self.mail.enqueue(owner_notification(&draft, &self.email));

        Ok(BookingResult::Confirmed(draft))
    }

    pub async fn list(&self, source: ReservationSource) -> AppResult<Vec<Reservation>> {
        match source {
            ReservationSource::New => self.store.new_reservations().await,
            ReservationSource::All | ReservationSource::Calendar => self.store.all_reservations().await,
        }
    }

    pub async fn get(&self, id: i32) -> AppResult<Reservation> {
        self.store.reservation_by_id(id).await
    }

    /// Update guest fields from the admin form. Returns the form when it fails validation.
    pub async fn update_guest(&self, id: i32, values: HashMap<String, String>) -> AppResult<Result<(), Form>> {
        let form = validate_guest(values);
        if !form.valid() {
            return Ok(Err(form));
        }
        self.store
            .update_reservation_guest(id, &guest_from_form(&form))
            .await?;
        tracing::info!(reservation_id = id, "Reservation updated");
        Ok(Ok(()))
    }

    pub async fn mark_processed(&self, id: i32) -> AppResult<()> {
        self.store.set_reservation_processed(id, true).await?;
        tracing::info!(reservation_id = id, "Reservation marked as processed");
        Ok(())
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.store.delete_reservation(id).await?;
        tracing::info!(reservation_id = id, "Reservation deleted");
        Ok(())
    }
}

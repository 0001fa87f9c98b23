//! Data models for the lodging bookings site

pub mod mail;
pub mod reservation;
pub mod restriction;
pub mod room;
pub mod user;

// Re-export commonly used types
pub use mail::MailData;
pub use reservation::{GuestDetails, NewReservation, Reservation, ReservationDraft, ReservationSource};
pub use restriction::{NewRestriction, RestrictionKind, RoomRestriction};
pub use room::Room;
pub use user::User;

//! Reservation form and summary

use std::collections::HashMap;

use axum::{extract::State, response::Response, Form};

use super::{redirect, redirect_home_with_error, render};
use crate::{
    error::AppResult,
    services::reservations::BookingResult,
    session::Session,
    views::booking,
    AppState,
};

pub async fn make_reservation(State(state): State<AppState>, mut session: Session) -> AppResult<Response> {
    let draft = match session.take_reservation() {
        Some(draft) if draft.room_id.is_some() => draft,
        _ => return redirect_home_with_error(session, "Can't get reservation from session").await,
    };

    let draft = state.services.reservations.with_room_name(draft).await?;
    session.put_reservation(draft.clone());
    render(session, |chrome| booking::make_reservation(chrome, &draft, None)).await
}

pub async fn post_reservation(
    State(state): State<AppState>,
    mut session: Session,
    Form(form): Form<HashMap<String, String>>,
) -> AppResult<Response> {
    let draft = match session.take_reservation() {
        Some(draft) if draft.room_id.is_some() && draft.reservation_id.is_none() => draft,
        _ => return redirect_home_with_error(session, "Can't get reservation from session").await,
    };

    match state.services.reservations.book(draft, form).await? {
        BookingResult::Invalid { draft, form } => {
            session.put_reservation(draft.clone());
            render(session, |chrome| {
                booking::make_reservation(chrome, &draft, Some(&form.errors))
            })
            .await
        }
        BookingResult::Confirmed(draft) => {
            session.put_reservation(draft);
            redirect(session, "/reservation-summary").await
        }
        BookingResult::Unavailable(_) => {
            session.put_error("Room is no longer available");
            redirect(session, "/search-availability").await
        }
    }
}

/// Show the just-booked reservation once, then forget it
pub async fn reservation_summary(mut session: Session) -> AppResult<Response> {
    let draft = match session.take_reservation() {
        Some(draft) if draft.reservation_id.is_some() => draft,
        Some(draft) => {
            session.put_reservation(draft);
            return redirect_home_with_error(session, "Can't get reservation from session").await;
        }
        None => return redirect_home_with_error(session, "Can't get reservation from session").await,
    };

    render(session, |chrome| booking::reservation_summary(chrome, &draft)).await
}

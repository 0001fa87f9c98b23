//! Availability search and room selection

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    response::Response,
    Form, Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{redirect, redirect_home_with_error, render};
use crate::{
    error::AppResult,
    models::ReservationDraft,
    services::availability::parse_stay,
    session::Session,
    views::booking,
    AppState,
};

/// Search the rooms free for the posted dates
pub async fn post_search_availability(
    State(state): State<AppState>,
    mut session: Session,
    Form(form): Form<HashMap<String, String>>,
) -> AppResult<Response> {
    let field = |name: &str| form.get(name).map(String::as_str).unwrap_or_default();
    let (start, end) = match parse_stay(field("start"), field("end")) {
        Ok(stay) => stay,
        Err(e) => {
            tracing::info!("Rejected availability search: {}", e);
            session.put_error("Invalid dates, please select your arrival and departure again");
            return redirect(session, "/search-availability").await;
        }
    };

    let rooms = state.services.availability.search(start, end).await?;
    if rooms.is_empty() {
        session.put_error("No availability for selected dates");
        return redirect(session, "/search-availability").await;
    }

    session.put_reservation(ReservationDraft::new(start, end));
    render(session, |chrome| booking::choose_room(chrome, &rooms)).await
}

/// Form fields of the per-room availability check
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(default)]
pub struct AvailabilityRequest {
    /// Arrival, YYYY-MM-DD
    pub start: String,
    /// Departure, YYYY-MM-DD
    pub end: String,
    pub room_id: String,
}

/// Answer of the per-room availability check
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AvailabilityResponse {
    /// Whether the room is free for the whole stay
    pub ok: bool,
    pub message: String,
    pub room_id: String,
    pub start_date: String,
    pub end_date: String,
}

/// Check one room for the posted dates
#[utoipa::path(
    post,
    path = "/search-availability-json",
    tag = "availability",
    request_body(
        content = AvailabilityRequest,
        content_type = "application/x-www-form-urlencoded"
    ),
    responses(
        (status = 200, description = "Availability of the room", body = AvailabilityResponse)
    )
)]
pub async fn availability_json(
    State(state): State<AppState>,
    Form(request): Form<AvailabilityRequest>,
) -> Json<AvailabilityResponse> {
    let mut response = AvailabilityResponse {
        ok: false,
        message: String::new(),
        room_id: request.room_id,
        start_date: request.start,
        end_date: request.end,
    };

    let stay = parse_stay(&response.start_date, &response.end_date);
    let room_id = response.room_id.trim().parse::<i32>();
    match (stay, room_id) {
        (Ok((start, end)), Ok(room_id)) => {
            match state.services.availability.room_available(room_id, start, end).await {
                Ok(available) => response.ok = available,
                Err(e) => {
                    tracing::error!(room_id, "Availability check failed: {}", e);
                    response.message = "Internal server error".to_string();
                }
            }
        }
        (Err(e), _) => response.message = e.to_string(),
        (_, Err(_)) => response.message = format!("Invalid room id '{}'", response.room_id),
    }

    Json(response)
}

/// Pick a room from the search results
pub async fn choose_room(
    mut session: Session,
    Path(room_id): Path<i32>,
) -> AppResult<Response> {
    let Some(mut draft) = session.take_reservation() else {
        return redirect_home_with_error(session, "Can't get reservation from session").await;
    };

    if draft.room_id != Some(room_id) {
        draft.room_name = None;
    }
    draft.room_id = Some(room_id);
    session.put_reservation(draft);
    redirect(session, "/make-reservation").await
}

#[derive(Debug, Deserialize)]
pub struct BookRoomQuery {
    pub id: i32,
    pub s: String,
    pub e: String,
}

/// Start a booking straight from a room page
pub async fn book_room(
    State(state): State<AppState>,
    mut session: Session,
    Query(query): Query<BookRoomQuery>,
) -> AppResult<Response> {
    let (start, end) = parse_stay(&query.s, &query.e)?;
    let room = state.services.availability.room(query.id).await?;

    let mut draft = ReservationDraft::for_room(room.id, start, end);
    draft.room_name = Some(room.room_name);
    session.put_reservation(draft);
    redirect(session, "/make-reservation").await
}

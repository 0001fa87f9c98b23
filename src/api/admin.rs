//! Back-office: reservation lists, detail pages and the owner block calendar

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    response::Response,
    Form,
};
use chrono::Local;
use serde::Deserialize;

use super::{redirect, render, AdminSession};
use crate::{
    error::AppResult,
    models::ReservationSource,
    services::calendar::{diff_blocks, return_path, CalendarMonth},
    session::Session,
    views::admin,
    AppState,
};

pub async fn dashboard(AdminSession(session): AdminSession) -> AppResult<Response> {
    render(session, admin::dashboard).await
}

async fn list(state: &AppState, session: Session, source: ReservationSource) -> AppResult<Response> {
    let reservations = state.services.reservations.list(source).await?;
    render(session, |chrome| {
        admin::reservations_list(chrome, source, &reservations)
    })
    .await
}

pub async fn new_reservations(
    State(state): State<AppState>,
    AdminSession(session): AdminSession,
) -> AppResult<Response> {
    list(&state, session, ReservationSource::New).await
}

pub async fn all_reservations(
    State(state): State<AppState>,
    AdminSession(session): AdminSession,
) -> AppResult<Response> {
    list(&state, session, ReservationSource::All).await
}

#[derive(Debug, Default, Deserialize)]
pub struct CalendarQuery {
    pub y: Option<String>,
    pub m: Option<String>,
}

impl CalendarQuery {
    fn month(&self) -> AppResult<CalendarMonth> {
        CalendarMonth::from_query(self.y.as_deref(), self.m.as_deref(), Local::now().date_naive())
    }
}

/// The reservation's source and, for the calendar, the month it was opened from
fn origin(src: &str, query: &CalendarQuery) -> AppResult<(ReservationSource, Option<CalendarMonth>)> {
    let source: ReservationSource = src.parse()?;
    let month = match source {
        ReservationSource::Calendar => Some(query.month()?),
        _ => None,
    };
    Ok((source, month))
}

pub async fn show_reservation(
    State(state): State<AppState>,
    AdminSession(session): AdminSession,
    Path((src, id)): Path<(String, i32)>,
    Query(query): Query<CalendarQuery>,
) -> AppResult<Response> {
    let (source, month) = origin(&src, &query)?;
    let reservation = state.services.reservations.get(id).await?;
    let guest = reservation.guest();
    render(session, |chrome| {
        admin::reservation_show(chrome, source, month, &reservation, &guest, None)
    })
    .await
}

pub async fn post_show_reservation(
    State(state): State<AppState>,
    AdminSession(mut session): AdminSession,
    Path((src, id)): Path<(String, i32)>,
    Query(query): Query<CalendarQuery>,
    Form(values): Form<HashMap<String, String>>,
) -> AppResult<Response> {
    let (source, month) = origin(&src, &query)?;
    let reservation = state.services.reservations.get(id).await?;

    match state.services.reservations.update_guest(id, values).await? {
        Ok(()) => {
            session.put_flash("Reservation saved");
            redirect(session, &return_path(source, month)).await
        }
        Err(form) => {
            let guest = crate::services::reservations::guest_from_form(&form);
            render(session, |chrome| {
                admin::reservation_show(chrome, source, month, &reservation, &guest, Some(&form.errors))
            })
            .await
        }
    }
}

pub async fn process_reservation(
    State(state): State<AppState>,
    AdminSession(mut session): AdminSession,
    Path((src, id)): Path<(String, i32)>,
    Query(query): Query<CalendarQuery>,
) -> AppResult<Response> {
    let (source, month) = origin(&src, &query)?;
    state.services.reservations.mark_processed(id).await?;
    session.put_flash("Reservation marked as processed");
    redirect(session, &return_path(source, month)).await
}

pub async fn delete_reservation(
    State(state): State<AppState>,
    AdminSession(mut session): AdminSession,
    Path((src, id)): Path<(String, i32)>,
    Query(query): Query<CalendarQuery>,
) -> AppResult<Response> {
    let (source, month) = origin(&src, &query)?;
    state.services.reservations.delete(id).await?;
    session.put_flash("Reservation deleted");
    redirect(session, &return_path(source, month)).await
}

pub async fn reservations_calendar(
    State(state): State<AppState>,
    AdminSession(mut session): AdminSession,
    Query(query): Query<CalendarQuery>,
) -> AppResult<Response> {
    let month = query.month()?;
    let view = state.services.calendar.month_view(month).await?;

    for room in &view.rooms {
        session.put_block_map(room.room.id, room.blocks.clone());
    }
    render(session, |chrome| admin::calendar(chrome, &view)).await
}

pub async fn post_reservations_calendar(
    State(state): State<AppState>,
    AdminSession(mut session): AdminSession,
    Form(form): Form<HashMap<String, String>>,
) -> AppResult<Response> {
    let field = |name: &str| form.get(name).map(String::as_str);
    let today = Local::now().date_naive();
    let month = CalendarMonth::from_query(field("y"), field("m"), today)?;

    let changes = diff_blocks(&session.take_block_maps(), &form);
    state.services.calendar.apply(&changes).await?;

    session.put_flash("Changes saved");
    redirect(session, &month.path()).await
}

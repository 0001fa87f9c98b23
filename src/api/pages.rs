//! Static content pages

use axum::response::Response;

use super::render;
use crate::{error::AppResult, session::Session, views::pages};

pub async fn home(session: Session) -> AppResult<Response> {
    render(session, pages::home).await
}

pub async fn about(session: Session) -> AppResult<Response> {
    render(session, pages::about).await
}

pub async fn generals_quarters(session: Session) -> AppResult<Response> {
    render(session, pages::generals_quarters).await
}

pub async fn majors_suite(session: Session) -> AppResult<Response> {
    render(session, pages::majors_suite).await
}

pub async fn contact(session: Session) -> AppResult<Response> {
    render(session, pages::contact).await
}

pub async fn search_availability(session: Session) -> AppResult<Response> {
    render(session, pages::search_availability).await
}

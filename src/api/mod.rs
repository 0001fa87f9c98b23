//! HTTP handlers and the application router

pub mod admin;
pub mod auth;
pub mod availability;
pub mod health;
pub mod openapi;
pub mod pages;
pub mod reservations;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{error::AppResult, session::Session, views::Chrome, AppState};

/// Build the full router: public site, booking flow, back-office, health and docs
pub fn router(state: AppState) -> Router {
    let admin = Router::new()
        .route("/dashboard", get(admin::dashboard))
        .route("/reservations-new", get(admin::new_reservations))
        .route("/reservations-all", get(admin::all_reservations))
        .route(
            "/reservations-calendar",
            get(admin::reservations_calendar).post(admin::post_reservations_calendar),
        )
        .route(
            "/reservations/:src/:id",
            get(admin::show_reservation).post(admin::post_show_reservation),
        )
        .route("/process-reservation/:src/:id", get(admin::process_reservation))
        .route("/delete-reservation/:src/:id", get(admin::delete_reservation));

    let site = Router::new()
        .route("/", get(pages::home))
        .route("/about", get(pages::about))
        .route("/generals-quarters", get(pages::generals_quarters))
        .route("/majors-suite", get(pages::majors_suite))
        .route("/contact", get(pages::contact))
        .route(
            "/search-availability",
            get(pages::search_availability).post(availability::post_search_availability),
        )
        .route("/search-availability-json", post(availability::availability_json))
        .route("/choose-room/:id", get(availability::choose_room))
        .route("/book-room", get(availability::book_room))
        .route(
            "/make-reservation",
            get(reservations::make_reservation).post(reservations::post_reservation),
        )
        .route("/reservation-summary", get(reservations::reservation_summary))
        .route("/user/login", get(auth::show_login).post(auth::post_login))
        .route("/user/logout", get(auth::logout))
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .nest("/admin", admin)
        .with_state(state);

    Router::new()
        .merge(site)
        .merge(openapi::create_openapi_router())
        .nest_service("/static", ServeDir::new("static"))
        .layer(TraceLayer::new_for_http())
}

/// Render a page with the session's pending messages, then persist the session
pub(crate) async fn render(mut session: Session, page: impl FnOnce(&Chrome) -> String) -> AppResult<Response> {
    let chrome = Chrome {
        messages: session.take_messages(),
        authenticated: session.is_authenticated(),
    };
    let html = page(&chrome);
    let jar = session.commit().await?;
    Ok((jar, Html(html)).into_response())
}

/// Persist the session and answer `303 See Other`
pub(crate) async fn redirect(session: Session, to: &str) -> AppResult<Response> {
    let jar = session.commit().await?;
    Ok((jar, Redirect::to(to)).into_response())
}

/// Flash an error and send the visitor home
pub(crate) async fn redirect_home_with_error(mut session: Session, message: &str) -> AppResult<Response> {
    tracing::warn!("{}", message);
    session.put_error(message);
    redirect(session, "/").await
}

/// Session of a logged-in back-office user. Anyone else is sent to the login page.
pub struct AdminSession(pub Session);

#[async_trait]
impl FromRequestParts<AppState> for AdminSession {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let mut session = Session::from_request_parts(parts, state)
            .await
            .map_err(IntoResponse::into_response)?;

        if session.is_authenticated() {
            return Ok(AdminSession(session));
        }

        session.put_error("Log in first!");
        Err(redirect(session, "/user/login")
            .await
            .unwrap_or_else(IntoResponse::into_response))
    }
}

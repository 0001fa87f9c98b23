//! Router tests against the in-memory store and session store

use std::{sync::Arc, time::Duration};

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::NaiveDate;
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;

use lodging_bookings::{
    api,
    config::AppConfig,
    models::{GuestDetails, MailData, NewReservation},
    repository::{BookingRepository, MemoryRepository},
    services::{email::MailQueue, users::hash_password, Services},
    session::MemorySessionStore,
    AppState,
};

struct TestApp {
    router: Router,
    store: Arc<MemoryRepository>,
    mail: mpsc::Receiver<MailData>,
    cookie: Option<String>,
}

impl TestApp {
    fn new() -> Self {
        let config = AppConfig::default();
        let store = Arc::new(MemoryRepository::seeded());
        let (queue, mail) = MailQueue::channel(16);
        let services = Services::new(store.clone(), queue, config.email.clone());
        let state = AppState {
            config: Arc::new(config),
            services: Arc::new(services),
            sessions: Arc::new(MemorySessionStore::new(Duration::from_secs(3600))),
        };

        Self {
            router: api::router(state),
            store,
            mail,
            cookie: None,
        }
    }

    async fn send(&mut self, request: Request<Body>) -> Response {
        let response = self.router.clone().oneshot(request).await.unwrap();
        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
            self.cookie = Some(pair.to_string());
        }
        response
    }

    fn request(&self, method: &str, uri: &str) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(uri);
        match &self.cookie {
            Some(cookie) => builder.header(header::COOKIE, cookie),
            None => builder,
        }
    }

    async fn get(&mut self, uri: &str) -> Response {
        let request = self.request("GET", uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    async fn post_form(&mut self, uri: &str, form: &str) -> Response {
        let request = self
            .request("POST", uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn login(&mut self) {
        let hash = hash_password("password").unwrap();
        self.store.upsert_user("admin@admin.com", &hash).await.unwrap();
        let response = self
            .post_form("/user/login", "email=admin%40admin.com&password=password")
            .await;
        assert_eq!(location(&response), "/");
    }
}

fn location(response: &Response) -> &str {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn booking(room_id: i32, start: &str, end: &str) -> NewReservation {
    NewReservation {
        guest: GuestDetails {
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            email: "jane@doe.com".into(),
            phone: String::new(),
        },
        room_id,
        start_date: date(start),
        end_date: date(end),
    }
}

const GUEST_FORM: &str = "first_name=John&last_name=Smith&email=john%40smith.com&phone=555-555-5555";

#[tokio::test]
async fn static_pages_render() {
    let mut app = TestApp::new();
    for uri in [
        "/",
        "/about",
        "/generals-quarters",
        "/majors-suite",
        "/contact",
        "/search-availability",
    ] {
        let response = app.get(uri).await;
        assert_eq!(response.status(), StatusCode::OK, "{}", uri);
    }
}

#[tokio::test]
async fn booking_round_trip_shows_summary_once() {
    let mut app = TestApp::new();

    let response = app
        .post_form("/search-availability", "start=2025-06-01&end=2025-06-03")
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("/choose-room/1"));
    assert!(html.contains("/choose-room/2"));

    let response = app.get("/choose-room/1").await;
    assert_eq!(location(&response), "/make-reservation");

    let response = app.get("/make-reservation").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("General&#39;s Quarters"));
    assert!(html.contains("Arrival: 2025-06-01"));

    let response = app.post_form("/make-reservation", GUEST_FORM).await;
    assert_eq!(location(&response), "/reservation-summary");

    let response = app.get("/reservation-summary").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("John Smith"));
    assert!(html.contains("john@smith.com"));
    assert!(html.contains("555-555-5555"));

    let response = app.get("/reservation-summary").await;
    assert_eq!(location(&response), "/");

    assert_eq!(app.store.reservation_count().await, 1);
    assert!(!app
        .store
        .is_room_available(1, date("2025-06-01"), date("2025-06-03"))
        .await
        .unwrap());

    let guest = app.mail.try_recv().unwrap();
    assert_eq!(guest.to, "john@smith.com");
    let owner = app.mail.try_recv().unwrap();
    assert_eq!(owner.to, AppConfig::default().email.owner_address);
}

#[tokio::test]
async fn short_first_name_redisplays_form_without_writing() {
    let mut app = TestApp::new();
    app.post_form("/search-availability", "start=2025-06-01&end=2025-06-03")
        .await;
    app.get("/choose-room/2").await;

    let response = app
        .post_form(
            "/make-reservation",
            "first_name=Jo&last_name=Smith&email=jo%40smith.com&phone=",
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("This field must be at least 3 characters long"));
    assert!(html.contains(r#"name="last_name" value="Smith""#));

    assert_eq!(app.store.reservation_count().await, 0);
    assert!(app.mail.try_recv().is_err());

    // fixing the name completes the booking with the same draft
    let response = app.post_form("/make-reservation", GUEST_FORM).await;
    assert_eq!(location(&response), "/reservation-summary");
    assert_eq!(app.store.reservation_count().await, 1);
}

#[tokio::test]
async fn fully_booked_dates_flash_an_error() {
    let mut app = TestApp::new();
    app.store
        .create_reservation(&booking(1, "2025-06-01", "2025-06-05"))
        .await
        .unwrap();
    app.store
        .create_reservation(&booking(2, "2025-06-02", "2025-06-03"))
        .await
        .unwrap();

    let response = app
        .post_form("/search-availability", "start=2025-06-02&end=2025-06-04")
        .await;
    assert_eq!(location(&response), "/search-availability");

    let html = body_text(app.get("/search-availability").await).await;
    assert!(html.contains("No availability for selected dates"));

    // shown once only
    let html = body_text(app.get("/search-availability").await).await;
    assert!(!html.contains("No availability for selected dates"));
}

#[tokio::test]
async fn booked_room_is_left_out_of_search_results() {
    let mut app = TestApp::new();
    app.store
        .create_reservation(&booking(1, "2025-06-01", "2025-06-02"))
        .await
        .unwrap();

    let html = body_text(
        app.post_form("/search-availability", "start=2025-06-01&end=2025-06-03")
            .await,
    )
    .await;
    assert!(!html.contains("/choose-room/1"));
    assert!(html.contains("/choose-room/2"));
}

#[tokio::test]
async fn booking_over_an_existing_stay_is_refused() {
    let mut app = TestApp::new();
    app.store
        .create_reservation(&booking(1, "2025-06-01", "2025-06-05"))
        .await
        .unwrap();

    let response = app.get("/book-room?id=1&s=2025-06-02&e=2025-06-04").await;
    assert_eq!(location(&response), "/make-reservation");

    let response = app.post_form("/make-reservation", GUEST_FORM).await;
    assert_eq!(location(&response), "/search-availability");

    let html = body_text(app.get("/search-availability").await).await;
    assert!(html.contains("Room is no longer available"));

    assert_eq!(app.store.reservation_count().await, 1);
    let restrictions = app
        .store
        .restrictions_for_room(1, date("2025-06-01"), date("2025-06-30"))
        .await
        .unwrap();
    assert_eq!(restrictions.len(), 1);
    assert_eq!(restrictions[0].start_date, date("2025-06-01"));
    assert!(app.mail.try_recv().is_err());

    // the refused draft is gone
    let response = app.post_form("/make-reservation", GUEST_FORM).await;
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn summary_without_booking_redirects_home_with_error() {
    let mut app = TestApp::new();

    let response = app.get("/reservation-summary").await;
    assert_eq!(location(&response), "/");

    let html = body_text(app.get("/").await).await;
    assert!(html.contains("Can&#39;t get reservation from session"));
}

#[tokio::test]
async fn choosing_a_room_requires_a_search_first() {
    let mut app = TestApp::new();
    let response = app.get("/choose-room/1").await;
    assert_eq!(location(&response), "/");

    let response = app.post_form("/make-reservation", GUEST_FORM).await;
    assert_eq!(location(&response), "/");
    assert_eq!(app.store.reservation_count().await, 0);
}

#[tokio::test]
async fn book_room_link_starts_a_draft() {
    let mut app = TestApp::new();
    let response = app.get("/book-room?id=2&s=2025-07-01&e=2025-07-04").await;
    assert_eq!(location(&response), "/make-reservation");

    let html = body_text(app.get("/make-reservation").await).await;
    assert!(html.contains("Major&#39;s Suite"));
    assert!(html.contains("Departure: 2025-07-04"));

    let response = app.get("/book-room?id=9&s=2025-07-01&e=2025-07-04").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn availability_json_reports_room_status() {
    let mut app = TestApp::new();
    app.store
        .create_reservation(&booking(1, "2025-06-01", "2025-06-03"))
        .await
        .unwrap();

    let response = app
        .post_form(
            "/search-availability-json",
            "start=2025-06-02&end=2025-06-04&room_id=1",
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["ok"], false);
    assert_eq!(json["room_id"], "1");
    assert_eq!(json["start_date"], "2025-06-02");

    let response = app
        .post_form(
            "/search-availability-json",
            "start=2025-06-03&end=2025-06-05&room_id=1",
        )
        .await;
    let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["ok"], true);
    assert_eq!(json["message"], "");

    let response = app
        .post_form("/search-availability-json", "start=soon&end=2025-06-05&room_id=1")
        .await;
    let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["ok"], false);
    assert!(!json["message"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn back_office_requires_login() {
    let mut app = TestApp::new();
    for uri in [
        "/admin/dashboard",
        "/admin/reservations-new",
        "/admin/reservations-calendar",
    ] {
        let response = app.get(uri).await;
        assert_eq!(location(&response), "/user/login", "{}", uri);
    }
}

#[tokio::test]
async fn wrong_password_is_refused() {
    let mut app = TestApp::new();
    let hash = hash_password("password").unwrap();
    app.store.upsert_user("admin@admin.com", &hash).await.unwrap();

    let response = app
        .post_form("/user/login", "email=admin%40admin.com&password=nope")
        .await;
    assert_eq!(location(&response), "/user/login");

    let html = body_text(app.get("/user/login").await).await;
    assert!(html.contains("Invalid login credentials"));

    let response = app.get("/admin/dashboard").await;
    assert_eq!(location(&response), "/user/login");
}

#[tokio::test]
async fn login_form_validates_fields() {
    let mut app = TestApp::new();
    let response = app.post_form("/user/login", "email=not-an-email&password=").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Invalid email address"));
    assert!(html.contains("This field cannot be blank"));
}

#[tokio::test]
async fn login_then_logout() {
    let mut app = TestApp::new();
    app.login().await;

    let html = body_text(app.get("/").await).await;
    assert!(html.contains("Logged in successfully"));
    let response = app.get("/admin/dashboard").await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.get("/user/logout").await;
    assert_eq!(location(&response), "/");
    let html = body_text(app.get("/").await).await;
    assert!(html.contains("Logged out successfully"));

    let response = app.get("/admin/dashboard").await;
    assert_eq!(location(&response), "/user/login");
}

#[tokio::test]
async fn admin_lists_process_and_delete_reservations() {
    let mut app = TestApp::new();
    let id = app
        .store
        .create_reservation(&booking(1, "2025-06-01", "2025-06-03"))
        .await
        .unwrap();
    app.login().await;

    let html = body_text(app.get("/admin/reservations-new").await).await;
    assert!(html.contains(&format!("/admin/reservations/new/{}", id)));

    let response = app.get(&format!("/admin/reservations/new/{}", id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains(r#"value="Jane""#));

    let response = app
        .post_form(&format!("/admin/reservations/new/{}", id), GUEST_FORM)
        .await;
    assert_eq!(location(&response), "/admin/reservations-new");
    assert_eq!(app.store.reservation_by_id(id).await.unwrap().first_name, "John");

    let response = app
        .get(&format!("/admin/process-reservation/new/{}", id))
        .await;
    assert_eq!(location(&response), "/admin/reservations-new");
    assert!(app.store.reservation_by_id(id).await.unwrap().is_processed());
    let html = body_text(app.get("/admin/reservations-new").await).await;
    assert!(!html.contains(&format!("/admin/reservations/new/{}", id)));

    let response = app
        .get(&format!("/admin/delete-reservation/all/{}", id))
        .await;
    assert_eq!(location(&response), "/admin/reservations-all");
    assert_eq!(app.store.reservation_count().await, 0);
    assert!(app
        .store
        .is_room_available(1, date("2025-06-01"), date("2025-06-03"))
        .await
        .unwrap());
}

#[tokio::test]
async fn admin_edit_rejects_invalid_guest() {
    let mut app = TestApp::new();
    let id = app
        .store
        .create_reservation(&booking(1, "2025-06-01", "2025-06-03"))
        .await
        .unwrap();
    app.login().await;

    let response = app
        .post_form(
            &format!("/admin/reservations/all/{}", id),
            "first_name=Al&last_name=Doe&email=jane%40doe.com",
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response)
        .await
        .contains("This field must be at least 3 characters long"));
    assert_eq!(app.store.reservation_by_id(id).await.unwrap().first_name, "Jane");
}

#[tokio::test]
async fn unknown_list_source_is_a_bad_request() {
    let mut app = TestApp::new();
    let id = app
        .store
        .create_reservation(&booking(1, "2025-06-01", "2025-06-03"))
        .await
        .unwrap();
    app.login().await;

    let response = app.get(&format!("/admin/reservations/archive/{}", id)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .get(&format!("/admin/reservations/cal/{}?y=2025&m=13", id))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.get("/admin/reservations/all/999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn calendar_adds_and_removes_owner_blocks() {
    let mut app = TestApp::new();
    app.store
        .create_reservation(&booking(2, "2025-06-03", "2025-06-05"))
        .await
        .unwrap();
    app.login().await;

    let response = app.get("/admin/reservations-calendar?y=2025&m=06").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("June 2025"));
    assert!(html.contains(r#"name="add_block_1_2025-06-10""#));
    assert!(!html.contains(r#"name="add_block_2_2025-06-3""#));

    let response = app
        .post_form(
            "/admin/reservations-calendar",
            "y=2025&m=06&add_block_1_2025-06-10=1",
        )
        .await;
    assert_eq!(location(&response), "/admin/reservations-calendar?y=2025&m=06");

    let blocks: Vec<_> = app
        .store
        .restrictions_for_room(1, date("2025-06-01"), date("2025-06-30"))
        .await
        .unwrap();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].start_date, date("2025-06-10"));
    assert_eq!(blocks[0].end_date, date("2025-06-11"));

    let html = body_text(app.get("/admin/reservations-calendar?y=2025&m=06").await).await;
    assert!(html.contains("Changes saved"));
    assert!(html.contains(&format!(
        r#"name="remove_block_1_2025-06-10" value="{}" checked"#,
        blocks[0].id
    )));

    // unchecking the block removes it
    let response = app
        .post_form("/admin/reservations-calendar", "y=2025&m=06")
        .await;
    assert_eq!(location(&response), "/admin/reservations-calendar?y=2025&m=06");
    assert!(app
        .store
        .restrictions_for_room(1, date("2025-06-01"), date("2025-06-30"))
        .await
        .unwrap()
        .is_empty());

    // the guest reservation is never touched by block edits
    assert_eq!(app.store.reservation_count().await, 1);

    // a block on a reserved night is skipped
    app.get("/admin/reservations-calendar?y=2025&m=06").await;
    let response = app
        .post_form(
            "/admin/reservations-calendar",
            "y=2025&m=06&add_block_2_2025-06-3=1",
        )
        .await;
    assert_eq!(location(&response), "/admin/reservations-calendar?y=2025&m=06");
    let restrictions = app
        .store
        .restrictions_for_room(2, date("2025-06-01"), date("2025-06-30"))
        .await
        .unwrap();
    assert_eq!(restrictions.len(), 1);
    assert!(restrictions[0].reservation().is_some());
}

#[tokio::test]
async fn calendar_reservation_pages_return_to_the_month() {
    let mut app = TestApp::new();
    let id = app
        .store
        .create_reservation(&booking(1, "2025-06-03", "2025-06-05"))
        .await
        .unwrap();
    app.login().await;

    let html = body_text(app.get("/admin/reservations-calendar?y=2025&m=06").await).await;
    let link = format!("/admin/reservations/cal/{}?y=2025&m=06", id);
    assert!(html.contains(&link));

    let response = app.get(&link).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains(r#"href="/admin/reservations-calendar?y=2025&m=06">Cancel"#));

    let response = app.post_form(&link, GUEST_FORM).await;
    assert_eq!(location(&response), "/admin/reservations-calendar?y=2025&m=06");
    assert_eq!(app.store.reservation_by_id(id).await.unwrap().first_name, "John");

    let response = app
        .get(&format!("/admin/process-reservation/cal/{}?y=2025&m=06", id))
        .await;
    assert_eq!(location(&response), "/admin/reservations-calendar?y=2025&m=06");
    assert!(app.store.reservation_by_id(id).await.unwrap().is_processed());
}

#[tokio::test]
async fn calendar_rejects_invalid_month() {
    let mut app = TestApp::new();
    app.login().await;
    let response = app.get("/admin/reservations-calendar?y=2025&m=13").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.get("/admin/reservations-calendar?y=262142&m=12").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_endpoints_answer() {
    let mut app = TestApp::new();
    let response = app.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json["status"], "healthy");

    let response = app.get("/ready").await;
    assert_eq!(response.status(), StatusCode::OK);
}

//! Live server tests
//!
//! Start the server with `RUN_MODE=development` (memory store, seeded admin)
//! and run with: cargo test -- --ignored

use reqwest::{redirect::Policy, Client, StatusCode};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:8080";

fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .expect("Failed to build client")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let response = client()
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_readiness() {
    let response = client()
        .get(format!("{}/ready", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore]
async fn test_availability_json() {
    let response = client()
        .post(format!("{}/search-availability-json", BASE_URL))
        .form(&[("start", "2040-01-01"), ("end", "2040-01-03"), ("room_id", "1")])
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["ok"].is_boolean());
    assert_eq!(body["room_id"], "1");
}

#[tokio::test]
#[ignore]
async fn test_search_then_choose_room() {
    let client = client();

    let response = client
        .post(format!("{}/search-availability", BASE_URL))
        .form(&[("start", "2041-03-01"), ("end", "2041-03-02")])
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let response = client
        .get(format!("{}/choose-room/1", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()["location"], "/make-reservation");
}

#[tokio::test]
#[ignore]
async fn test_login() {
    let client = client();

    let response = client
        .post(format!("{}/user/login", BASE_URL))
        .form(&[("email", "admin@admin.com"), ("password", "password")])
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()["location"], "/");

    let response = client
        .get(format!("{}/admin/dashboard", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore]
async fn test_admin_requires_login() {
    let response = client()
        .get(format!("{}/admin/reservations-all", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()["location"], "/user/login");
}

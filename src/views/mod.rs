//! Server-rendered HTML pages

pub mod admin;
pub mod booking;
pub mod pages;

use axum::http::StatusCode;

use crate::{forms::FormErrors, session::Messages};

/// Per-request values every layout needs
#[derive(Debug, Clone, Default)]
pub struct Chrome {
    pub messages: Messages,
    pub authenticated: bool,
}

/// Escape text for HTML content and attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn alerts(messages: &Messages) -> String {
    let mut html = String::new();
    for (class, text) in [
        ("success", &messages.flash),
        ("danger", &messages.error),
        ("warning", &messages.warning),
    ] {
        if let Some(text) = text {
            html.push_str(&format!(
                r#"<div class="alert alert-{}" role="alert">{}</div>"#,
                class,
                escape(text)
            ));
        }
    }
    html
}

fn document(title: &str, nav: &str, chrome: &Chrome, body: &str) -> String {
    format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="stylesheet" href="/static/css/styles.css">
</head>
<body>
<nav class="navbar">{nav}</nav>
<main class="container">
{alerts}
{body}
</main>
<footer class="footer">Lodging Bookings</footer>
<script src="/static/js/app.js"></script>
</body>
</html>
"#,
        title = escape(title),
        nav = nav,
        alerts = alerts(&chrome.messages),
        body = body,
    )
}

/// Public site layout
pub fn layout(title: &str, chrome: &Chrome, body: &str) -> String {
    let account = if chrome.authenticated {
        r#"<a href="/admin/dashboard">Admin</a> <a href="/user/logout">Logout</a>"#
    } else {
        r#"<a href="/user/login">Login</a>"#
    };
    let nav = format!(
        r#"<a href="/">Home</a> <a href="/about">About</a> <a href="/generals-quarters">General's Quarters</a> <a href="/majors-suite">Major's Suite</a> <a href="/search-availability">Book Now</a> <a href="/contact">Contact</a> {}"#,
        account
    );
    document(title, &nav, chrome, body)
}

/// Back-office layout
pub fn admin_layout(title: &str, chrome: &Chrome, body: &str) -> String {
    let nav = r#"<a href="/admin/dashboard">Dashboard</a> <a href="/admin/reservations-new">New Reservations</a> <a href="/admin/reservations-all">All Reservations</a> <a href="/admin/reservations-calendar">Reservation Calendar</a> <a href="/">Public Site</a> <a href="/user/logout">Logout</a>"#;
    document(title, nav, chrome, body)
}

/// Standalone page for failed requests
pub fn error_page(status: StatusCode, message: &str) -> String {
    let title = format!(
        "{} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("Error")
    );
    let body = format!(
        r#"<h1>{}</h1><p>{}</p><p><a href="/">Back to the home page</a></p>"#,
        escape(&title),
        escape(message)
    );
    layout(&title, &Chrome::default(), &body)
}

/// Text input with its first validation error
fn text_input(name: &str, label: &str, input_type: &str, value: &str, errors: Option<&FormErrors>) -> String {
    let error = errors.and_then(|e| e.get(name));
    format!(
        r#"<div class="form-group"><label for="{name}">{label}</label><input type="{input_type}" id="{name}" name="{name}" value="{value}" class="form-control{invalid}" autocomplete="off">{error}</div>"#,
        name = name,
        label = escape(label),
        input_type = input_type,
        value = escape(value),
        invalid = if error.is_some() { " is-invalid" } else { "" },
        error = error
            .map(|e| format!(r#"<div class="text-danger">{}</div>"#, escape(e)))
            .unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escaping_neutralises_markup() {
        assert_eq!(
            escape(r#"<script>alert("x")</script> & 'y'"#),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; &amp; &#39;y&#39;"
        );
    }

    #[test]
    fn layout_shows_messages_once_each() {
        let chrome = Chrome {
            messages: Messages {
                flash: Some("Logged in successfully".into()),
                error: Some("Bad <thing>".into()),
                warning: None,
            },
            authenticated: true,
        };
        let html = layout("Home", &chrome, "<p>body</p>");
        assert!(html.contains(r#"alert-success" role="alert">Logged in successfully"#));
        assert!(html.contains("Bad &lt;thing&gt;"));
        assert!(!html.contains("alert-warning"));
        assert!(html.contains("/user/logout"));
    }

    #[test]
    fn input_marks_invalid_fields() {
        let mut errors = FormErrors::default();
        errors.add("first_name", "This field cannot be blank");
        let html = text_input("first_name", "First name", "text", "", Some(&errors));
        assert!(html.contains("is-invalid"));
        assert!(html.contains("This field cannot be blank"));
        assert!(!text_input("last_name", "Last name", "text", "Smith", Some(&errors)).contains("is-invalid"));
    }

    #[test]
    fn error_page_names_the_status() {
        let html = error_page(StatusCode::NOT_FOUND, "Reservation with id 9 not found");
        assert!(html.contains("404 Not Found"));
        assert!(html.contains("Reservation with id 9 not found"));
    }
}

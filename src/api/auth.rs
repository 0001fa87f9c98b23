//! Back-office login and logout

use std::collections::HashMap;

use axum::{extract::State, response::Response, Form};

use super::{redirect, render};
use crate::{
    error::{AppError, AppResult},
    forms,
    session::Session,
    views::booking,
    AppState,
};

pub async fn show_login(session: Session) -> AppResult<Response> {
    render(session, |chrome| booking::login(chrome, "", None)).await
}

pub async fn post_login(
    State(state): State<AppState>,
    mut session: Session,
    Form(values): Form<HashMap<String, String>>,
) -> AppResult<Response> {
    let mut form = forms::Form::new(values);
    form.required(&["email", "password"]);
    form.is_email("email");
    if !form.valid() {
        let email = form.get("email").to_string();
        return render(session, |chrome| {
            booking::login(chrome, &email, Some(&form.errors))
        })
        .await;
    }

    match state
        .services
        .users
        .authenticate(form.get("email").trim(), form.get("password"))
        .await
    {
        Ok(user_id) => {
            session.login(user_id);
            session.put_flash("Logged in successfully");
            redirect(session, "/").await
        }
        Err(AppError::Authentication(reason)) => {
            tracing::info!(email = form.get("email"), "Login refused: {}", reason);
            session.put_error("Invalid login credentials");
            redirect(session, "/user/login").await
        }
        Err(e) => Err(e),
    }
}

pub async fn logout(mut session: Session) -> AppResult<Response> {
    session.destroy();
    session.put_flash("Logged out successfully");
    redirect(session, "/").await
}

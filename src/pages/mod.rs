//! Server-rendered pages and their form actions.

mod error;
mod login;
mod logout;
mod register;
mod render;
mod todos;

pub use error::PageError;

use axum::{Router, response::Redirect, routing::get};

use crate::upstream::UpstreamClient;

#[derive(Clone)]
pub struct PagesState {
    pub upstream: UpstreamClient,
}

pub fn router(state: PagesState) -> Router {
    Router::new()
        .route("/", get(Redirect::temporary("/todos")))
        .route("/login", get(login::page).post(login::submit))
        .route("/register", get(register::page).post(register::submit))
        .route("/todos", get(todos::page).post(todos::submit))
        .route("/logout", get(logout::page).post(logout::submit))
        .with_state(state)
}

/// Minimum length for both username and password.
const MIN_CREDENTIAL_LENGTH: usize = 5;

pub(crate) fn validate_username(username: &str) -> Option<&'static str> {
    if username.len() < MIN_CREDENTIAL_LENGTH {
        return Some("Username must be at least 5 characters");
    }
    None
}

pub(crate) fn validate_password(password: &str) -> Option<&'static str> {
    if password.len() < MIN_CREDENTIAL_LENGTH {
        return Some("Password must be at least 5 characters");
    }
    None
}

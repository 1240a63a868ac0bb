//! Registration page and form action.

use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use serde::Deserialize;

use super::render::{self, CredentialFormView};
use super::{PageError, PagesState, validate_password, validate_username};
use crate::upstream::{AuthReply, Credentials, UpstreamError};

#[derive(Deserialize)]
pub struct RegisterForm {
    username: Option<String>,
    password: Option<String>,
}

pub async fn page() -> Response {
    render::html_response(
        StatusCode::OK,
        render::register_page(&CredentialFormView::default()),
    )
}

pub async fn submit(
    State(state): State<PagesState>,
    Form(form): Form<RegisterForm>,
) -> Result<Response, PageError> {
    let (Some(username), Some(password)) = (form.username.as_deref(), form.password.as_deref())
    else {
        return Ok(render::html_response(
            StatusCode::BAD_REQUEST,
            render::register_page(&CredentialFormView {
                form_error: Some("Form not submitted correctly"),
                ..Default::default()
            }),
        ));
    };

    let username_error = validate_username(username);
    let password_error = validate_password(password);
    if username_error.is_some() || password_error.is_some() {
        return Ok(render::html_response(
            StatusCode::BAD_REQUEST,
            render::register_page(&CredentialFormView {
                username: Some(username),
                username_error,
                password_error,
                form_error: Some("Some fields are invalid"),
                ..Default::default()
            }),
        ));
    }

    let response = state
        .upstream
        .register(&Credentials { username, password })
        .await?;
    let reply: AuthReply = response.json().await.map_err(UpstreamError::Network)?;

    match reply {
        // A body with statusCode is the upstream telling us why it refused
        AuthReply::Failure(failure) => {
            let status = StatusCode::from_u16(failure.status_code)
                .unwrap_or(StatusCode::BAD_REQUEST);
            Ok(render::html_response(
                status,
                render::register_page(&CredentialFormView {
                    username: Some(username),
                    form_error: Some(failure.message.as_str()),
                    ..Default::default()
                }),
            ))
        }
        AuthReply::Profile(_) => Ok(Redirect::to("/login").into_response()),
    }
}

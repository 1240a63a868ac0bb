//! Login page and form action.

use axum::extract::{Form, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Redirect, Response};
use serde::Deserialize;
use serde_json::json;

use super::render::{self, CredentialFormView};
use super::{PageError, PagesState, validate_password, validate_username};
use crate::session::recreate_set_cookie_headers;
use crate::upstream::{Credentials, GraphQlError, WHOAMI, WhoamiData};

#[derive(Deserialize)]
pub struct LoginQuery {
    redirect_to: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginForm {
    username: Option<String>,
    password: Option<String>,
    redirect_to: Option<String>,
}

/// Render the login form, sending already-authenticated visitors to the app.
pub async fn page(
    State(state): State<PagesState>,
    Query(query): Query<LoginQuery>,
    headers: HeaderMap,
) -> Result<Response, PageError> {
    if let Some(carrier) = headers.get(header::COOKIE).and_then(|v| v.to_str().ok()) {
        let client = state.upstream.graphql(carrier);
        match client.request::<_, WhoamiData>(WHOAMI, json!({})).await {
            Ok(data) if data.who_am_i.is_some() => {
                return Ok(Redirect::to("/todos").into_response());
            }
            // Not being logged in is the expected state on this page
            Ok(_) | Err(GraphQlError::Unauthorized) => {}
            Err(e) => return Err(e.into()),
        }
    }

    Ok(render::html_response(
        StatusCode::OK,
        render::login_page(&CredentialFormView {
            redirect_to: query.redirect_to.as_deref(),
            ..Default::default()
        }),
    ))
}

pub async fn submit(
    State(state): State<PagesState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, PageError> {
    let redirect_to = form.redirect_to.as_deref().filter(|t| !t.is_empty());

    let (Some(username), Some(password)) = (form.username.as_deref(), form.password.as_deref())
    else {
        return Ok(render::html_response(
            StatusCode::BAD_REQUEST,
            render::login_page(&CredentialFormView {
                form_error: Some("Form not submitted correctly"),
                redirect_to,
                ..Default::default()
            }),
        ));
    };

    let username_error = validate_username(username);
    let password_error = validate_password(password);
    if username_error.is_some() || password_error.is_some() {
        return Ok(render::html_response(
            StatusCode::BAD_REQUEST,
            render::login_page(&CredentialFormView {
                username: Some(username),
                username_error,
                password_error,
                form_error: Some("Some fields are invalid"),
                redirect_to,
            }),
        ));
    }

    let response = state
        .upstream
        .login(&Credentials { username, password })
        .await?;

    if !response.status().is_success() {
        return Ok(render::html_response(
            StatusCode::BAD_REQUEST,
            render::login_page(&CredentialFormView {
                username: Some(username),
                form_error: Some("Username or password did not match"),
                redirect_to,
                ..Default::default()
            }),
        ));
    }

    let cookies = recreate_set_cookie_headers(response.headers());
    Ok((cookies, Redirect::to(redirect_to.unwrap_or("/todos"))).into_response())
}

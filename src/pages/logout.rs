//! Logout action. A plain GET has nothing to do here and goes to the login
//! page.

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Redirect, Response};

use super::render;
use super::{PageError, PagesState};
use crate::session::recreate_set_cookie_headers;
use crate::upstream::{ApiFailure, UpstreamError};

pub async fn page() -> Redirect {
    Redirect::to("/login")
}

pub async fn submit(
    State(state): State<PagesState>,
    headers: HeaderMap,
) -> Result<Response, PageError> {
    let carrier = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let response = state.upstream.logout(carrier).await?;

    if !response.status().is_success() {
        let failure: ApiFailure = response.json().await.map_err(UpstreamError::Network)?;
        let status =
            StatusCode::from_u16(failure.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return Ok(render::error_page(status, &failure.message));
    }

    // The upstream answers with the cleared cookie pair; forward it so the
    // browser drops the session too.
    let cookies = recreate_set_cookie_headers(response.headers());
    Ok((cookies, Redirect::to("/login")).into_response())
}

//! Shared error handling for page handlers.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use tracing::error;

use super::render;
use crate::upstream::{GraphQlError, UpstreamError};

/// Errors a page handler can bubble with `?`.
///
/// Unauthorized callers and dead sessions are redirected to the login page
/// rather than shown an error; everything else renders an error page.
pub enum PageError {
    /// The upstream rejected the caller's credentials
    Unauthorized,
    /// The session could not be refreshed; logging in again is required
    SessionExpired,
    /// An outbound call failed for any other reason
    Upstream(String),
}

impl From<UpstreamError> for PageError {
    fn from(e: UpstreamError) -> Self {
        error!(error = %e, "Upstream call failed");
        PageError::Upstream(e.to_string())
    }
}

impl From<GraphQlError> for PageError {
    fn from(e: GraphQlError) -> Self {
        match e {
            GraphQlError::Unauthorized => PageError::Unauthorized,
            other => {
                error!(error = %other, "GraphQL call failed");
                PageError::Upstream(other.to_string())
            }
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match self {
            PageError::Unauthorized | PageError::SessionExpired => {
                Redirect::to("/login").into_response()
            }
            PageError::Upstream(message) => {
                render::error_page(StatusCode::INTERNAL_SERVER_ERROR, &message)
            }
        }
    }
}

//! The session gate: decides whether a request's credentials need refreshing
//! before the request proceeds to GraphQL.

use axum::http::HeaderMap;
use tracing::debug;

use super::cookie::carrier_from_set_cookies;
use super::expiry::is_live;
use super::headers::recreate_set_cookie_headers;
use crate::upstream::{AuthReply, UpstreamClient, UpstreamError};

/// Per-request refresh decision. Created fresh for each inbound request and
/// consumed immediately by the handler that asked; never persisted.
#[derive(Debug)]
pub enum SessionOutcome {
    /// Existing credentials are still valid; use them unmodified and add
    /// nothing to the response.
    Unchanged,
    /// New cookies were issued. `carrier` replaces the inbound credentials
    /// for the rest of this request; `headers` must ride on the eventual
    /// response so the browser picks up the new pair.
    Refreshed { carrier: String, headers: HeaderMap },
    /// The refresh attempt itself was rejected. The session cannot be
    /// recovered; the caller must redirect to the login page and discard
    /// any partially-built response.
    Unrecoverable,
}

/// Run the expiration check and, when needed, a single refresh attempt
/// against the upstream auth server.
///
/// Transport failures and non-401 refresh rejections surface as
/// `UpstreamError` (fatal to the request), never as a silent fall-back to
/// an unauthenticated state.
pub async fn check_session(
    upstream: &UpstreamClient,
    carrier: &str,
) -> Result<SessionOutcome, UpstreamError> {
    if is_live(carrier) {
        return Ok(SessionOutcome::Unchanged);
    }

    debug!("access token expired, refreshing session");
    let response = upstream.refresh(carrier).await?;
    let upstream_headers = response.headers().clone();
    let reply: AuthReply = response.json().await.map_err(UpstreamError::Network)?;

    match reply {
        AuthReply::Failure(failure) if failure.status_code == 401 => {
            debug!("refresh rejected, session is unrecoverable");
            Ok(SessionOutcome::Unrecoverable)
        }
        AuthReply::Failure(failure) => Err(UpstreamError::Rejected {
            status_code: failure.status_code,
            message: failure.message,
        }),
        AuthReply::Profile(profile) => {
            debug!(username = %profile.username, "session refreshed");
            match carrier_from_set_cookies(&upstream_headers) {
                Some(carrier) => Ok(SessionOutcome::Refreshed {
                    carrier,
                    headers: recreate_set_cookie_headers(&upstream_headers),
                }),
                // A success body without cookies leaves nothing to propagate
                None => Ok(SessionOutcome::Unchanged),
            }
        }
    }
}

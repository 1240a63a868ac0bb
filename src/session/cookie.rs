//! Credential carrier parsing.
//!
//! The carrier is the raw `Cookie` header of an inbound request: a
//! semicolon-delimited list of cookies whose first entry is the access
//! token, issued by the upstream auth server and opaque to this service.

use axum::http::{HeaderMap, header};

use super::headers::split_folded;

/// Extract the access token JWT from a credential carrier.
///
/// The first `;`-segment is the access-token cookie; the upstream names it,
/// so the token sits after the first `=`.
pub fn access_token(carrier: &str) -> &str {
    let first = carrier.split(';').next().unwrap_or("").trim();
    match first.split_once('=') {
        Some((_, value)) => value.trim(),
        None => first,
    }
}

/// Rebuild a credential carrier from `Set-Cookie` response headers.
///
/// Takes each cookie's `name=value` pair with attributes stripped, in
/// upstream order, so the access token stays the first entry. Returns
/// `None` when the response carried no cookies.
pub fn carrier_from_set_cookies(headers: &HeaderMap) -> Option<String> {
    let mut pairs = Vec::new();
    for value in headers.get_all(header::SET_COOKIE) {
        let Ok(raw) = value.to_str() else { continue };
        for cookie in split_folded(raw) {
            if let Some(pair) = cookie.split(';').next() {
                let pair = pair.trim();
                if !pair.is_empty() {
                    pairs.push(pair.to_string());
                }
            }
        }
    }

    if pairs.is_empty() {
        None
    } else {
        Some(pairs.join("; "))
    }
}

//! Outbound `Set-Cookie` header recomposition.

use axum::http::{HeaderMap, HeaderValue, header};

/// Split a raw `Set-Cookie` header value into individual cookies.
///
/// Some HTTP layers fold repeated headers into one comma-joined value. The
/// upstream's auth cookies carry no comma-bearing attributes (no `Expires`
/// date), so a plain comma split recovers the original values.
pub(super) fn split_folded(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|part| !part.is_empty())
}

/// Rebuild outbound `Set-Cookie` headers from an upstream response's headers.
///
/// Repeated `Set-Cookie` values must be forwarded as separate header entries;
/// folding them into one comma-joined line is not valid HTTP for this header.
/// The upstream sends the access-token cookie first and the refresh-token
/// cookie second, and that order is preserved. An upstream response without
/// cookies produces an empty map.
pub fn recreate_set_cookie_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for value in upstream.get_all(header::SET_COOKIE) {
        let Ok(raw) = value.to_str() else { continue };
        for cookie in split_folded(raw) {
            if let Ok(value) = HeaderValue::from_str(cookie) {
                headers.append(header::SET_COOKIE, value);
            }
        }
    }
    headers
}

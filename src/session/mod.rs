//! Cookie-based session management.
//!
//! The upstream auth server issues a short-lived access token and a
//! long-lived refresh token as cookies. Before a request talks GraphQL,
//! the session gate checks the access token's expiration and refreshes
//! the cookie pair against the upstream when it has lapsed.

mod cookie;
mod expiry;
mod gate;
mod headers;

pub use cookie::{access_token, carrier_from_set_cookies};
pub use expiry::{is_live, is_live_at};
pub use gate::{SessionOutcome, check_session};
pub use headers::recreate_set_cookie_headers;

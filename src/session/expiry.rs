//! Access token expiration checking.

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::time::{SystemTime, UNIX_EPOCH};

use super::cookie::access_token;

/// The only claim this service reads. Tokens are minted and verified by the
/// upstream auth server; this process never holds the signing secret.
#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    exp: Option<u64>,
}

/// Report whether the carrier's access token is still live at `now_ms`
/// (milliseconds since the Unix epoch).
///
/// A token with no `exp` claim counts as expired, and so does a token that
/// cannot be decoded at all. Expiration is the only thing checked here;
/// whether the token is otherwise acceptable is the upstream's call.
pub fn is_live_at(carrier: &str, now_ms: u64) -> bool {
    let token = access_token(carrier);

    // Decoded without signature verification: the expiration check is an
    // optimization to skip a doomed GraphQL round trip, not a trust decision.
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    match jsonwebtoken::decode::<ExpiryClaims>(token, &DecodingKey::from_secret(&[]), &validation) {
        Ok(data) => match data.claims.exp {
            Some(exp) => exp * 1000 > now_ms,
            None => false,
        },
        Err(_) => false,
    }
}

/// `is_live_at` against the current wall clock.
pub fn is_live(carrier: &str) -> bool {
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        // A clock before the epoch treats every token as expired
        .unwrap_or(u64::MAX);
    is_live_at(carrier, now_ms)
}

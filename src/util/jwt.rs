//! Access-token expiry inspection.
//!
//! Only the `exp` claim is read; signatures are the backend's concern. Tokens
//! that are not JWTs (or carry no `exp`) report no expiry and are never
//! refreshed proactively; they still refresh on a 401.

#[cfg(test)]
#[path = "jwt_test.rs"]
mod jwt_test;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// `exp` claim (seconds since the Unix epoch), if the token is a readable JWT.
#[must_use]
pub fn expiry(token: &str) -> Option<u64> {
    let mut parts = token.split('.');
    let (_header, payload, _signature) = (parts.next()?, parts.next()?, parts.next()?);
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claims: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    claims.get("exp")?.as_u64()
}

/// True when `token` expires within `skew_secs` of `now_secs` (or already has).
#[must_use]
pub fn expires_within(token: &str, now_secs: u64, skew_secs: u64) -> bool {
    expiry(token).is_some_and(|exp| exp <= now_secs.saturating_add(skew_secs))
}

//! Shared-secret authentication middleware.
//!
//! Validates the `api_key` header against the configured secret before the
//! request reaches any handler, so method and body checks never run for
//! unauthenticated callers.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::{error::RelayError, AppState};

/// Header carrying the shared secret.
pub const API_KEY_HEADER: &str = "api_key";

/// Extracts the credential from the `api_key` header.
fn extract_api_key(headers: &HeaderMap) -> Option<&str> {
    headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok())
}

/// Compares a presented key to the expected one in constant time.
///
/// Both sides are hashed first so the comparison length never depends on
/// the presented value.
pub fn api_key_matches(presented: &str, expected: &str) -> bool {
    let presented = Sha256::digest(presented.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());

    let mut result = 0u8;
    for (a, b) in presented.iter().zip(expected.iter()) {
        result |= a ^ b;
    }

    result == 0
}

/// Axum middleware rejecting requests without the configured `api_key`.
pub async fn auth_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, RelayError> {
    let authorized = extract_api_key(req.headers())
        .is_some_and(|key| api_key_matches(key, &state.config.api_key));

    if !authorized {
        warn!(
            method = %req.method(),
            uri = %req.uri(),
            header_present = req.headers().contains_key(API_KEY_HEADER),
            "invalid api key"
        );
        return Err(RelayError::InvalidApiKey);
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn extract_api_key_from_header() {
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_static("test-api-key-12345"));

        assert_eq!(extract_api_key(&headers), Some("test-api-key-12345"));
    }

    #[test]
    fn extract_api_key_returns_none_without_header() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer test-api-key-12345"));

        assert_eq!(extract_api_key(&headers), None);
    }

    #[test]
    fn extract_api_key_ignores_non_text_values() {
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_bytes(b"\xffkey").unwrap());

        assert_eq!(extract_api_key(&headers), None);
    }

    #[test]
    fn matching_requires_exact_equality() {
        let key = "abcdefghijklmnopqrstuvwxyz012345";

        assert!(api_key_matches(key, key));
        assert!(!api_key_matches("ABCDEFGHIJKLMNOPQRSTUVWXYZ012345", key));
        assert!(!api_key_matches(" abcdefghijklmnopqrstuvwxyz012345", key));
        assert!(!api_key_matches("abcdefghijklmnopqrstuvwxyz01234", key));
        assert!(!api_key_matches("", key));
    }
}

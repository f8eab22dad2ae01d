//! Bearer-token authentication
//!
//! The admin write path and the keep-alive endpoint each accept one
//! configured secret in `Authorization: Bearer <secret>`. Establishing the
//! admin's identity (the OAuth sign-in) happens upstream; this layer only
//! checks that the caller presents the token issued for that identity.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::warn;

use crate::AppState;

/// Admin authentication middleware
///
/// Returns 401 Unauthorized unless the request carries the admin token.
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    check_bearer(request.headers(), &state.tokens.admin_token)?;
    Ok(next.run(request).await)
}

/// Verify `Authorization: Bearer <expected>`
///
/// An empty `expected` secret rejects every request.
pub fn check_bearer(headers: &HeaderMap, expected: &str) -> Result<(), AuthError> {
    if expected.is_empty() {
        warn!("Rejected request: endpoint secret is not configured");
        return Err(AuthError::NotConfigured);
    }

    let provided = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(AuthError::MissingToken)?;

    if !secrets_match(provided.trim(), expected) {
        warn!("Rejected request: bearer token mismatch");
        return Err(AuthError::InvalidToken);
    }

    Ok(())
}

/// Compare without short-circuiting on the first differing byte
fn secrets_match(provided: &str, expected: &str) -> bool {
    let (a, b) = (provided.as_bytes(), expected.as_bytes());
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Authentication error types for HTTP responses
#[derive(Debug)]
pub enum AuthError {
    MissingToken,
    InvalidToken,
    NotConfigured,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match self {
            AuthError::MissingToken => "Missing bearer token",
            AuthError::InvalidToken => "Invalid bearer token",
            AuthError::NotConfigured => "Unauthorized",
        };

        (StatusCode::UNAUTHORIZED, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(auth: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(auth).unwrap());
        headers
    }

    #[test]
    fn test_matching_token_passes() {
        assert!(check_bearer(&headers("Bearer s3cret"), "s3cret").is_ok());
    }

    #[test]
    fn test_wrong_token_rejected() {
        assert!(matches!(
            check_bearer(&headers("Bearer s3cre"), "s3cret"),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_missing_or_malformed_header_rejected() {
        assert!(matches!(
            check_bearer(&HeaderMap::new(), "s3cret"),
            Err(AuthError::MissingToken)
        ));
        assert!(matches!(
            check_bearer(&headers("Basic s3cret"), "s3cret"),
            Err(AuthError::MissingToken)
        ));
    }

    #[test]
    fn test_unconfigured_secret_rejects_everything() {
        assert!(matches!(
            check_bearer(&headers("Bearer "), ""),
            Err(AuthError::NotConfigured)
        ));
    }
}

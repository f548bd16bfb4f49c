//! Authentication middleware for vigie-admin
//!
//! Protected requests are signed with a timestamp and SHA-256 hash. POST bodies
//! carry both fields in the JSON payload; GET and DELETE carry them in the query
//! string and sign the query parameters together with the request path.

use axum::{
    body::Body,
    extract::{Query, Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use tracing::warn;
use vigie_common::api::auth::{query_signing_value, validate_hash, validate_timestamp, ApiAuthError};
use vigie_common::api::{AuthErrorResponse, AuthFields};

use crate::AppState;

/// Largest request body read for hash validation
pub const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Authentication middleware
///
/// Applied to protected routes only. A shared secret of 0 disables every check.
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    if state.shared_secret == 0 {
        return Ok(next.run(request).await);
    }

    if request.method() == Method::GET || request.method() == Method::DELETE {
        let Query(params) = Query::<Vec<(String, String)>>::try_from_uri(request.uri())
            .map_err(|e| AuthError::ParseError(format!("Invalid query string: {}", e)))?;

        let signed = query_signing_value(request.uri().path(), &params);
        verify(&signed, state.shared_secret)?;

        return Ok(next.run(request).await);
    }

    let (parts, body) = request.into_parts();
    let body_bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| AuthError::ParseError(format!("Failed to read body: {}", e)))?;

    let json_value: Value = serde_json::from_slice(&body_bytes)
        .map_err(|e| AuthError::ParseError(format!("Invalid JSON: {}", e)))?;

    verify(&json_value, state.shared_secret)?;

    // Downstream extractors read the body again
    let request = Request::from_parts(parts, Body::from(body_bytes));
    Ok(next.run(request).await)
}

/// Check timestamp window, then hash, of a signed object
fn verify(signed: &Value, shared_secret: i64) -> Result<(), AuthError> {
    let fields: AuthFields = serde_json::from_value(signed.clone())
        .map_err(|e| AuthError::MissingFields(e.to_string()))?;

    validate_timestamp(fields.timestamp).map_err(|e| match e {
        ApiAuthError::InvalidTimestamp { reason, .. } => AuthError::InvalidTimestamp(reason),
        other => AuthError::Other(other.to_string()),
    })?;

    validate_hash(&fields.hash, signed, shared_secret).map_err(|e| match e {
        ApiAuthError::InvalidHash {
            provided,
            calculated,
        } => {
            warn!(
                "Hash validation failed: provided={}, calculated={}",
                provided, calculated
            );
            AuthError::InvalidHash
        }
        other => AuthError::Other(other.to_string()),
    })
}

/// Authentication failures
#[derive(Debug)]
pub enum AuthError {
    InvalidTimestamp(String),
    InvalidHash,
    MissingFields(String),
    ParseError(String),
    Other(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self {
            AuthError::InvalidTimestamp(reason) => (
                StatusCode::UNAUTHORIZED,
                "invalid_timestamp",
                format!("Invalid timestamp: {}", reason),
            ),
            AuthError::InvalidHash => (
                StatusCode::UNAUTHORIZED,
                "invalid_hash",
                "Invalid hash".to_string(),
            ),
            AuthError::MissingFields(msg) => (
                StatusCode::BAD_REQUEST,
                "missing_fields",
                format!("Missing required fields: {}", msg),
            ),
            AuthError::ParseError(msg) => (
                StatusCode::BAD_REQUEST,
                "parse_error",
                format!("Parse error: {}", msg),
            ),
            AuthError::Other(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "auth_error",
                format!("Authentication error: {}", msg),
            ),
        };

        (status, Json(AuthErrorResponse::new(kind, message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use vigie_common::api::auth::{calculate_hash, now_millis};

    #[test]
    fn test_verify_accepts_signed_body() {
        let mut body = json!({"title": "Procès en appel", "timestamp": now_millis(), "hash": ""});
        let hash = calculate_hash(&body, 99);
        body["hash"] = json!(hash);

        assert!(verify(&body, 99).is_ok());
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let mut body = json!({"timestamp": now_millis(), "hash": ""});
        let hash = calculate_hash(&body, 99);
        body["hash"] = json!(hash);

        assert!(matches!(verify(&body, 100), Err(AuthError::InvalidHash)));
    }

    #[test]
    fn test_verify_missing_hash_field() {
        let body = json!({"timestamp": now_millis()});
        assert!(matches!(verify(&body, 99), Err(AuthError::MissingFields(_))));
    }

    #[test]
    fn test_verify_stale_timestamp_checked_before_hash() {
        let body = json!({"timestamp": 1, "hash": "bogus"});
        assert!(matches!(verify(&body, 99), Err(AuthError::InvalidTimestamp(_))));
    }

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            AuthError::InvalidHash.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::ParseError("x".into()).into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }
}

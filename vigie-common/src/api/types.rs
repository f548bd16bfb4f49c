//! Shared API request/response types

use serde::{Deserialize, Serialize};

// ========================================
// Authentication Types
// ========================================

/// Authentication fields carried by every protected request
///
/// Found in the query string for GET/DELETE and in the JSON body for POST.
///
/// # Examples
///
/// ```
/// use vigie_common::api::types::AuthFields;
///
/// let fields: AuthFields =
///     serde_json::from_str(r#"{"timestamp": 1730000000000, "hash": "abc", "title": "x"}"#).unwrap();
/// assert_eq!(fields.timestamp, 1730000000000);
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthFields {
    /// Unix epoch time in milliseconds
    pub timestamp: i64,

    /// SHA-256 hash (64 hex chars)
    pub hash: String,
}

// ========================================
// Error Response Types
// ========================================

/// Body of a 401/400 authentication failure
#[derive(Debug, Clone, Serialize)]
pub struct AuthErrorResponse {
    /// Error type identifier
    pub error: String,
    /// Human-readable error message
    pub message: String,
}

impl AuthErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_fields_ignore_other_body_fields() {
        let json = r#"{"keep_id": "a", "remove_id": "b", "timestamp": 1730000000000, "hash": "abc123"}"#;
        let fields: AuthFields = serde_json::from_str(json).unwrap();

        assert_eq!(fields.timestamp, 1730000000000);
        assert_eq!(fields.hash, "abc123");
    }

    #[test]
    fn test_auth_error_response_serializes_error_and_message() {
        let error = AuthErrorResponse::new("timestamp_invalid", "Timestamp too old");
        let value = serde_json::to_value(&error).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"error": "timestamp_invalid", "message": "Timestamp too old"})
        );
    }
}

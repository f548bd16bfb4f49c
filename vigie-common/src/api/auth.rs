//! API authentication via timestamp and hash validation
//!
//! Every protected admin request carries:
//! - `timestamp`: Unix epoch milliseconds
//! - `hash`: SHA-256 (64 hex chars) of the canonical signed object plus the shared secret
//!
//! The signed object is the JSON body for POST requests. GET and DELETE requests
//! have no body, so their query parameters are signed instead, together with the
//! request path (see [`query_signing_value`]).
//!
//! The shared secret lives in the `settings` table; the value 0 disables checks.
//!
//! This module holds only pure functions and database operations. The axum
//! middleware lives in the admin crate.

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::time::{SystemTime, UNIX_EPOCH};

#[cfg(feature = "sqlx")]
use sqlx::SqlitePool;

/// Maximum age of a request timestamp
pub const MAX_PAST_MS: i64 = 5000;

/// Maximum clock skew for timestamps ahead of the server
pub const MAX_FUTURE_MS: i64 = 1000;

const DUMMY_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

// ========================================
// Error Types
// ========================================

/// Authentication error types
#[derive(Debug, Clone)]
pub enum ApiAuthError {
    /// Timestamp outside acceptable window
    InvalidTimestamp {
        timestamp: i64,
        now: i64,
        reason: String,
    },

    /// Hash does not match calculated value
    InvalidHash { provided: String, calculated: String },

    /// Database error loading shared secret
    DatabaseError(String),
}

impl std::fmt::Display for ApiAuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiAuthError::InvalidTimestamp { reason, .. } => {
                write!(f, "Invalid timestamp: {}", reason)
            }
            ApiAuthError::InvalidHash { .. } => write!(f, "Invalid hash"),
            ApiAuthError::DatabaseError(err) => write!(f, "Database error: {}", err),
        }
    }
}

impl std::error::Error for ApiAuthError {}

// ========================================
// Shared Secret Management
// ========================================

/// Load shared secret from database settings
///
/// - Key: `api_shared_secret`
/// - Value: i64 as decimal text
/// - Special value 0: disables auth checking
///
/// A missing secret is generated and stored.
#[cfg(feature = "sqlx")]
pub async fn load_shared_secret(db: &SqlitePool) -> Result<i64, ApiAuthError> {
    let result: Option<(String,)> =
        sqlx::query_as("SELECT value FROM settings WHERE key = 'api_shared_secret'")
            .fetch_optional(db)
            .await
            .map_err(|e| ApiAuthError::DatabaseError(e.to_string()))?;

    match result {
        Some((value,)) => value
            .trim()
            .parse::<i64>()
            .map_err(|e| ApiAuthError::DatabaseError(format!("Invalid i64: {}", e))),
        None => initialize_shared_secret(db).await,
    }
}

/// Generate and store a random non-zero shared secret
#[cfg(feature = "sqlx")]
pub async fn initialize_shared_secret(db: &SqlitePool) -> Result<i64, ApiAuthError> {
    use rand::Rng;

    let secret: i64 = {
        let mut rng = rand::thread_rng();
        loop {
            let val = rng.gen::<i64>();
            if val != 0 {
                break val;
            }
        }
    };

    sqlx::query("INSERT OR REPLACE INTO settings (key, value) VALUES ('api_shared_secret', ?)")
        .bind(secret.to_string())
        .execute(db)
        .await
        .map_err(|e| ApiAuthError::DatabaseError(e.to_string()))?;

    Ok(secret)
}

// ========================================
// Timestamp Validation
// ========================================

/// Current Unix time in milliseconds
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Validate a request timestamp
///
/// Accepted window: at most [`MAX_PAST_MS`] old and at most [`MAX_FUTURE_MS`]
/// ahead of the server clock.
///
/// # Examples
///
/// ```
/// use vigie_common::api::auth::{now_millis, validate_timestamp};
///
/// let now = now_millis();
/// assert!(validate_timestamp(now).is_ok());
/// assert!(validate_timestamp(now - 60_000).is_err());
/// ```
pub fn validate_timestamp(timestamp: i64) -> Result<(), ApiAuthError> {
    let now = now_millis();
    let diff = now - timestamp;

    if diff > MAX_PAST_MS {
        return Err(ApiAuthError::InvalidTimestamp {
            timestamp,
            now,
            reason: format!("Timestamp {}ms too old (max {}ms past)", diff, MAX_PAST_MS),
        });
    }

    if diff < -MAX_FUTURE_MS {
        return Err(ApiAuthError::InvalidTimestamp {
            timestamp,
            now,
            reason: format!(
                "Timestamp {}ms in future (max {}ms future)",
                diff.abs(),
                MAX_FUTURE_MS
            ),
        });
    }

    Ok(())
}

// ========================================
// Hash Calculation and Validation
// ========================================

/// Calculate the request hash
///
/// 1. Replace the `hash` field with 64 zeros
/// 2. Serialize as canonical JSON (sorted keys, no whitespace)
/// 3. Append the shared secret as a decimal string
/// 4. SHA-256, hex encoded
///
/// # Examples
///
/// ```
/// use vigie_common::api::auth::calculate_hash;
/// use serde_json::json;
///
/// let body = json!({"keep_id": "a", "remove_id": "b", "timestamp": 1730000000000i64, "hash": ""});
/// assert_eq!(calculate_hash(&body, 42).len(), 64);
/// ```
pub fn calculate_hash(json_value: &Value, shared_secret: i64) -> String {
    let mut value = json_value.clone();
    if let Some(obj) = value.as_object_mut() {
        obj.insert("hash".to_string(), Value::String(DUMMY_HASH.to_string()));
    }

    let canonical = to_canonical_json(&value);
    let to_hash = format!("{}{}", canonical, shared_secret);

    let mut hasher = Sha256::new();
    hasher.update(to_hash.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Convert JSON to canonical form (sorted keys, no whitespace)
pub fn to_canonical_json(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut pairs: Vec<_> = map.iter().collect();
            pairs.sort_by_key(|(k, _)| *k);
            let items: Vec<String> = pairs
                .into_iter()
                .map(|(k, v)| format!("{}:{}", Value::String(k.clone()), to_canonical_json(v)))
                .collect();
            format!("{{{}}}", items.join(","))
        }
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(to_canonical_json).collect();
            format!("[{}]", items.join(","))
        }
        // serde_json escapes strings the same way on every platform
        Value::String(_) => value.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
    }
}

/// Validate hash matches calculated value
pub fn validate_hash(
    provided_hash: &str,
    json_value: &Value,
    shared_secret: i64,
) -> Result<(), ApiAuthError> {
    let calculated = calculate_hash(json_value, shared_secret);

    if !provided_hash.eq_ignore_ascii_case(&calculated) {
        return Err(ApiAuthError::InvalidHash {
            provided: provided_hash.to_string(),
            calculated,
        });
    }

    Ok(())
}

/// Build the signed object for a body-less request
///
/// Query parameters become string fields, except `timestamp` which is kept as a
/// number when it parses. The request path is added as `"path"` so a signature
/// cannot be replayed against another endpoint.
///
/// # Examples
///
/// ```
/// use vigie_common::api::auth::query_signing_value;
///
/// let value = query_signing_value(
///     "/api/politicians/p1/affairs/duplicates",
///     &[("timestamp".into(), "1730000000000".into()), ("hash".into(), "x".into())],
/// );
/// assert_eq!(value["path"], "/api/politicians/p1/affairs/duplicates");
/// assert_eq!(value["timestamp"], 1730000000000i64);
/// ```
pub fn query_signing_value(path: &str, params: &[(String, String)]) -> Value {
    let mut map = Map::new();
    for (key, raw) in params {
        let value = if key == "timestamp" {
            raw.parse::<i64>()
                .map(Value::from)
                .unwrap_or_else(|_| Value::String(raw.clone()))
        } else {
            Value::String(raw.clone())
        };
        map.insert(key.clone(), value);
    }
    map.insert("path".to_string(), Value::String(path.to_string()));
    Value::Object(map)
}

// ========================================
// Tests
// ========================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_timestamp_accepted() {
        let now = now_millis();
        assert!(validate_timestamp(now).is_ok());
        assert!(validate_timestamp(now - 1000).is_ok());
        assert!(validate_timestamp(now + 500).is_ok());
    }

    #[test]
    fn test_timestamp_too_old_rejected() {
        let now = now_millis();
        assert!(validate_timestamp(now - MAX_PAST_MS - 1000).is_err());
        assert!(validate_timestamp(0).is_err());
    }

    #[test]
    fn test_timestamp_future_rejected() {
        let now = now_millis();
        let err = validate_timestamp(now + MAX_FUTURE_MS + 1000).unwrap_err();
        assert!(matches!(err, ApiAuthError::InvalidTimestamp { .. }));
    }

    #[test]
    fn test_hash_calculation_algorithm() {
        let body = json!({
            "keep_id": "a",
            "remove_id": "b",
            "timestamp": 1730000000000i64,
            "hash": DUMMY_HASH
        });

        let hash = calculate_hash(&body, 123456789);
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));

        // Deterministic, secret-dependent
        assert_eq!(hash, calculate_hash(&body, 123456789));
        assert_ne!(hash, calculate_hash(&body, 987654321));
    }

    #[test]
    fn test_hash_ignores_provided_hash_field() {
        let a = json!({"timestamp": 1, "hash": "anything"});
        let b = json!({"timestamp": 1, "hash": "something else"});
        assert_eq!(calculate_hash(&a, 7), calculate_hash(&b, 7));
    }

    #[test]
    fn test_canonical_json_sorting() {
        let value = json!({"z_field": "last", "a_field": "first", "m_field": "middle"});
        let canonical = to_canonical_json(&value);

        let a_pos = canonical.find("\"a_field\"").unwrap();
        let m_pos = canonical.find("\"m_field\"").unwrap();
        let z_pos = canonical.find("\"z_field\"").unwrap();
        assert!(a_pos < m_pos);
        assert!(m_pos < z_pos);
    }

    #[test]
    fn test_canonical_json_no_whitespace_and_escaping() {
        let value = json!({"title": "Procès \"Bygmalion\"", "n": 42, "ok": true, "x": null});
        let canonical = to_canonical_json(&value);
        assert_eq!(
            canonical,
            r#"{"n":42,"ok":true,"title":"Procès \"Bygmalion\"","x":null}"#
        );
    }

    #[test]
    fn test_valid_hash_accepted_invalid_rejected() {
        let body = json!({"title": "x", "timestamp": 1730000000000i64, "hash": "dummy"});
        let secret = 123456789i64;
        let calculated = calculate_hash(&body, secret);

        assert!(validate_hash(&calculated, &body, secret).is_ok());
        assert!(validate_hash(&calculated.to_uppercase(), &body, secret).is_ok());
        assert!(validate_hash(DUMMY_HASH, &body, secret).is_err());
    }

    #[test]
    fn test_query_signing_value_binds_path() {
        let params = vec![
            ("timestamp".to_string(), "1730000000000".to_string()),
            ("hash".to_string(), "abc".to_string()),
        ];
        let a = query_signing_value("/api/affairs/a", &params);
        let b = query_signing_value("/api/affairs/b", &params);
        assert_ne!(calculate_hash(&a, 1), calculate_hash(&b, 1));
    }
}

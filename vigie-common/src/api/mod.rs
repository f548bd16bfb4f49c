//! API module for shared HTTP API functionality
//!
//! Pure functions, database operations and shared types only. The admin crate
//! wraps them in axum middleware and handlers.

pub mod auth;
pub mod types;

pub use auth::{
    calculate_hash, query_signing_value, validate_hash, validate_timestamp, ApiAuthError,
};
#[cfg(feature = "sqlx")]
pub use auth::{initialize_shared_secret, load_shared_secret};
pub use types::{AuthErrorResponse, AuthFields};

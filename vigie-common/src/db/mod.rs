//! Database models and queries

#[cfg(feature = "sqlx")]
pub mod init;
pub mod models;
#[cfg(feature = "sqlx")]
pub mod settings;

#[cfg(feature = "sqlx")]
pub use init::*;
pub use models::*;
#[cfg(feature = "sqlx")]
pub use settings::*;

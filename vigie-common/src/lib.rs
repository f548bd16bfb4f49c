//! # Vigie Common Library
//!
//! Shared code for the Vigie services including:
//! - Database schema, models and settings
//! - Configuration loading
//! - Text normalization for French press and court vocabulary
//! - Press article tier classification
//! - Duplicate affair detection
//! - API authentication primitives

pub mod affairs;
pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod press;
pub mod text;

pub use affairs::{DuplicateDetector, DuplicateGroup};
pub use error::{Error, Result};
pub use press::{classify_article, PressTier};

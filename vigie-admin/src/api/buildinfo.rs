//! Build information endpoint

use axum::response::Json;
use serde::Serialize;

/// Build identification captured by build.rs
#[derive(Debug, Serialize)]
pub struct BuildInfo {
    pub version: String,
    pub git_hash: String,
    pub build_timestamp: String,
    pub build_profile: String,
}

impl BuildInfo {
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            git_hash: env!("GIT_HASH").to_string(),
            build_timestamp: env!("BUILD_TIMESTAMP").to_string(),
            build_profile: env!("BUILD_PROFILE").to_string(),
        }
    }
}

/// GET /api/buildinfo
pub async fn get_build_info() -> Json<BuildInfo> {
    Json(BuildInfo::current())
}

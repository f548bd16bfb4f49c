//! Affair review endpoints: listing, duplicate detection, merge and delete

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;
use vigie_common::db::{load_duplicate_detector, Affair, Politician};
use vigie_common::DuplicateGroup;

use crate::{db, AppState};

#[derive(Debug, Serialize)]
pub struct AffairsResponse {
    pub politician: Politician,
    pub affairs: Vec<Affair>,
}

#[derive(Debug, Serialize)]
pub struct DuplicatesResponse {
    pub politician_id: String,
    pub affair_count: usize,
    pub groups: Vec<DuplicateGroup>,
}

#[derive(Debug, Serialize)]
pub struct MergeResponse {
    pub affair: Affair,
    pub moved_sources: usize,
    pub dropped_sources: usize,
}

#[derive(Debug, Deserialize)]
pub struct MergeRequest {
    pub keep_id: String,
    pub remove_id: String,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: String,
}

/// GET /api/politicians/:id/affairs
pub async fn list_affairs(
    State(state): State<AppState>,
    Path(politician_id): Path<String>,
) -> Result<Json<AffairsResponse>, AffairsError> {
    let politician = db::load_politician(&state.db, &politician_id)
        .await?
        .ok_or_else(|| AffairsError::NotFound(format!("Politician not found: {}", politician_id)))?;

    let affairs = db::load_affairs(&state.db, &politician_id).await?;

    Ok(Json(AffairsResponse { politician, affairs }))
}

/// GET /api/politicians/:id/affairs/duplicates
///
/// Scores every pair of the politician's affairs with the thresholds stored in
/// `settings`. Read-only.
pub async fn find_duplicate_affairs(
    State(state): State<AppState>,
    Path(politician_id): Path<String>,
) -> Result<Json<DuplicatesResponse>, AffairsError> {
    if db::load_politician(&state.db, &politician_id).await?.is_none() {
        return Err(AffairsError::NotFound(format!(
            "Politician not found: {}",
            politician_id
        )));
    }

    let affairs = db::load_affairs(&state.db, &politician_id).await?;
    let detector = load_duplicate_detector(&state.db).await?;
    let groups = detector.find_duplicates(&affairs);

    Ok(Json(DuplicatesResponse {
        politician_id,
        affair_count: affairs.len(),
        groups,
    }))
}

/// POST /api/affairs/merge
pub async fn merge_affairs(
    State(state): State<AppState>,
    Json(request): Json<MergeRequest>,
) -> Result<Json<MergeResponse>, AffairsError> {
    let outcome = db::merge_affairs(&state.db, &request.keep_id, &request.remove_id).await?;
    Ok(Json(MergeResponse {
        affair: outcome.affair,
        moved_sources: outcome.moved_sources,
        dropped_sources: outcome.dropped_sources,
    }))
}

/// DELETE /api/affairs/:id
pub async fn delete_affair(
    State(state): State<AppState>,
    Path(affair_id): Path<String>,
) -> Result<Json<DeleteResponse>, AffairsError> {
    db::delete_affair(&state.db, &affair_id).await?;
    Ok(Json(DeleteResponse { deleted: affair_id }))
}

/// Affair endpoint errors
#[derive(Debug)]
pub enum AffairsError {
    NotFound(String),
    BadRequest(String),
    DatabaseError(String),
}

impl From<vigie_common::Error> for AffairsError {
    fn from(err: vigie_common::Error) -> Self {
        match err {
            vigie_common::Error::NotFound(msg) => AffairsError::NotFound(msg),
            vigie_common::Error::InvalidInput(msg) => AffairsError::BadRequest(msg),
            other => AffairsError::DatabaseError(other.to_string()),
        }
    }
}

impl IntoResponse for AffairsError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AffairsError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AffairsError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AffairsError::DatabaseError(msg) => {
                error!("Affair request failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Database error: {}", msg))
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

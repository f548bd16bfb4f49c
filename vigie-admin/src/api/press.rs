//! Press article endpoints: ad-hoc classification, bulk reclassification, listing

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;
use vigie_common::db::PressArticle;
use vigie_common::press::{classify_with_match, KeywordCategory};
use vigie_common::PressTier;

use crate::db::{self, ReclassifyCounts};
use crate::pagination::{calculate_pagination, PAGE_SIZE};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub tier: PressTier,
    pub matched_keyword: Option<&'static str>,
    pub category: Option<KeywordCategory>,
}

#[derive(Debug, Deserialize)]
pub struct ReclassifyRequest {
    #[serde(default)]
    pub all: bool,
}

#[derive(Debug, Deserialize)]
pub struct ArticlesQuery {
    pub tier: Option<String>,
    #[serde(default = "default_page")]
    pub page: i64,
}

fn default_page() -> i64 {
    1
}

#[derive(Debug, Serialize)]
pub struct ArticlesResponse {
    pub tier: Option<PressTier>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
    pub articles: Vec<PressArticle>,
}

/// POST /api/press/classify
pub async fn classify_press_article(
    Json(request): Json<ClassifyRequest>,
) -> Result<Json<ClassifyResponse>, PressError> {
    if request.title.trim().is_empty() {
        return Err(PressError::BadRequest("title must not be empty".to_string()));
    }

    let result = classify_with_match(&request.title, request.description.as_deref());

    Ok(Json(ClassifyResponse {
        tier: result.tier,
        matched_keyword: result.matched.as_ref().map(|m| m.keyword),
        category: result.matched.map(|m| m.category),
    }))
}

/// POST /api/press/reclassify
///
/// An absent body reclassifies unclassified articles only.
pub async fn reclassify_press_articles(
    State(state): State<AppState>,
    request: Option<Json<ReclassifyRequest>>,
) -> Result<Json<ReclassifyCounts>, PressError> {
    let all = request.map(|Json(r)| r.all).unwrap_or(false);
    let counts = db::reclassify_articles(&state.db, all).await?;
    Ok(Json(counts))
}

/// GET /api/press/articles
pub async fn list_press_articles(
    State(state): State<AppState>,
    Query(query): Query<ArticlesQuery>,
) -> Result<Json<ArticlesResponse>, PressError> {
    let tier = query
        .tier
        .as_deref()
        .filter(|t| !t.is_empty())
        .map(str::parse::<PressTier>)
        .transpose()?;

    let total = db::count_articles(&state.db, tier).await?;
    let pagination = calculate_pagination(total, query.page);
    let articles = db::list_articles(&state.db, tier, PAGE_SIZE, pagination.offset).await?;

    Ok(Json(ArticlesResponse {
        tier,
        total,
        page: pagination.page,
        page_size: PAGE_SIZE,
        total_pages: pagination.total_pages,
        articles,
    }))
}

/// Press endpoint errors
#[derive(Debug)]
pub enum PressError {
    BadRequest(String),
    DatabaseError(String),
}

impl From<vigie_common::Error> for PressError {
    fn from(err: vigie_common::Error) -> Self {
        match err {
            vigie_common::Error::InvalidInput(msg) => PressError::BadRequest(msg),
            other => PressError::DatabaseError(other.to_string()),
        }
    }
}

impl IntoResponse for PressError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            PressError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            PressError::DatabaseError(msg) => {
                error!("Press request failed: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, format!("Database error: {}", msg))
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

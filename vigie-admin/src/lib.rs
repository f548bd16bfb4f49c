//! vigie-admin library
//!
//! Admin HTTP service for reviewing judicial affairs and press articles:
//! duplicate affair detection and merge, press tier classification.

use axum::Router;
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod pagination;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Shared secret for API authentication (0 disables checks)
    pub shared_secret: i64,
}

impl AppState {
    pub fn new(db: SqlitePool, shared_secret: i64) -> Self {
        Self { db, shared_secret }
    }
}

/// Build application router
///
/// Health and build info are public; everything else goes through the auth
/// middleware.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{delete, get, post};

    let protected = Router::new()
        .route("/api/politicians/:id/affairs", get(api::list_affairs))
        .route(
            "/api/politicians/:id/affairs/duplicates",
            get(api::find_duplicate_affairs),
        )
        .route("/api/affairs/merge", post(api::merge_affairs))
        .route("/api/affairs/:id", delete(api::delete_affair))
        .route("/api/press/classify", post(api::classify_press_article))
        .route("/api/press/reclassify", post(api::reclassify_press_articles))
        .route("/api/press/articles", get(api::list_press_articles))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth_middleware,
        ));

    let public = api::health_routes();

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

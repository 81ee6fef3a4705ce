//! API route configuration.

use crate::api::handlers::{health_handler, query_handler, resource_handler};
use crate::state::AppState;
use axum::{
    Router,
    routing::{any, get, post},
};

/// All API routes.
///
/// # Endpoints
///
/// - `POST /ds/query`          - Run panel queries through the cache
/// - `ANY  /resources/{*path}` - Datasource resource calls (never cached)
/// - `GET  /health`            - Store health
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ds/query", post(query_handler))
        .route("/resources/{*path}", any(resource_handler))
        .route("/health", get(health_handler))
}

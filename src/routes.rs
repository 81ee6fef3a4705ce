//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `/api/*` - query, resource and health endpoints
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging

use crate::api;
use crate::api::middleware::tracing;
use crate::state::AppState;
use axum::Router;

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", api::routes::api_routes())
        .with_state(state)
        .layer(tracing::layer())
}

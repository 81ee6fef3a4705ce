//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /api/health`
///
/// # Response Codes
///
/// - **200 OK**: Store reachable
/// - **503 Service Unavailable**: Store unreachable (queries still work, uncached)
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "cache": { "status": "ok", "message": "redis store reachable" }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let cache_check = check_cache(&state).await;

    let all_healthy = cache_check.status == "ok";

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks { cache: cache_check },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

/// Checks store connectivity.
async fn check_cache(state: &AppState) -> CheckStatus {
    let name = state.store.name();
    if state.store.health_check().await {
        CheckStatus {
            status: "ok".to_string(),
            message: Some(format!("{} store reachable", name)),
        }
    } else {
        CheckStatus {
            status: "error".to_string(),
            message: Some(format!("{} store unreachable", name)),
        }
    }
}

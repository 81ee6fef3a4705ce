//! Handler for cached panel queries.

use axum::{
    Json,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::api::dto::query::QueryDataBody;
use crate::api::forwarded::forwarded_headers;
use crate::domain::cache_status::CacheStatus;
use crate::domain::headers::X_CACHE;
use crate::domain::query::QueryRequest;
use crate::error::AppError;
use crate::state::AppState;

/// Answers a batch of panel queries, from the cache when possible.
///
/// # Endpoint
///
/// `POST /api/ds/query`
///
/// # Request Flow
///
/// 1. Canonicalize request headers into the forwarded-header map
/// 2. Ask the caching service for a stored response
/// 3. On a hit, return it
/// 4. Otherwise run the queries on the backend
/// 5. Populate the cache (when the lookup handed back an updater)
/// 6. Return the backend response
///
/// Every response carries `X-Cache: HIT|MISS|BYPASS|ERROR|DISABLED`.
///
/// # Errors
///
/// Returns 400 Bad Request if the body has no queries.
/// Returns 502 Bad Gateway if the backend fails. Cache problems never
/// produce an error response.
pub async fn query_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<QueryDataBody>,
) -> Result<Response, AppError> {
    if body.queries.is_empty() {
        return Err(AppError::bad_request(
            "At least one query is required",
            json!({ "field": "queries" }),
        ));
    }

    let request = QueryRequest {
        queries: body.queries,
        headers: forwarded_headers(&headers),
    };

    let cached = state.caching.handle_query_request(&request).await;
    let status = cached.status;

    if let Some(response) = cached.response {
        return Ok(with_cache_status(status, Json(response)));
    }

    let response = state.backend.query_data(&request).await?;

    if let Some(updater) = cached.updater {
        updater.update(&response).await;
    }

    Ok(with_cache_status(status, Json(response)))
}

fn with_cache_status(status: CacheStatus, body: impl IntoResponse) -> Response {
    ([(X_CACHE, status.as_str())], body).into_response()
}

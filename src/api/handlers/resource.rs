//! Handler for datasource resource calls.

use axum::{
    body::Bytes,
    extract::{Path, RawQuery, State},
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::api::forwarded::forwarded_headers;
use crate::domain::query::{ResourceRequest, ResourceResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Forwards a resource call to the backend.
///
/// # Endpoint
///
/// `ANY /api/resources/{*path}`
///
/// The query string travels with the path.
///
/// Resource calls go through the caching service for symmetry with queries,
/// but are never served from or written to the cache, and no `X-Cache`
/// header is emitted.
///
/// # Errors
///
/// Returns 502 Bad Gateway if the backend fails.
pub async fn resource_handler(
    State(state): State<AppState>,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let path = match query {
        Some(query) => format!("{}?{}", path, query),
        None => path,
    };

    let request = ResourceRequest {
        path,
        method: method.to_string(),
        headers: forwarded_headers(&headers),
        body: body.to_vec(),
    };

    let cached = state.caching.handle_resource_request(&request).await;
    let response = match cached.response {
        Some(response) => response,
        None => state.backend.call_resource(&request).await?,
    };

    into_http_response(response)
}

fn into_http_response(resource: ResourceResponse) -> Result<Response, AppError> {
    let status = StatusCode::from_u16(resource.status).map_err(|_| {
        AppError::internal(
            "Backend returned an invalid status code",
            json!({ "status": resource.status }),
        )
    })?;

    let mut response = (status, resource.body).into_response();
    for (name, value) in &resource.headers {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name.as_str()),
            HeaderValue::try_from(value.as_str()),
        ) {
            response.headers_mut().insert(name, value);
        }
    }

    Ok(response)
}

//! HTTP client for the data-query backend behind the cache.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method};
use serde_json::json;
use tracing::debug;

use crate::domain::backend::{BackendError, QueryBackend};
use crate::domain::query::{QueryRequest, QueryResponse, ResourceRequest, ResourceResponse};

/// Headers owned by the connection rather than the request.
const HOP_BY_HOP: &[&str] = &[
    "Host",
    "Connection",
    "Keep-Alive",
    "Transfer-Encoding",
    "Content-Length",
    "Accept-Encoding",
    "Upgrade",
    "Te",
    "Trailer",
];

/// Forwards queries and resource calls to an upstream HTTP service exposing
/// `POST /api/ds/query` and `/api/resources/*`.
#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// # Errors
    ///
    /// Returns [`BackendError::Unavailable`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let client = Client::builder()
            .user_agent(concat!("panel-query-cache/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Unavailable(format!("failed to build client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

fn outgoing_headers(headers: &HashMap<String, String>) -> HeaderMap {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if HOP_BY_HOP.iter().any(|h| h.eq_ignore_ascii_case(name)) {
            continue;
        }
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            map.insert(name, value);
        }
    }
    map
}

fn incoming_headers(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .filter(|(name, _)| {
            !HOP_BY_HOP
                .iter()
                .any(|h| h.eq_ignore_ascii_case(name.as_str()))
        })
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect()
}

fn unavailable(e: reqwest::Error) -> BackendError {
    BackendError::Unavailable(e.to_string())
}

#[async_trait]
impl QueryBackend for HttpBackend {
    async fn query_data(&self, request: &QueryRequest) -> Result<QueryResponse, BackendError> {
        let mut headers = outgoing_headers(&request.headers);
        headers.remove(reqwest::header::CONTENT_TYPE);

        let response = self
            .client
            .post(self.url("/api/ds/query"))
            .headers(headers)
            .json(&json!({ "queries": request.queries }))
            .send()
            .await
            .map_err(unavailable)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(unavailable)?;
        debug!(status = status.as_u16(), bytes = bytes.len(), "Upstream query");

        if !status.is_success() {
            return Err(BackendError::Rejected(format!(
                "status {} body {}",
                status,
                String::from_utf8_lossy(&bytes)
            )));
        }

        serde_json::from_slice(&bytes)
            .map_err(|e| BackendError::Rejected(format!("invalid response body: {}", e)))
    }

    async fn call_resource(
        &self,
        request: &ResourceRequest,
    ) -> Result<ResourceResponse, BackendError> {
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|_| BackendError::Rejected(format!("invalid method {}", request.method)))?;

        let response = self
            .client
            .request(method, self.url(&format!("/api/resources/{}", request.path)))
            .headers(outgoing_headers(&request.headers))
            .body(request.body.clone())
            .send()
            .await
            .map_err(unavailable)?;

        let status = response.status().as_u16();
        let headers = incoming_headers(response.headers());
        let body = response.bytes().await.map_err(unavailable)?.to_vec();
        debug!(status, bytes = body.len(), path = %request.path, "Upstream resource");

        Ok(ResourceResponse {
            status,
            headers,
            body,
        })
    }
}

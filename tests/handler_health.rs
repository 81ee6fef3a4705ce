mod common;

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use panel_query_cache::application::services::CachingSettings;
use panel_query_cache::infrastructure::cache::{CacheError, CacheResult, CacheStore};
use panel_query_cache::routes::app_router;
use panel_query_cache::state::AppState;

/// Store whose backing service is down.
struct DownStore;

#[async_trait]
impl CacheStore for DownStore {
    async fn get(&self, _key: &str) -> CacheResult<Option<Vec<u8>>> {
        Err(CacheError::ConnectionError("down".into()))
    }

    async fn set(&self, _key: &str, _value: &[u8], _ttl: std::time::Duration) -> CacheResult<()> {
        Err(CacheError::ConnectionError("down".into()))
    }

    async fn delete_with_prefix(&self, _prefix: &str) -> CacheResult<u64> {
        Err(CacheError::ConnectionError("down".into()))
    }

    async fn health_check(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "down"
    }
}

#[tokio::test]
async fn test_health_endpoint_success() {
    let (state, _store) =
        common::create_test_state(common::FakeBackend::returning(common::series_response(1)));
    let server = TestServer::new(app_router(state)).unwrap();

    let response = server.get("/api/health").await;

    response.assert_status_ok();

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["checks"]["cache"]["status"], "ok");
    assert_eq!(json["checks"]["cache"]["message"], "memory store reachable");
    assert!(json.get("version").is_some());
}

#[tokio::test]
async fn test_health_endpoint_degraded() {
    let state = AppState::new(
        Arc::new(DownStore),
        common::FakeBackend::returning(common::series_response(1)),
        CachingSettings::default(),
    );
    let server = TestServer::new(app_router(state)).unwrap();

    let response = server.get("/api/health").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["cache"]["status"], "error");
}

#[tokio::test]
async fn test_store_outage_does_not_fail_queries() {
    let backend = common::FakeBackend::returning(common::series_response(5));
    let state = AppState::new(Arc::new(DownStore), backend.clone(), CachingSettings::default());
    let server = TestServer::new(app_router(state)).unwrap();

    let response = server
        .post("/api/ds/query")
        .json(&common::query_body(serde_json::json!(300)))
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.headers().get("x-cache").unwrap().to_str().unwrap(),
        "ERROR"
    );
    assert_eq!(backend.query_calls(), 1);
}

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use panel_query_cache::application::services::CachingSettings;
use panel_query_cache::domain::backend::{BackendError, QueryBackend};
use panel_query_cache::domain::headers::{DASHBOARD_UID, DATASOURCE_UID, ORG_ID, PANEL_ID};
use panel_query_cache::domain::query::{
    DataQuery, DataResponse, Field, Frame, QueryRequest, QueryResponse, ResourceRequest,
    ResourceResponse, TimeRange,
};
use panel_query_cache::infrastructure::cache::{CacheStore, MemoryCache};
use panel_query_cache::state::AppState;
use serde_json::{Value, json};

/// Backend that answers every query with a fixed response and records calls.
pub struct FakeBackend {
    response: Mutex<Result<QueryResponse, String>>,
    query_calls: AtomicUsize,
    resource_calls: AtomicUsize,
    last_headers: Mutex<HashMap<String, String>>,
    last_resource: Mutex<Option<ResourceRequest>>,
}

impl FakeBackend {
    pub fn returning(response: QueryResponse) -> Arc<Self> {
        Arc::new(Self {
            response: Mutex::new(Ok(response)),
            query_calls: AtomicUsize::new(0),
            resource_calls: AtomicUsize::new(0),
            last_headers: Mutex::new(HashMap::new()),
            last_resource: Mutex::new(None),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        let backend = Self::returning(QueryResponse::new());
        backend.set_failure(message);
        backend
    }

    pub fn set_response(&self, response: QueryResponse) {
        *self.response.lock().unwrap() = Ok(response);
    }

    pub fn set_failure(&self, message: &str) {
        *self.response.lock().unwrap() = Err(message.to_string());
    }

    pub fn query_calls(&self) -> usize {
        self.query_calls.load(Ordering::SeqCst)
    }

    pub fn resource_calls(&self) -> usize {
        self.resource_calls.load(Ordering::SeqCst)
    }

    pub fn last_headers(&self) -> HashMap<String, String> {
        self.last_headers.lock().unwrap().clone()
    }

    pub fn last_resource(&self) -> Option<ResourceRequest> {
        self.last_resource.lock().unwrap().clone()
    }
}

#[async_trait]
impl QueryBackend for FakeBackend {
    async fn query_data(&self, request: &QueryRequest) -> Result<QueryResponse, BackendError> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_headers.lock().unwrap() = request.headers.clone();
        self.response
            .lock()
            .unwrap()
            .clone()
            .map_err(BackendError::Unavailable)
    }

    async fn call_resource(
        &self,
        request: &ResourceRequest,
    ) -> Result<ResourceResponse, BackendError> {
        self.resource_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_resource.lock().unwrap() = Some(request.clone());
        Ok(ResourceResponse {
            status: 200,
            headers: HashMap::from([("content-type".to_string(), "text/plain".to_string())]),
            body: format!("{} {}", request.method, request.path).into_bytes(),
        })
    }
}

pub fn range() -> TimeRange {
    TimeRange::new(
        Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2024, 1, 1, 10, 5, 0).unwrap(),
    )
}

/// A single-series response that passes the integrity checks.
pub fn series_response(value: i64) -> QueryResponse {
    QueryResponse::new().with_response(
        "A",
        DataResponse::with_frames(vec![Frame::new(
            "cpu",
            vec![
                Field::new("time", vec![json!(1_704_103_200_000_i64)]),
                Field::new("value", vec![json!(value)]),
            ],
        )]),
    )
}

/// Query request for dashboard `D`, datasource `DS`, org `7`, panel `panel`.
pub fn panel_request(panel: &str, props: Value) -> QueryRequest {
    QueryRequest::new(vec![DataQuery::new("A", range(), props)])
        .with_header(DASHBOARD_UID, "D")
        .with_header(DATASOURCE_UID, "DS")
        .with_header(ORG_ID, "7")
        .with_header(PANEL_ID, panel)
}

/// JSON body for `POST /api/ds/query`.
pub fn query_body(ttl: Value) -> Value {
    json!({
        "queries": [{
            "refId": "A",
            "timeRange": { "from": "2024-01-01T10:00:00Z", "to": "2024-01-01T10:05:00Z" },
            "json": { "expr": "up", "queryCachingTTL": ttl }
        }]
    })
}

pub fn create_test_state(backend: Arc<FakeBackend>) -> (AppState, Arc<MemoryCache>) {
    let store = Arc::new(MemoryCache::new(1_000));
    let state = AppState::new(
        store.clone() as Arc<dyn CacheStore>,
        backend,
        CachingSettings::default(),
    );
    (state, store)
}

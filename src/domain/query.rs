//! Query and resource request/response models.
//!
//! These mirror the JSON shapes exchanged with the data-query backend. A
//! [`QueryRequest`] carries one or more [`DataQuery`] entries plus the
//! forwarded request headers that identify the dashboard panel; a
//! [`QueryResponse`] carries one [`DataResponse`] per query `refId`.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Absolute time range a query is evaluated over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self { from, to }
    }

    /// Length of the range. Negative when `to` precedes `from`.
    pub fn span(&self) -> TimeDelta {
        self.to - self.from
    }
}

/// A single query inside a [`QueryRequest`].
///
/// `json` is the datasource-specific property bag. The caching layer only
/// ever looks at its `queryCachingTTL` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQuery {
    pub ref_id: String,
    pub time_range: TimeRange,
    #[serde(default)]
    pub json: Value,
}

impl DataQuery {
    pub fn new(ref_id: impl Into<String>, time_range: TimeRange, json: Value) -> Self {
        Self {
            ref_id: ref_id.into(),
            time_range,
            json,
        }
    }
}

/// A batch of queries issued on behalf of one dashboard panel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryRequest {
    pub queries: Vec<DataQuery>,
    /// Forwarded request headers in canonical form (`X-Panel-Id`, ...).
    pub headers: HashMap<String, String>,
}

impl QueryRequest {
    pub fn new(queries: Vec<DataQuery>) -> Self {
        Self {
            queries,
            headers: HashMap::new(),
        }
    }

    /// Adds a forwarded header, replacing any previous value.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Returns a header value, or `""` when absent.
    pub fn header(&self, name: &str) -> &str {
        self.headers.get(name).map(String::as_str).unwrap_or_default()
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.headers.contains_key(name)
    }

    /// The first query; cache settings and the time bucket are taken from it.
    pub fn first_query(&self) -> Option<&DataQuery> {
        self.queries.first()
    }
}

/// One column of a data frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub values: Vec<Value>,
}

impl Field {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            labels: BTreeMap::new(),
            values,
        }
    }
}

/// A columnar result table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub fields: Vec<Field>,
    /// Datasource metadata, passed through untouched. `null` when absent.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub meta: Value,
}

impl Frame {
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Self {
            name: name.into(),
            fields,
            meta: Value::Null,
        }
    }
}

/// Result of a single query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataResponse {
    #[serde(default)]
    pub frames: Vec<Frame>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DataResponse {
    pub fn with_frames(frames: Vec<Frame>) -> Self {
        Self { frames, error: None }
    }

    pub fn with_error(message: impl Into<String>) -> Self {
        Self {
            frames: Vec::new(),
            error: Some(message.into()),
        }
    }
}

/// Results of a [`QueryRequest`], keyed by query `refId`.
///
/// A `BTreeMap` keeps serialization order stable so equal responses encode to
/// equal bytes. The map is required on the wire, under either `responses` or
/// `results`; a body carrying neither is not a query response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(alias = "results")]
    pub responses: BTreeMap<String, DataResponse>,
}

impl QueryResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_response(mut self, ref_id: impl Into<String>, response: DataResponse) -> Self {
        self.responses.insert(ref_id.into(), response);
        self
    }

    /// Checks whether this response may be written to the cache.
    ///
    /// A cacheable response has at least one result, no result carries an
    /// error, every result has a frame and every frame has a field.
    ///
    /// # Errors
    ///
    /// Returns the first [`IntegrityError`] found, in `refId` order.
    pub fn check_cacheable(&self) -> Result<(), IntegrityError> {
        if self.responses.is_empty() {
            return Err(IntegrityError::NoResponses);
        }

        for (ref_id, response) in &self.responses {
            if let Some(message) = &response.error {
                return Err(IntegrityError::QueryFailed {
                    ref_id: ref_id.clone(),
                    message: message.clone(),
                });
            }
            if response.frames.is_empty() {
                return Err(IntegrityError::NoFrames {
                    ref_id: ref_id.clone(),
                });
            }
            if let Some(frame) = response.frames.iter().find(|f| f.fields.is_empty()) {
                return Err(IntegrityError::NoFields {
                    ref_id: ref_id.clone(),
                    frame: frame.name.clone(),
                });
            }
        }

        Ok(())
    }
}

/// Reasons a [`QueryResponse`] is refused by the cache write path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityError {
    #[error("response contains no query results")]
    NoResponses,

    #[error("query {ref_id} failed: {message}")]
    QueryFailed { ref_id: String, message: String },

    #[error("query {ref_id} returned no frames")]
    NoFrames { ref_id: String },

    #[error("frame {frame:?} of query {ref_id} has no fields")]
    NoFields { ref_id: String, frame: String },
}

/// A non-query call forwarded to the backend (e.g. a datasource resource URL).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceRequest {
    pub path: String,
    pub method: String,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

/// Backend answer to a [`ResourceRequest`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

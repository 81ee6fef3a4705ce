//! HTTP request/response tracing middleware.

use tower_http::LatencyUnit;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Creates a tracing middleware for HTTP requests.
///
/// Request spans are opened at `INFO` with method, URI and version; responses
/// are logged at `INFO` with status and latency in milliseconds. The
/// `X-Cache` outcome is logged separately by the caching service, inside the
/// request span.
///
/// # Example Logs
///
/// ```text
/// INFO request{method=POST uri=/api/ds/query version=HTTP/1.1}: finished processing request latency=4 ms status=200
/// ```
pub fn layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        )
}

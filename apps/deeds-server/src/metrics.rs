//! Prometheus metrics for deeds-server.
//!
//! Exposes server metrics in Prometheus format at the `/metrics` endpoint.

use std::time::{Duration, Instant};

use axum::{
    extract::{MatchedPath, Request},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the Prometheus recorder and return a handle for rendering.
///
/// Must be called once at server startup before any metrics are recorded.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    describe_counter!(
        "deeds_http_requests_total",
        "Total number of HTTP requests processed"
    );
    describe_histogram!(
        "deeds_http_request_duration_seconds",
        "Duration of HTTP requests in seconds"
    );
    // Domain counters are incremented by deeds-engine
    describe_counter!("deeds_rounds_started_total", "Rounds started");
    describe_counter!(
        "deeds_rounds_advanced_total",
        "Rounds closed and replaced by a successor"
    );
    describe_counter!("deeds_completed_total", "Deeds that reached completed");

    Ok(handle)
}

/// Record a finished HTTP request.
pub fn record_http_request(method: String, route: String, status: StatusCode, duration: Duration) {
    let outcome = if status.is_server_error() {
        "error"
    } else {
        "ok"
    };
    counter!(
        "deeds_http_requests_total",
        "method" => method.clone(),
        "route" => route.clone(),
        "status" => status.as_u16().to_string(),
        "outcome" => outcome
    )
    .increment(1);
    histogram!("deeds_http_request_duration_seconds", "method" => method, "route" => route)
        .record(duration.as_secs_f64());
}

/// A helper to time a request and record metrics on completion.
pub struct RequestTimer {
    method: String,
    route: String,
    start: Instant,
}

impl RequestTimer {
    /// Start timing a request.
    pub fn new(method: String, route: String) -> Self {
        Self {
            method,
            route,
            start: Instant::now(),
        }
    }

    /// Record the request with its response status.
    pub fn finish(self, status: StatusCode) {
        record_http_request(self.method, self.route, status, self.start.elapsed());
    }
}

/// Middleware recording count and latency per matched route.
pub async fn track_requests(req: Request, next: Next) -> Response {
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or_else(|| "unmatched".to_owned());
    let timer = RequestTimer::new(req.method().as_str().to_owned(), route);

    let response = next.run(req).await;
    timer.finish(response.status());
    response
}

use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::server::DeedsServer;

pub async fn healthz() -> &'static str {
    "ok"
}

pub async fn readyz(State(server): State<DeedsServer>) -> Result<&'static str, StatusCode> {
    if *server.ready.borrow() {
        Ok("ok")
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}

/// Prometheus text format, or 404 when no recorder is installed.
pub async fn metrics(State(server): State<DeedsServer>) -> impl IntoResponse {
    match server.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics disabled".to_string()),
    }
}

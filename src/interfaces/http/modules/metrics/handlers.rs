//! Prometheus scrape endpoint
//!
//! Renders the global `metrics-exporter-prometheus` recorder: HTTP traffic
//! from the middleware plus `backend_requests_total` and
//! `backend_request_duration_seconds` from the instrumented gateway.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct MetricsState {
    pub handle: PrometheusHandle,
}

/// `GET /metrics` (no auth)
pub async fn prometheus_metrics(State(state): State<MetricsState>) -> impl IntoResponse {
    let body = state.handle.render();
    (
        StatusCode::OK,
        [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
}

//! Liveness and backend reachability

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use crate::application::SharedSessionRegistry;
use crate::domain::ports::SharedGateway;

#[derive(Clone)]
pub struct HealthState {
    pub gateway: SharedGateway,
    pub session_registry: SharedSessionRegistry,
    pub started_at: Arc<Instant>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Degraded,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub backend: BackendHealth,
    pub active_sessions: usize,
}

/// Result of a single backend ping.
#[derive(Debug, Serialize, ToSchema)]
pub struct BackendHealth {
    /// `memory` or `postgrest`
    pub kind: String,
    pub reachable: bool,
    pub latency_ms: Option<u64>,
    pub error: Option<String>,
}

impl BackendHealth {
    async fn probe(gateway: &SharedGateway) -> Self {
        let started = Instant::now();
        let outcome = gateway.ping().await;
        let kind = gateway.name().to_string();
        match outcome {
            Ok(()) => Self {
                kind,
                reachable: true,
                latency_ms: Some(started.elapsed().as_millis() as u64),
                error: None,
            },
            Err(e) => {
                warn!(backend = %kind, error = %e, "Backend ping failed");
                Self {
                    kind,
                    reachable: false,
                    latency_ms: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

/// 200 while the backend answers, 503 otherwise. Never requires a session.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Backend reachable", body = HealthResponse),
        (status = 503, description = "Backend unreachable", body = HealthResponse)
    )
)]
pub async fn health_check(
    State(state): State<HealthState>,
) -> (StatusCode, Json<HealthResponse>) {
    let backend = BackendHealth::probe(&state.gateway).await;
    let (code, status) = if backend.reachable {
        (StatusCode::OK, HealthStatus::Ok)
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, HealthStatus::Degraded)
    };

    let body = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        backend,
        active_sessions: state.session_registry.count(),
    };
    (code, Json(body))
}

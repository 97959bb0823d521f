//! Health check endpoints for liveness and readiness.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::errors::ApiResponse;
use crate::AppState;

/// Readiness check detail.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub database: String,
    pub error_reporting: bool,
}

/// Liveness check: OK while the process is running.
pub async fn live() -> &'static str {
    "OK"
}

/// Readiness check: checks storage connectivity.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ApiResponse<HealthStatus>>) {
    let (code, status, database) = match state.store.ping().await {
        Ok(()) => (StatusCode::OK, "ok", "connected".to_string()),
        Err(e) => {
            tracing::warn!(error = %e, "Storage health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "degraded", "unavailable".to_string())
        }
    };

    (
        code,
        ApiResponse::success(HealthStatus {
            status: status.to_string(),
            database,
            error_reporting: state.reporter.is_enabled(),
        }),
    )
}

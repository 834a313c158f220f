//! Health check handlers

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::state::AppState;

/// Health check response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub docker: bool,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub limits: LimitsResponse,
}

/// Limits applied to every execution
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitsResponse {
    pub memory_limit_mb: u64,
    pub run_timeout_secs: u64,
    pub max_concurrent_executions: usize,
}

/// Health check endpoint; 503 while the container engine is unreachable
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let docker = state.sandbox().is_available().await;
    let sandbox = &state.config().sandbox;

    let status = if docker {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            status: if docker { "healthy" } else { "degraded" }.to_string(),
            docker,
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
            limits: LimitsResponse {
                memory_limit_mb: sandbox.memory_limit_mb,
                run_timeout_secs: sandbox.run_timeout.as_secs(),
                max_concurrent_executions: sandbox.max_concurrent_executions,
            },
        }),
    )
}

/// Health routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

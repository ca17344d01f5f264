//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;
use docrank_common::VERSION;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: String,
    pub version: &'static str,
}

/// Liveness check: healthy while the server is running
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: state.config.observability.service_name.clone(),
        version: VERSION,
    })
}

use axum::{extract::State, Json};

use crate::AppState;
use docrank_common::AppConfig;

/// Effective configuration, as loaded at startup
pub async fn config_view(State(state): State<AppState>) -> Json<AppConfig> {
    Json(state.config.as_ref().clone())
}

//! Settings API endpoints - JSON API

use crate::AppState;
use axum::extract::State;
use axum::Json;

/// Current configuration (JSON API)
pub async fn api_settings(state: State<AppState>) -> Json<serde_json::Value> {
    Json(super::redacted_config(&state.config))
}

//! Dashboard API endpoints - JSON API
//!
//! Endpoints:
//! - api_summary: Totals and the selected monthly window
//! - api_chart: Chart data for the selected window
//! - api_refresh: Re-fetch and replace the cache
//! - api_invalidate: Drop the cache

use crate::{ApiError, AppState};
use axum::extract::{Query, State};
use axum::Json;
use sheetdash_core::{ChartData, DashboardSummary};
use std::collections::HashMap;

/// Get dashboard summary (JSON API)
pub async fn api_summary(
    state: State<AppState>,
    params: Query<HashMap<String, String>>,
) -> Result<Json<DashboardSummary>, ApiError> {
    let view = super::current_view(&state, params.get("range").map(String::as_str)).await?;
    Ok(Json(view.summary()))
}

/// Get chart data (JSON API)
pub async fn api_chart(
    state: State<AppState>,
    params: Query<HashMap<String, String>>,
) -> Result<Json<ChartData>, ApiError> {
    let view = super::current_view(&state, params.get("range").map(String::as_str)).await?;
    Ok(Json(view.chart_data()))
}

/// Re-fetch the sheet (JSON API)
///
/// On failure the previous snapshot keeps serving.
pub async fn api_refresh(state: State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let rows = super::refresh(&state).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "rows": rows,
        "message": format!("Loaded {} rows", rows)
    })))
}

/// Drop the cached rows (JSON API)
pub async fn api_invalidate(state: State<AppState>) -> Json<serde_json::Value> {
    let evicted = state.dashboard.write().await.invalidate();
    Json(serde_json::json!({ "success": true, "evicted": evicted }))
}

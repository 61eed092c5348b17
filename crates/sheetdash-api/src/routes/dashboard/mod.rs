//! Dashboard routes - Totals, monthly chart and refresh

pub mod api;
pub mod page;

pub use api::{api_chart, api_invalidate, api_refresh, api_summary};
pub use page::{htmx_refresh, htmx_summary, page_dashboard};

use crate::AppState;
use sheetdash_core::{CoreError, CoreResult, DashboardView};

/// Fetch outside the dashboard lock and commit the result
///
/// Fails with [`CoreError::FetchInProgress`] while another refresh runs.
pub(crate) async fn refresh(state: &AppState) -> CoreResult<usize> {
    let _guard = state
        .refresh_gate
        .try_lock()
        .map_err(|_| CoreError::FetchInProgress)?;
    fetch_and_apply(state).await
}

async fn fetch_and_apply(state: &AppState) -> CoreResult<usize> {
    let source = state.dashboard.read().await.source();
    let outcome = source.fetch().await;
    state.dashboard.write().await.apply_fetch(outcome)
}

/// Render from the cache, loading it first when empty
///
/// The first load waits for a refresh already in flight instead of failing.
pub(crate) async fn current_view(state: &AppState, range: Option<&str>) -> CoreResult<DashboardView> {
    if state.dashboard.read().await.cache().is_empty() {
        let _guard = state.refresh_gate.lock().await;
        if state.dashboard.read().await.cache().is_empty() {
            fetch_and_apply(state).await?;
        }
    }

    let dashboard = state.dashboard.read().await;
    let range = dashboard.parse_range(range);
    dashboard.render(range)
}

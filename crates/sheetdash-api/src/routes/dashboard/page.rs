//! Dashboard page rendering - Full page and HTMX partials

use crate::AppState;
use axum::extract::{Query, State};
use axum::response::Html;
use axum::Form;
use sheetdash_core::{DashboardView, ErrorDetails};
use sheetdash_utils::escape_html;
use std::collections::HashMap;

const RANGE_OPTIONS: [usize; 5] = [3, 6, 12, 24, 36];

/// Dashboard page
pub async fn page_dashboard(
    state: State<AppState>,
    headers: axum::http::HeaderMap,
    params: Query<HashMap<String, String>>,
) -> Html<String> {
    let range_param = params.get("range").map(String::as_str);
    let result = super::current_view(&state, range_param).await;

    let selected = match &result {
        Ok(view) => view.range.months(),
        Err(_) => state.dashboard.read().await.parse_range(range_param).months(),
    };
    let summary = match &result {
        Ok(view) => summary_fragment(view),
        Err(e) => error_banner(&e.to_details()),
    };

    let inner_content = format!(
        r#"<div class='mb-6 flex items-center justify-between'>
            <h2 class='text-2xl font-bold'>{}</h2>
            <div class='flex items-center gap-3'>
                <label class='text-sm text-gray-600' for='range'>Months</label>
                <select id='range' name='range' class='border rounded-lg px-3 py-2 bg-white'
                        hx-get='/dashboard/summary' hx-target='#summary' hx-trigger='change' hx-indicator='#loading'>{}</select>
                <button class='px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'
                        hx-post='/dashboard/refresh' hx-include='#range' hx-target='#summary' hx-indicator='#loading'>Refresh</button>
                <span id='loading' class='htmx-indicator text-sm text-gray-500'>Loading...</span>
            </div>
        </div>
        <div id='summary'>{}</div>"#,
        escape_html(&state.config.dashboard.title),
        range_options(selected),
        summary
    );

    Html(crate::page_response(&headers, &state.config, "Dashboard", "/dashboard", &inner_content))
}

/// HTMX: Totals and chart for the requested range
pub async fn htmx_summary(
    state: State<AppState>,
    params: Query<HashMap<String, String>>,
) -> Html<String> {
    match super::current_view(&state, params.get("range").map(String::as_str)).await {
        Ok(view) => Html(summary_fragment(&view)),
        Err(e) => Html(error_banner(&e.to_details())),
    }
}

/// HTMX: Refresh, then re-render
///
/// A failed refresh shows a banner above the previous figures.
pub async fn htmx_refresh(
    state: State<AppState>,
    form: Option<Form<HashMap<String, String>>>,
) -> Html<String> {
    let banner = match super::refresh(&state).await {
        Ok(_) => String::new(),
        Err(e) => error_banner(&e.to_details()),
    };

    let dashboard = state.dashboard.read().await;
    let range_param = form.as_ref().and_then(|f| f.get("range")).map(String::as_str);
    let range = dashboard.parse_range(range_param);
    let body = match dashboard.render(range) {
        Ok(view) => summary_fragment(&view),
        Err(e) if banner.is_empty() => error_banner(&e.to_details()),
        Err(_) => String::new(),
    };

    Html(format!("{}{}", banner, body))
}

fn range_options(selected: usize) -> String {
    let mut options: Vec<usize> = RANGE_OPTIONS.to_vec();
    if !options.contains(&selected) {
        options.push(selected);
        options.sort_unstable();
    }
    options
        .iter()
        .map(|n| {
            format!(
                "<option value='{}'{}>{} months</option>",
                n,
                if *n == selected { " selected" } else { "" },
                n
            )
        })
        .collect()
}

/// Totals cards plus the chart canvas and its init script
pub(crate) fn summary_fragment(view: &DashboardView) -> String {
    // Sheet labels end up inside a script tag.
    let chart_json = view.chart_data().to_chartjs().to_string().replace("</", "<\\/");
    let balance_class = if view.aggregate.balance < 0.0 { "text-red-700" } else { "text-indigo-700" };
    let fetched = view
        .fetched_at
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "-".to_string());
    let degraded = if view.degraded_cells > 0 {
        format!(" · {} cells could not be read and count as empty", view.degraded_cells)
    } else {
        String::new()
    };

    format!(
        r#"<div class='grid grid-cols-1 md:grid-cols-3 gap-4 mb-6'>
            <div class='bg-green-50 p-4 rounded-lg border border-green-200'><p class='text-sm text-green-600'>Income</p><p id='total-income' class='text-2xl font-bold text-green-700'>{}</p></div>
            <div class='bg-red-50 p-4 rounded-lg border border-red-200'><p class='text-sm text-red-600'>Expenses</p><p id='total-expense' class='text-2xl font-bold text-red-700'>{}</p></div>
            <div class='bg-indigo-50 p-4 rounded-lg border border-indigo-200'><p class='text-sm text-indigo-600'>Balance</p><p id='balance' class='text-2xl font-bold {}'>{}</p></div>
        </div>
        <div class='bg-white rounded-xl shadow-sm p-6'>
            <h3 class='text-lg font-semibold mb-4'>Monthly balance</h3>
            <canvas id='balance-chart' height='120'></canvas>
            <p class='text-xs text-gray-500 mt-4'>{} transactions · last {} of {} months · fetched {}{}</p>
        </div>
        <script>
        (function() {{
            var el = document.getElementById('balance-chart');
            if (!el || typeof Chart === 'undefined') {{ return; }}
            if (window.sheetdashChart) {{ window.sheetdashChart.destroy(); }}
            window.sheetdashChart = new Chart(el, {});
        }})();
        </script>"#,
        escape_html(&view.totals.income),
        escape_html(&view.totals.expense),
        balance_class,
        escape_html(&view.totals.balance),
        view.transaction_count,
        view.window.len(),
        view.aggregate.month_count(),
        fetched,
        degraded,
        chart_json
    )
}

/// Error message with its suggestions
pub(crate) fn error_banner(details: &ErrorDetails) -> String {
    let suggestions: String = details
        .suggestions
        .iter()
        .map(|s| format!("<li>{}</li>", escape_html(s)))
        .collect();
    format!(
        r#"<div class='bg-red-50 border border-red-200 text-red-700 p-4 rounded-lg mb-6'>
            <p class='font-semibold'>{}</p>
            <ul class='list-disc ml-6 text-sm mt-2'>{}</ul>
        </div>"#,
        escape_html(&details.message),
        suggestions
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheetdash_core::{CoreError, ErrorCode};

    #[test]
    fn test_range_options_include_custom_value() {
        let html = range_options(12);
        assert!(html.contains("<option value='12' selected>12 months</option>"));
        let custom = range_options(9);
        assert!(custom.contains("<option value='9' selected>9 months</option>"));
        assert!(custom.find("value='6'") < custom.find("value='9'"));
    }

    #[test]
    fn test_error_banner_escapes() {
        let details = CoreError::Transport { message: "<bad>".to_string() }.to_details();
        assert_eq!(details.code, ErrorCode::TransportError);
        let html = error_banner(&details);
        assert!(html.contains("&lt;bad&gt;"));
        assert!(html.contains("<li>"));
    }
}

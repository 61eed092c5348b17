//! Settings page rendering - Full page endpoints

use crate::AppState;
use axum::extract::State;
use axum::response::Html;
use sheetdash_utils::escape_html;

pub async fn page_settings(
    state: State<AppState>,
    headers: axum::http::HeaderMap,
) -> Html<String> {
    let config = &state.config;

    let (source_label, last_fetch) = {
        let dashboard = state.dashboard.read().await;
        let last_fetch = dashboard
            .cache()
            .fetched_at()
            .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_else(|| "never".to_string());
        (dashboard.source().describe(), last_fetch)
    };

    let timeout = if config.source.timeout_secs == 0 {
        "none".to_string()
    } else {
        format!("{} s", config.source.timeout_secs)
    };

    let inner_content = format!(
        r#"<div class='mb-6'><h2 class='text-2xl font-bold'>Settings</h2></div>
        <div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
            <h3 class='text-lg font-semibold mb-4'>Server</h3>
            <div class='grid grid-cols-3 gap-4 mb-4'>
                <div><p class='text-sm text-gray-500'>Host</p><p class='font-medium'>{}</p></div>
                <div><p class='text-sm text-gray-500'>Port</p><p class='font-medium'>{}</p></div>
                <div><p class='text-sm text-gray-500'>Login</p><p class='font-medium'>{}</p></div>
            </div>
        </div>
        <div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
            <h3 class='text-lg font-semibold mb-4'>Source</h3>
            <div class='grid grid-cols-2 gap-4 mb-4'>
                <div><p class='text-sm text-gray-500'>Reading from</p><p class='font-medium break-all'>{}</p></div>
                <div><p class='text-sm text-gray-500'>Read parameter</p><p class='font-medium'>{}=true</p></div>
                <div><p class='text-sm text-gray-500'>Timeout</p><p class='font-medium'>{}</p></div>
                <div><p class='text-sm text-gray-500'>Last fetch</p><p class='font-medium'>{}</p></div>
            </div>
        </div>
        <div class='bg-white rounded-xl shadow-sm p-6 mb-6'>
            <h3 class='text-lg font-semibold mb-4'>Display</h3>
            <div class='grid grid-cols-3 gap-4 mb-4'>
                <div><p class='text-sm text-gray-500'>Default range</p><p class='font-medium'>{} months</p></div>
                <div><p class='text-sm text-gray-500'>Chart type</p><p class='font-medium'>{}</p></div>
                <div><p class='text-sm text-gray-500'>Axis starts at zero</p><p class='font-medium'>{}</p></div>
            </div>
        </div>
        <div class='bg-white rounded-xl shadow-sm p-6'>
            <h3 class='text-lg font-semibold mb-4'>Currency</h3>
            <div class='grid grid-cols-3 gap-4'>
                <div><p class='text-sm text-gray-500'>Currency</p><p class='font-medium'>{}</p></div>
                <div><p class='text-sm text-gray-500'>Sample</p><p class='font-medium'>{}</p></div>
                <div><p class='text-sm text-gray-500'>Decimal places</p><p class='font-medium'>{}</p></div>
            </div>
        </div>"#,
        escape_html(&config.server.host),
        config.server.port,
        if config.auth_enabled() { "Required" } else { "Off" },
        escape_html(&source_label),
        escape_html(&config.source.read_param),
        timeout,
        last_fetch,
        config.dashboard.default_range,
        config.charts.default_chart_type,
        if config.charts.begin_at_zero { "Yes" } else { "No" },
        escape_html(&config.currency.default_currency),
        escape_html(&sheetdash_core::money_format(&config.currency).format(-1234.5)),
        config.currency.decimal_places
    );

    Html(crate::page_response(&headers, config, "Settings", "/settings", &inner_content))
}

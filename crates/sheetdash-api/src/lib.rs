//! HTTP dashboard server with HTMX support
//!
//! Routes are organized into modules:
//! - routes::dashboard: Totals, monthly chart, refresh and cache control
//! - routes::session: Login form and the session gate
//! - routes::settings: Configuration display

pub mod error;
pub mod routes;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use sheetdash_config::Config;
use sheetdash_core::Dashboard;
use sheetdash_utils::escape_html;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{Mutex, RwLock};

pub use error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub dashboard: Arc<RwLock<Dashboard>>,
    pub config: Config,
    /// Held for the duration of a fetch; a second refresh is rejected
    pub refresh_gate: Arc<Mutex<()>>,
    /// Value the `logged` cookie must carry, fresh for every process
    pub session_token: Arc<String>,
}

impl AppState {
    pub fn new(config: Config, dashboard: Arc<RwLock<Dashboard>>) -> Self {
        Self {
            dashboard,
            config,
            refresh_gate: Arc::new(Mutex::new(())),
            session_token: Arc::new(sheetdash_utils::generate_session_token()),
        }
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::dashboard::{
        api_chart, api_invalidate, api_refresh, api_summary, htmx_refresh, htmx_summary,
        page_dashboard,
    };
    use routes::session::{login_form, login_submit, logout, require_session};
    use routes::settings::{api_settings, page_settings};

    let protected = Router::new()
        // API endpoints
        .route("/api/summary", get(api_summary))
        .route("/api/chart", get(api_chart))
        .route("/api/refresh", post(api_refresh))
        .route("/api/cache", delete(api_invalidate))
        .route("/api/settings", get(api_settings))
        // HTMX page routes
        .route("/", get(page_dashboard))
        .route("/dashboard", get(page_dashboard))
        .route("/settings", get(page_settings))
        // HTMX partial routes
        .route("/dashboard/summary", get(htmx_summary))
        .route("/dashboard/refresh", post(htmx_refresh))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_session));

    Router::new()
        .route("/api/health", get(health_check))
        .route("/login", get(login_form).post(login_submit))
        .route("/logout", get(logout))
        .merge(protected)
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

// ==================== Template Functions ====================

/// Base HTML template
pub fn base_html(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{}</title>
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>
    <script src="https://cdn.jsdelivr.net/npm/chart.js@4.4.1/dist/chart.umd.min.js"></script>
    <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/tailwindcss@2.2.19/dist/tailwind.min.css">
    <style>
        .htmx-indicator {{ opacity: 0; transition: opacity 0.3s; }}
        .htmx-request .htmx-indicator {{ opacity: 1; }}
        .htmx-request.htmx-indicator {{ opacity: 1; }}
    </style>
</head>
<body class="bg-gray-50 text-gray-900">
    {}
</body>
</html>"#,
        escape_html(title),
        content
    )
}

/// Navigation sidebar
pub fn nav_sidebar(current_path: &str, app_title: &str, show_logout: bool) -> String {
    let mut links = vec![("/", "Dashboard", "dashboard"), ("/settings", "Settings", "settings")];
    if show_logout {
        links.push(("/logout", "Log out", "logout"));
    }

    let mut nav = format!(
        "<div class='bg-white border-r h-screen flex flex-col'><div class='p-4 border-b'><h1 class='text-xl font-bold text-indigo-600'>{}</h1></div><ul class='flex-1 py-2 space-y-1 px-2'>",
        escape_html(app_title)
    );

    for (path, label, id) in &links {
        let is_active = match *path {
            "/" => current_path == "/" || current_path.starts_with("/dashboard"),
            _ => current_path.starts_with(path),
        };
        let active_class = if is_active { "bg-indigo-50 text-indigo-600" } else { "text-gray-600 hover:bg-gray-50" };
        let icon = match *id {
            "dashboard" => "📊",
            "settings" => "⚙️",
            "logout" => "🚪",
            _ => "📄",
        };
        nav.push_str(&format!(
            r#"<li><a href='{}' class='flex items-center gap-2 px-3 py-2 rounded-lg {}'>{}<span>{}</span></a></li>"#,
            path, active_class, icon, label
        ));
    }
    nav.push_str("</ul></div>");
    nav
}

/// Check if request is from HTMX (partial page update)
pub(crate) fn is_htmx_request(headers: &axum::http::HeaderMap) -> bool {
    headers.get("hx-request").is_some()
}

/// Wrap content for full page or HTMX partial
pub fn page_response(
    headers: &axum::http::HeaderMap,
    config: &Config,
    title: &str,
    current_path: &str,
    inner_content: &str,
) -> String {
    if is_htmx_request(headers) {
        // HTMX partial - just the content area
        format!(
            r#"<main class='flex-1 overflow-auto bg-gray-50 p-6'>{}</main>"#,
            inner_content
        )
    } else {
        let page_title = format!("{} - {}", title, config.dashboard.title);
        base_html(&page_title, &format!(r#"<div class='flex flex-col h-screen'>
    <div class='flex flex-1 overflow-hidden'>
        <aside class='w-64 flex-shrink-0'>{}</aside>
        <main class='flex-1 overflow-auto bg-gray-50 p-6'>{}</main>
    </div>
</div>"#,
            nav_sidebar(current_path, &config.dashboard.title, config.auth_enabled()), inner_content))
    }
}

/// Start the HTTP server
///
/// Binds to the configured address and serves until Ctrl-C.
pub async fn start_server(config: Config, dashboard: Arc<RwLock<Dashboard>>) -> std::io::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, dashboard);
    let auth = state.config.auth_enabled();

    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting sheetdash server on http://{}", addr);
    log::info!("Available routes:");
    log::info!("  - / (Dashboard)");
    log::info!("  - /settings (Configuration)");
    log::info!("  - /api/* (JSON API endpoints)");
    if auth {
        log::info!("  - /login, /logout (Session)");
    }

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::info!("Server stopped gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to install Ctrl-C handler: {}", e);
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use sheetdash_config::AuthConfig;
    use sheetdash_core::StaticRowSource;
    use tower::ServiceExt;

    fn sample_rows() -> Vec<Vec<Value>> {
        serde_json::from_value(json!([
            ["Timestamp", "Tipo", "Categoria", "Monto", "Desc", "Fecha"],
            ["t1", "Ingreso", "Salary", "1000", "", "2024-01-15"],
            ["t2", "Gasto", "Food", "250", "", "2024-01-20"],
            ["t3", "Ingreso", "Bonus", "abc", "", "2024-02-01"]
        ]))
        .unwrap()
    }

    fn state_with(config: Config) -> AppState {
        let source = Arc::new(StaticRowSource::new(sample_rows()));
        let dashboard = Dashboard::new(config.clone(), source);
        AppState::new(config, Arc::new(RwLock::new(dashboard)))
    }

    fn auth_config() -> Config {
        let mut config = Config::default();
        config.server.auth = Some(AuthConfig {
            username: "admin".to_string(),
            password: "secret".to_string(),
        });
        config
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, String) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, _, body) = send(create_router(state_with(Config::default())), get("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }

    #[tokio::test]
    async fn test_summary_loads_on_first_request() {
        let (status, _, body) = send(create_router(state_with(Config::default())), get("/api/summary")).await;
        assert_eq!(status, StatusCode::OK);
        let summary: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(summary["balance"], 750.0);
        assert_eq!(summary["formatted"]["balance"], "$750.00");
        assert_eq!(summary["labels"], json!(["2024-01", "2024-02"]));
        assert_eq!(summary["range"], 12);
    }

    #[tokio::test]
    async fn test_chart_respects_range() {
        let (status, _, body) = send(create_router(state_with(Config::default())), get("/api/chart?range=1")).await;
        assert_eq!(status, StatusCode::OK);
        let chart: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(chart["labels"], json!(["2024-02"]));
        assert_eq!(chart["datasets"][0]["label"], "Monthly balance (MXN)");
    }

    #[tokio::test]
    async fn test_refresh_and_invalidate() {
        let state = state_with(Config::default());
        let request = Request::builder().method("POST").uri("/api/refresh").body(Body::empty()).unwrap();
        let (status, _, body) = send(create_router(state.clone()), request).await;
        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["rows"], 4);

        let request = Request::builder().method("DELETE").uri("/api/cache").body(Body::empty()).unwrap();
        let (status, _, body) = send(create_router(state.clone()), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(serde_json::from_str::<Value>(&body).unwrap()["evicted"], true);
        assert!(state.dashboard.read().await.cache().is_empty());
    }

    #[tokio::test]
    async fn test_refresh_rejected_while_in_flight() {
        let state = state_with(Config::default());
        let _held = state.refresh_gate.lock().await;
        let request = Request::builder().method("POST").uri("/api/refresh").body(Body::empty()).unwrap();
        let (status, _, body) = send(create_router(state.clone()), request).await;
        assert_eq!(status, StatusCode::CONFLICT);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], "FETCH_IN_PROGRESS");
    }

    #[tokio::test]
    async fn test_dashboard_page_renders_totals() {
        let (status, _, body) = send(create_router(state_with(Config::default())), get("/dashboard?range=6")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<!DOCTYPE html>"));
        assert!(body.contains("$1,000.00"));
        assert!(body.contains("$250.00"));
        assert!(body.contains("$750.00"));
        assert!(body.contains("balance-chart"));
    }

    #[tokio::test]
    async fn test_summary_partial_for_htmx() {
        let request = Request::builder()
            .uri("/dashboard/summary?range=1")
            .header("HX-Request", "true")
            .body(Body::empty())
            .unwrap();
        let (status, _, body) = send(create_router(state_with(Config::default())), request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body.contains("<!DOCTYPE html>"));
        assert!(body.contains("\"2024-02\""));
        assert!(!body.contains("\"2024-01\""));
    }

    #[tokio::test]
    async fn test_htmx_refresh_uses_form_range() {
        let request = Request::builder()
            .method("POST")
            .uri("/dashboard/refresh")
            .header("HX-Request", "true")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("range=1"))
            .unwrap();
        let (status, _, body) = send(create_router(state_with(Config::default())), request).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("$750.00"));
        assert!(body.contains("\"2024-02\""));
        assert!(!body.contains("\"2024-01\""));
    }

    #[tokio::test]
    async fn test_settings_redacts_password() {
        let state = state_with(auth_config());
        let request = Request::builder()
            .uri("/api/settings")
            .header(header::COOKIE, format!("logged={}", state.session_token))
            .body(Body::empty())
            .unwrap();
        let (status, _, body) = send(create_router(state), request).await;
        assert_eq!(status, StatusCode::OK);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["server"]["auth"]["username"], "admin");
        assert_eq!(json["server"]["auth"]["password"], "********");
        assert!(!body.contains("secret"));
    }

    #[tokio::test]
    async fn test_gate_redirects_pages_and_rejects_api() {
        let state = state_with(auth_config());

        let (status, headers, _) = send(create_router(state.clone()), get("/dashboard")).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(headers[header::LOCATION], "/login?next=%2Fdashboard");

        let (status, _, _) = send(create_router(state.clone()), get("/api/summary")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let request = Request::builder()
            .uri("/api/summary")
            .header(header::COOKIE, "logged=yes")
            .body(Body::empty())
            .unwrap();
        let (status, _, _) = send(create_router(state.clone()), request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _, _) = send(create_router(state), get("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_login_sets_cookie_and_logout_clears_it() {
        let state = state_with(auth_config());

        let request = Request::builder()
            .method("POST")
            .uri("/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("username=admin&password=wrong"))
            .unwrap();
        let (status, headers, body) = send(create_router(state.clone()), request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(headers.get(header::SET_COOKIE).is_none());
        assert!(body.contains("Invalid username or password"));

        let request = Request::builder()
            .method("POST")
            .uri("/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("username=admin&password=secret&next=%2Fsettings"))
            .unwrap();
        let (status, headers, _) = send(create_router(state.clone()), request).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(headers[header::LOCATION], "/settings");
        let cookie = headers[header::SET_COOKIE].to_str().unwrap().to_string();
        assert!(cookie.starts_with(&format!("logged={};", state.session_token)));

        let request = Request::builder()
            .uri("/dashboard")
            .header(header::COOKIE, format!("theme=dark; logged={}", state.session_token))
            .body(Body::empty())
            .unwrap();
        let (status, _, _) = send(create_router(state.clone()), request).await;
        assert_eq!(status, StatusCode::OK);

        let (status, headers, _) = send(create_router(state), get("/logout")).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(headers[header::LOCATION], "/login");
        assert!(headers[header::SET_COOKIE].to_str().unwrap().contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn test_open_dashboard_without_auth() {
        let state = state_with(Config::default());
        let (status, headers, _) = send(create_router(state.clone()), get("/login")).await;
        assert_eq!(status, StatusCode::SEE_OTHER);
        assert_eq!(headers[header::LOCATION], "/");

        let (status, _, body) = send(create_router(state), get("/settings")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!body.contains("Log out"));
    }

    #[test]
    fn test_page_response_partial() {
        let mut headers = axum::http::HeaderMap::new();
        let config = Config::default();
        let full = page_response(&headers, &config, "Dashboard", "/", "<p>x</p>");
        assert!(full.contains("<title>Dashboard - Sheetdash</title>"));
        headers.insert("hx-request", "true".parse().unwrap());
        let partial = page_response(&headers, &config, "Dashboard", "/", "<p>x</p>");
        assert!(!partial.contains("<html"));
        assert!(partial.contains("<p>x</p>"));
    }
}

//! Login and logout pages

use super::SESSION_COOKIE;
use crate::AppState;
use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;
use sheetdash_utils::escape_html;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

/// Only same-site absolute paths are followed after login
fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path)
            if path.starts_with('/')
                && !path.contains('\\')
                && !path[1..].starts_with('/') =>
        {
            path
        }
        _ => "/",
    }
}

fn login_page(title: &str, next: &str, error: Option<&str>) -> String {
    let error_html = error
        .map(|e| format!("<p class='text-sm text-red-600 mb-4'>{}</p>", escape_html(e)))
        .unwrap_or_default();

    crate::base_html(
        &format!("Log in - {}", title),
        &format!(
            r#"<div class='min-h-screen flex items-center justify-center'>
    <form method='post' action='/login' class='bg-white rounded-xl shadow-sm p-8 w-80'>
        <h1 class='text-xl font-bold text-indigo-600 mb-6'>{}</h1>
        {}
        <input type='hidden' name='next' value='{}'>
        <label class='block text-sm text-gray-600 mb-1' for='username'>Username</label>
        <input id='username' name='username' class='w-full border rounded-lg px-3 py-2 mb-4' autocomplete='username' required>
        <label class='block text-sm text-gray-600 mb-1' for='password'>Password</label>
        <input id='password' name='password' type='password' class='w-full border rounded-lg px-3 py-2 mb-6' autocomplete='current-password' required>
        <button class='w-full px-4 py-2 bg-indigo-600 text-white rounded-lg hover:bg-indigo-700'>Log in</button>
    </form>
</div>"#,
            escape_html(title),
            error_html,
            escape_html(next)
        ),
    )
}

/// Login form
pub async fn login_form(
    state: State<AppState>,
    headers: HeaderMap,
    params: Query<HashMap<String, String>>,
) -> Response {
    let next = safe_next(params.get("next").map(String::as_str));
    if super::gate::is_authorized(&state, &headers) {
        return Redirect::to(next).into_response();
    }
    Html(login_page(&state.config.dashboard.title, next, None)).into_response()
}

/// Check credentials and start a session
pub async fn login_submit(state: State<AppState>, form: Form<LoginForm>) -> Response {
    let next = safe_next(form.next.as_deref()).to_string();

    let Some(auth) = &state.config.server.auth else {
        return Redirect::to(&next).into_response();
    };

    if form.username != auth.username || form.password != auth.password {
        log::warn!(target: "sheetdash::session", "Failed login for user '{}'", form.username);
        let page = login_page(&state.config.dashboard.title, &next, Some("Invalid username or password"));
        return (StatusCode::UNAUTHORIZED, Html(page)).into_response();
    }

    log::info!(target: "sheetdash::session", "User '{}' logged in", form.username);
    let cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax",
        SESSION_COOKIE,
        urlencoding::encode(&state.session_token)
    );
    ([(header::SET_COOKIE, cookie)], Redirect::to(&next)).into_response()
}

/// End the session
pub async fn logout() -> Response {
    let cookie = format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE);
    ([(header::SET_COOKIE, cookie)], Redirect::to("/login")).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next(Some("/settings")), "/settings");
        assert_eq!(safe_next(Some("//evil.example.com")), "/");
        assert_eq!(safe_next(Some("https://evil.example.com")), "/");
        assert_eq!(safe_next(Some("/\\evil.example.com")), "/");
        assert_eq!(safe_next(Some("/settings\\..")), "/");
        assert_eq!(safe_next(Some("/dashboard?range=6")), "/dashboard?range=6");
        assert_eq!(safe_next(None), "/");
    }

    #[test]
    fn test_login_page_escapes_next() {
        let html = login_page("Sheetdash", "/x'><script>", Some("nope"));
        assert!(html.contains("/x&#39;&gt;&lt;script&gt;"));
        assert!(html.contains("nope"));
    }
}

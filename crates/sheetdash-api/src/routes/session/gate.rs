//! Session gate middleware

use super::SESSION_COOKIE;
use crate::{ApiError, AppState};
use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

/// Value of the session cookie, if the request carries one
pub fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| urlencoding::decode(value).ok())
        .map(|value| value.into_owned())
}

/// Whether the request holds a valid session, or no session is needed
pub(crate) fn is_authorized(state: &AppState, headers: &HeaderMap) -> bool {
    if !state.config.auth_enabled() {
        return true;
    }
    session_cookie(headers).as_deref() == Some(state.session_token.as_str())
}

/// Pages redirect to the login form; API calls get 401
pub async fn require_session(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if is_authorized(&state, request.headers()) {
        return next.run(request).await;
    }

    let path = request.uri().path().to_string();
    log::debug!(target: "sheetdash::session", "Rejected unauthenticated request to {}", path);

    if path.starts_with("/api/") {
        ApiError::Unauthorized.into_response()
    } else {
        Redirect::to(&format!("/login?next={}", urlencoding::encode(&path))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_session_cookie_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_cookie(&headers), None);

        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; logged=abc123"));
        assert_eq!(session_cookie(&headers).as_deref(), Some("abc123"));

        headers.insert(header::COOKIE, HeaderValue::from_static("notlogged=x;logged=a%20b"));
        assert_eq!(session_cookie(&headers).as_deref(), Some("a b"));

        headers.insert(header::COOKIE, HeaderValue::from_static("loggedin=yes"));
        assert_eq!(session_cookie(&headers), None);
    }

    #[test]
    fn test_multiple_cookie_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("a=1"));
        headers.append(header::COOKIE, HeaderValue::from_static("logged=t"));
        assert_eq!(session_cookie(&headers).as_deref(), Some("t"));
    }
}

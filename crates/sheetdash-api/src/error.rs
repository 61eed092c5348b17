//! Error types for sheetdash-api

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use sheetdash_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Core(error) => match error {
                CoreError::Transport { .. } | CoreError::Format { .. } => StatusCode::BAD_GATEWAY,
                CoreError::NotLoaded => StatusCode::SERVICE_UNAVAILABLE,
                CoreError::FetchInProgress => StatusCode::CONFLICT,
                CoreError::Config { .. } | CoreError::Internal { .. } => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error = match &self {
            ApiError::Core(core) => serde_json::to_value(core.to_details()).unwrap_or_default(),
            other => serde_json::json!({ "message": other.to_string() }),
        };
        let body = serde_json::json!({ "success": false, "error": error });
        (self.status(), Json(body)).into_response()
    }
}

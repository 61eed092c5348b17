//! Error types for sheetdash-core
//!
//! Fetch failures are hard errors that abort a render cycle. Cell-level
//! problems are not errors at all; the parser degrades them to defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Network or HTTP failure talking to the endpoint
    TransportError,
    /// Response body is not a JSON array of rows
    FormatError,
    /// No rows cached yet
    NotLoaded,
    /// Another fetch is still running
    FetchInProgress,
    /// Configuration error
    ConfigError,
    /// Internal error
    InternalError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::TransportError => write!(f, "TRANSPORT_ERROR"),
            ErrorCode::FormatError => write!(f, "FORMAT_ERROR"),
            ErrorCode::NotLoaded => write!(f, "NOT_LOADED"),
            ErrorCode::FetchInProgress => write!(f, "FETCH_IN_PROGRESS"),
            ErrorCode::ConfigError => write!(f, "CONFIG_ERROR"),
            ErrorCode::InternalError => write!(f, "INTERNAL_ERROR"),
        }
    }
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Suggestions for resolution
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

impl ErrorSeverity {
    /// Log level used when an error of this severity is reported
    pub fn log_level(&self) -> log::Level {
        match self {
            ErrorSeverity::Info => log::Level::Info,
            ErrorSeverity::Warning => log::Level::Warn,
            ErrorSeverity::Error | ErrorSeverity::Critical => log::Level::Error,
        }
    }
}

/// Main error type for sheetdash-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Format error: {message}")]
    Format { message: String },

    #[error("No data loaded yet")]
    NotLoaded,

    #[error("A fetch is already in progress")]
    FetchInProgress,

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CoreError {
    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::Transport { .. } => ErrorCode::TransportError,
            CoreError::Format { .. } => ErrorCode::FormatError,
            CoreError::NotLoaded => ErrorCode::NotLoaded,
            CoreError::FetchInProgress => ErrorCode::FetchInProgress,
            CoreError::Config { .. } => ErrorCode::ConfigError,
            CoreError::Internal { .. } => ErrorCode::InternalError,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::Transport { .. } => ErrorSeverity::Error,
            CoreError::Format { .. } => ErrorSeverity::Error,
            CoreError::NotLoaded => ErrorSeverity::Warning,
            CoreError::FetchInProgress => ErrorSeverity::Info,
            CoreError::Config { .. } => ErrorSeverity::Critical,
            CoreError::Internal { .. } => ErrorSeverity::Critical,
        }
    }

    /// Whether the failure came from the remote read
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, CoreError::Transport { .. } | CoreError::Format { .. })
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::Transport { message } => {
                details = details
                    .with_detail(serde_json::json!({ "transport_message": message }))
                    .with_suggestion("Check that source.endpoint is reachable from this host.".to_string())
                    .with_suggestion("Try the refresh button again once the network is back.".to_string());
            }
            CoreError::Format { message } => {
                details = details
                    .with_detail(serde_json::json!({ "decode_message": message }))
                    .with_suggestion(
                        "Open the endpoint URL in a browser and confirm it returns a JSON array of rows."
                            .to_string(),
                    )
                    .with_suggestion(
                        "Check that the spreadsheet web app is deployed with anonymous access."
                            .to_string(),
                    );
            }
            CoreError::NotLoaded => {
                details = details.with_suggestion("Trigger a refresh to fetch the rows.".to_string());
            }
            CoreError::FetchInProgress => {
                details = details.with_suggestion("Wait for the running refresh to finish.".to_string());
            }
            _ => {}
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl From<reqwest::Error> for CoreError {
    fn from(error: reqwest::Error) -> Self {
        CoreError::Transport {
            message: error.to_string(),
        }
    }
}

/// Error context for reporting
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Operation being performed
    pub operation: String,
    /// Additional context data
    pub data: serde_json::Value,
}

impl ErrorContext {
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            data: serde_json::json!({}),
        }
    }

    pub fn with_data(mut self, key: &str, value: serde_json::Value) -> Self {
        self.data[key] = value;
        self
    }
}

/// Error logger trait
pub trait ErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext);
}

/// Default error logger using log crate
#[derive(Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        log::log!(
            target: "sheetdash::error",
            error.severity().log_level(),
            "{} [{}] {} - Operation: {} - Context: {}",
            error.severity(),
            error.code(),
            error,
            context.operation,
            context.data
        );
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::TransportError.to_string(), "TRANSPORT_ERROR");
        assert_eq!(ErrorCode::FormatError.to_string(), "FORMAT_ERROR");
        assert_eq!(ErrorCode::FetchInProgress.to_string(), "FETCH_IN_PROGRESS");
    }

    #[test]
    fn test_core_error_code_and_severity() {
        let error = CoreError::Transport { message: "refused".to_string() };
        assert_eq!(error.code(), ErrorCode::TransportError);
        assert_eq!(error.severity(), ErrorSeverity::Error);
        assert!(error.is_fetch_failure());

        let error = CoreError::NotLoaded;
        assert_eq!(error.severity(), ErrorSeverity::Warning);
        assert!(!error.is_fetch_failure());

        let error = CoreError::Config { message: "bad".to_string() };
        assert_eq!(error.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_severity_log_level() {
        assert_eq!(CoreError::FetchInProgress.severity().log_level(), log::Level::Info);
        assert_eq!(CoreError::NotLoaded.severity().log_level(), log::Level::Warn);
        let error = CoreError::Transport { message: "refused".to_string() };
        assert_eq!(error.severity().log_level(), log::Level::Error);
    }

    #[test]
    fn test_format_error_details() {
        let error = CoreError::Format { message: "expected value at line 1".to_string() };
        let details = error.to_details();
        assert_eq!(details.code, ErrorCode::FormatError);
        assert!(details.details.is_some());
        assert_eq!(details.suggestions.len(), 2);
        assert!(details.to_string().starts_with("[FORMAT_ERROR]"));
    }

    #[test]
    fn test_error_details_serialization_skips_empty() {
        let details = ErrorDetails::new(ErrorCode::InternalError, "boom".to_string());
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["code"], "INTERNAL_ERROR");
        assert!(json.get("details").is_none());
        assert!(json.get("suggestions").is_none());
    }

    #[test]
    fn test_error_context() {
        let context = ErrorContext::new("fetch_rows")
            .with_data("source", serde_json::json!("https://example.com"));
        assert_eq!(context.operation, "fetch_rows");
        assert_eq!(context.data["source"], "https://example.com");
    }
}

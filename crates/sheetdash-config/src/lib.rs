//! Configuration management for sheetdash
//!
//! This module handles loading, validation, and management of
//! sheetdash configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use error::{ConfigError, ConfigResult};

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Login credentials; when absent the dashboard is open
    #[serde(default)]
    pub auth: Option<AuthConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            auth: None,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8081
}

/// Login credentials for the session gate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
}

/// Remote spreadsheet endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Endpoint URL. Empty means demo mode with built-in rows.
    #[serde(default)]
    pub endpoint: String,
    /// Query flag that asks the endpoint for a read
    #[serde(default = "default_read_param")]
    pub read_param: String,
    /// Request timeout in seconds (0 disables the deadline)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            read_param: default_read_param(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_read_param() -> String {
    "read".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Dashboard display settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Page title
    #[serde(default = "default_title")]
    pub title: String,
    /// Number of trailing months shown in the chart
    #[serde(default = "default_range")]
    pub default_range: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            default_range: default_range(),
        }
    }
}

fn default_title() -> String {
    "Sheetdash".to_string()
}

/// Months shown when no valid range is requested
pub const DEFAULT_RANGE: usize = 12;

fn default_range() -> usize {
    DEFAULT_RANGE
}

fn default_true() -> bool {
    true
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level used when RUST_LOG is unset: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Chart and visualization settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Default chart type
    #[serde(default = "default_chart_type")]
    pub default_chart_type: ChartType,
    /// Show chart legends
    #[serde(default = "default_true")]
    pub show_legend: bool,
    /// Anchor the value axis at zero
    #[serde(default = "default_true")]
    pub begin_at_zero: bool,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            default_chart_type: ChartType::Bar,
            show_legend: true,
            begin_at_zero: true,
        }
    }
}

fn default_chart_type() -> ChartType {
    ChartType::Bar
}

/// Chart type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Bar,
    Line,
}

impl std::fmt::Display for ChartType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChartType::Bar => write!(f, "bar"),
            ChartType::Line => write!(f, "line"),
        }
    }
}

/// Currency and number formatting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConfig {
    /// Currency code shown in the chart legend
    #[serde(default = "default_currency")]
    pub default_currency: String,
    /// Symbol attached to formatted amounts
    #[serde(default = "default_symbol")]
    pub symbol: String,
    /// Number of decimal places
    #[serde(default = "default_decimal_places")]
    pub decimal_places: u32,
    /// Thousands separator
    #[serde(default = "default_thousands_sep")]
    pub thousands_separator: String,
    /// Decimal separator
    #[serde(default = "default_decimal_sep")]
    pub decimal_separator: String,
    /// Currency symbol position ("before" or "after")
    #[serde(default)]
    pub symbol_position: SymbolPosition,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            default_currency: default_currency(),
            symbol: default_symbol(),
            decimal_places: default_decimal_places(),
            thousands_separator: default_thousands_sep(),
            decimal_separator: default_decimal_sep(),
            symbol_position: SymbolPosition::Before,
        }
    }
}

fn default_currency() -> String {
    "MXN".to_string()
}

fn default_symbol() -> String {
    "$".to_string()
}

fn default_decimal_places() -> u32 {
    2
}

fn default_thousands_sep() -> String {
    ",".to_string()
}

fn default_decimal_sep() -> String {
    ".".to_string()
}

/// Currency symbol position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SymbolPosition {
    #[default]
    Before,
    After,
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub charts: ChartConfig,
    #[serde(default)]
    pub currency: CurrencyConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: PathBuf) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| {
            let path = path.to_string_lossy().to_string();
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound { path }
            } else {
                ConfigError::IoError { path }
            }
        })?;

        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::InvalidYaml { message: e.to_string() })?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if let Some(auth) = &self.server.auth {
            if auth.username.is_empty() || auth.password.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "server.auth".to_string(),
                    reason: "Username and password must both be set".to_string(),
                });
            }
        }

        let endpoint = self.source.endpoint.trim();
        if !endpoint.is_empty()
            && !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(ConfigError::InvalidValue {
                field: "source.endpoint".to_string(),
                reason: "Endpoint must be an http:// or https:// URL".to_string(),
            });
        }

        if self.source.read_param.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "source.read_param".to_string(),
                reason: "Read parameter must not be empty".to_string(),
            });
        }

        if self.dashboard.default_range == 0 {
            return Err(ConfigError::InvalidValue {
                field: "dashboard.default_range".to_string(),
                reason: "Default range must be at least 1 month".to_string(),
            });
        }

        if self.currency.decimal_places > 10 {
            return Err(ConfigError::InvalidValue {
                field: "currency.decimal_places".to_string(),
                reason: "Decimal places must be between 0 and 10".to_string(),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Whether the dashboard runs on built-in demo rows
    pub fn is_demo(&self) -> bool {
        self.source.endpoint.trim().is_empty()
    }

    /// Whether the session gate is active
    pub fn auth_enabled(&self) -> bool {
        self.server.auth.is_some()
    }
}

// ==================== Tests ====================

//! Settings routes - Configuration display

pub mod api;
pub mod page;

pub use api::api_settings;
pub use page::page_settings;

use sheetdash_config::Config;

/// Config as JSON with the login password masked
pub(crate) fn redacted_config(config: &Config) -> serde_json::Value {
    let mut value = serde_json::to_value(config).unwrap_or_default();
    if let Some(password) = value
        .get_mut("server")
        .and_then(|s| s.get_mut("auth"))
        .and_then(|a| a.get_mut("password"))
    {
        *password = serde_json::json!("********");
    }
    value
}

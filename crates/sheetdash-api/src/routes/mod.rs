//! Route modules for the API server
//!
//! - dashboard: Totals, chart, refresh and cache control
//! - session: Login, logout and the session gate
//! - settings: Settings page
//!
//! Each module follows a consistent structure:
//! - mod.rs: Module declaration and exports
//! - api.rs: JSON API endpoints
//! - page.rs: HTMX page rendering

pub mod dashboard;
pub mod session;
pub mod settings;

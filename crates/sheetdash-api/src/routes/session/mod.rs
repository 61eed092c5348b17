//! Session routes - Login form, logout and the gate in front of everything else
//!
//! The gate is active only when `server.auth` is configured. A session is the
//! `logged` cookie carrying the per-process token from [`AppState`](crate::AppState).

pub mod gate;
pub mod page;

pub use gate::{require_session, session_cookie};
pub use page::{login_form, login_submit, logout};

/// Cookie that marks a logged-in browser
pub const SESSION_COOKIE: &str = "logged";

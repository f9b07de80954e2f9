//! CLI-specific error formatting for user-facing messages.

use crate::auth::AuthError;
use crate::error::TraktError;

/// Map a [`TraktError`] to a user-facing help string with actionable guidance.
pub fn format_error_help(err: &TraktError) -> String {
    match err {
        TraktError::Configuration(msg) => {
            format!("Configuration error: {msg}. Check your .env or config file.")
        }
        TraktError::Authentication(AuthError::RefreshFailed(msg)) => {
            format!("Token refresh failed: {msg}. The stored credential was removed; run: trakt-backup auth login")
        }
        TraktError::Authentication(AuthError::Cancelled) => "Authorization cancelled.".to_string(),
        TraktError::Authentication(auth) => {
            format!("Authentication failed: {auth}. Run: trakt-backup auth login")
        }
        TraktError::Api { status: 401 | 403, url } => {
            format!("Access token rejected for {url}. Run: trakt-backup auth reset")
        }
        other => format!("{other}"),
    }
}

//! Error types for trakt-backup.

use thiserror::Error;

use crate::auth::AuthError;

/// Primary error type for all trakt-backup operations.
#[derive(Error, Debug)]
pub enum TraktError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Authentication error: {0}")]
    Authentication(#[from] AuthError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("API returned status {status} for {url}")]
    Api { status: u16, url: String },

    #[error("Page {page} of {url} is not a JSON array: {message}")]
    PageParse {
        url: String,
        page: u32,
        message: String,
    },

    #[error("Invalid list entry: {0}")]
    InvalidList(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl TraktError {
    pub fn page_parse(url: impl Into<String>, page: u32, message: impl Into<String>) -> Self {
        Self::PageParse {
            url: url.into(),
            page,
            message: message.into(),
        }
    }

    /// Whether this error must abort the whole backup run.
    ///
    /// Without credentials or a usable configuration nothing can be fetched;
    /// a single resource failing to download or parse only loses that
    /// resource.
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Configuration(_) | Self::Authentication(_) => true,
            // The access token was rejected; every following request would be too.
            Self::Api { status, .. } => matches!(status, 401 | 403),
            _ => false,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, TraktError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_and_config_errors_are_fatal() {
        assert!(TraktError::Configuration("missing client id".into()).is_fatal());
        assert!(TraktError::Authentication(AuthError::AuthorizationExpired { waited_secs: 600 })
            .is_fatal());
    }

    #[test]
    fn per_resource_errors_are_not_fatal() {
        assert!(!TraktError::page_parse("https://api.trakt.tv/users/me/history", 2, "eof").is_fatal());
        assert!(!TraktError::Storage("disk full".into()).is_fatal());
        assert!(!TraktError::InvalidList("missing slug".into()).is_fatal());
        assert!(!TraktError::Api {
            status: 404,
            url: "https://api.trakt.tv/users/me/lists/gone/items".into()
        }
        .is_fatal());
    }

    #[test]
    fn rejected_token_is_fatal() {
        let err = TraktError::Api {
            status: 401,
            url: "https://api.trakt.tv/users/me/history".into(),
        };
        assert!(err.is_fatal());
    }

    #[test]
    fn page_parse_message_names_page_and_url() {
        let err = TraktError::page_parse("https://api.trakt.tv/users/me/history", 3, "eof");
        let text = err.to_string();
        assert!(text.contains("Page 3"));
        assert!(text.contains("/users/me/history"));
    }
}

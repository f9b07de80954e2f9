use thiserror::Error;

/// Failures of the device-code, refresh and token-storage flows.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authorization denied (status {status})")]
    AuthorizationDenied { status: u16 },
    #[error("Authorization expired after {waited_secs}s without approval; run the login again")]
    AuthorizationExpired { waited_secs: u64 },
    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),
    #[error("Authorization cancelled")]
    Cancelled,
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<reqwest::Error> for AuthError {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(error.to_string())
    }
}

impl From<std::io::Error> for AuthError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<toml::de::Error> for AuthError {
    fn from(error: toml::de::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<toml::ser::Error> for AuthError {
    fn from(error: toml::ser::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

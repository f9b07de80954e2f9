//! OAuth application identity.

use std::fmt;

/// Client id and secret of the registered Trakt application.
///
/// The id doubles as the `trakt-api-key` header on resource requests.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub client_id: String,
    pub client_secret: String,
}

impl ClientConfig {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_secret() {
        let client = ClientConfig::new("id-123", "very-secret");
        let debug = format!("{client:?}");
        assert!(debug.contains("id-123"));
        assert!(!debug.contains("very-secret"));
    }
}

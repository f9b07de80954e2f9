use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OAuth credential persisted between runs.
///
/// `expires_at` is the absolute unix time (seconds) after which the access
/// token must not be used. The three fields are always replaced together.
///
/// # Example
/// ```no_run
/// use trakt_backup::auth::Credential;
///
/// let credential = Credential {
///     access_token: "access".to_string(),
///     refresh_token: "refresh".to_string(),
///     expires_at: 1_900_000_000,
/// };
/// assert!(!credential.is_expired_at(1_800_000_000));
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
}

impl Credential {
    /// Refresh is due once `now` reaches the expiry.
    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }

    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::<Utc>::from_timestamp(self.expires_at, 0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// A valid credential together with the client id sent as the API key.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthorizedCredential {
    pub credential: Credential,
    pub client_id: String,
}

impl AuthorizedCredential {
    pub fn access_token(&self) -> &str {
        &self.credential.access_token
    }

    pub fn expires_at(&self) -> i64 {
        self.credential.expires_at
    }
}

impl fmt::Debug for AuthorizedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizedCredential")
            .field("credential", &self.credential)
            .field("client_id", &self.client_id)
            .finish()
    }
}

/// Token payload shared by the device poll and refresh endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    expires_in: Option<i64>,
    created_at: Option<i64>,
}

impl TokenResponse {
    /// Convert into a credential; `created_at` falls back to `now` when the
    /// server omits it.
    pub(crate) fn into_credential(self, now: i64) -> Result<Credential, String> {
        let access_token = self
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| "token response missing access_token".to_string())?;
        let refresh_token = self
            .refresh_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| "token response missing refresh_token".to_string())?;
        let expires_in = self
            .expires_in
            .ok_or_else(|| "token response missing expires_in".to_string())?;
        let created_at = self.created_at.unwrap_or(now);
        Ok(Credential {
            access_token,
            refresh_token,
            expires_at: created_at + expires_in,
        })
    }
}

//! Refresh-token grant.

use chrono::Utc;
use serde_json::json;

use super::error::AuthError;
use super::token::{Credential, TokenResponse};
use crate::config::ClientConfig;

pub const TOKEN_PATH: &str = "/oauth/token";
/// Out-of-band redirect registered for device-code applications.
pub const OOB_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";

/// Exchanges a refresh token for a new access/refresh pair.
///
/// A single attempt is made; every failure is reported as
/// [`AuthError::RefreshFailed`].
pub struct TokenRefresher {
    client: reqwest::Client,
    base_url: String,
    client_config: ClientConfig,
}

impl TokenRefresher {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        client_config: ClientConfig,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client_config,
        }
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<Credential, AuthError> {
        let resp = self
            .client
            .post(format!("{}{TOKEN_PATH}", self.base_url))
            .json(&json!({
                "refresh_token": refresh_token,
                "client_id": self.client_config.client_id,
                "client_secret": self.client_config.client_secret,
                "redirect_uri": OOB_REDIRECT_URI,
                "grant_type": "refresh_token",
            }))
            .send()
            .await
            .map_err(|e| AuthError::RefreshFailed(format!("request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AuthError::RefreshFailed(format!(
                "token endpoint returned status {}",
                status.as_u16()
            )));
        }

        let payload: TokenResponse = resp
            .json()
            .await
            .map_err(|e| AuthError::RefreshFailed(format!("invalid refresh response: {e}")))?;
        let credential = payload
            .into_credential(Utc::now().timestamp())
            .map_err(AuthError::RefreshFailed)?;
        tracing::info!(expires_at = credential.expires_at, "refreshed access token");
        Ok(credential)
    }
}

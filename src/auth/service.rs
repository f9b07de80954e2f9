use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use super::device_code::{DeviceAuthorizer, DeviceCodeNotifier};
use super::error::AuthError;
use super::refresh::TokenRefresher;
use super::store::{FileTokenStore, TokenStore};
use super::token::{AuthorizedCredential, Credential};
use crate::config::BackupConfig;

/// Produces a valid credential on demand.
///
/// Loads the stored credential, runs device authorization on first use,
/// refreshes once the access token has expired, and writes every new
/// credential back to the store before returning it. Intended to be called
/// once per run, before any resource is fetched; it is not meant for
/// concurrent callers.
///
/// # Example
/// ```no_run
/// use tokio_util::sync::CancellationToken;
/// use trakt_backup::auth::{AuthSession, TracingNotifier};
/// use trakt_backup::config::BackupConfig;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = BackupConfig::load(None)?;
/// let session = AuthSession::from_config(&config, reqwest::Client::new());
/// let credential = session
///     .get_valid_credential(&TracingNotifier, &CancellationToken::new())
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct AuthSession {
    store: Arc<dyn TokenStore>,
    profile: String,
    authorizer: DeviceAuthorizer,
    refresher: TokenRefresher,
}

impl AuthSession {
    pub fn new(
        store: Arc<dyn TokenStore>,
        profile: impl Into<String>,
        authorizer: DeviceAuthorizer,
        refresher: TokenRefresher,
    ) -> Self {
        Self {
            store,
            profile: profile.into(),
            authorizer,
            refresher,
        }
    }

    /// Wire a session from configuration with the file-backed store.
    pub fn from_config(config: &BackupConfig, client: reqwest::Client) -> Self {
        let store = Arc::new(FileTokenStore::new(config.token_store_config()));
        let authorizer =
            DeviceAuthorizer::new(client.clone(), &config.api_base_url, config.client.clone());
        let refresher = TokenRefresher::new(client, &config.api_base_url, config.client.clone());
        Self::new(store, config.profile.clone(), authorizer, refresher)
    }

    /// Return a credential whose expiry lies in the future.
    ///
    /// A refresh failure clears the stored credential so the next run falls
    /// back to device authorization, then the failure is returned.
    pub async fn get_valid_credential(
        &self,
        notifier: &dyn DeviceCodeNotifier,
        cancel: &CancellationToken,
    ) -> Result<AuthorizedCredential, AuthError> {
        let credential = match self.store.load(&self.profile)? {
            None => {
                tracing::info!(
                    profile = %self.profile,
                    "no stored credential, running device authorization"
                );
                self.authorize(notifier, cancel).await?
            }
            Some(stored) if stored.is_expired_at(Utc::now().timestamp()) => {
                tracing::info!(
                    profile = %self.profile,
                    expired_at = stored.expires_at,
                    "access token expired, refreshing"
                );
                self.refresh(&stored).await?
            }
            Some(stored) => {
                tracing::debug!(profile = %self.profile, "using stored credential");
                stored
            }
        };

        Ok(AuthorizedCredential {
            credential,
            client_id: self.authorizer.client_id().to_string(),
        })
    }

    /// Drop the stored credential and authorize from scratch.
    ///
    /// Recovers from server-side revocation, which expiry alone cannot
    /// detect.
    pub async fn reset(
        &self,
        notifier: &dyn DeviceCodeNotifier,
        cancel: &CancellationToken,
    ) -> Result<AuthorizedCredential, AuthError> {
        self.store.clear(&self.profile)?;
        tracing::info!(profile = %self.profile, "stored credential deleted, re-authorizing");
        self.get_valid_credential(notifier, cancel).await
    }

    /// Stored credential, if any, without touching the network.
    pub fn status(&self) -> Result<Option<Credential>, AuthError> {
        self.store.load(&self.profile)
    }

    /// Remove the stored credential.
    pub fn logout(&self) -> Result<(), AuthError> {
        self.store.clear(&self.profile)
    }

    async fn authorize(
        &self,
        notifier: &dyn DeviceCodeNotifier,
        cancel: &CancellationToken,
    ) -> Result<Credential, AuthError> {
        let credential = self.authorizer.acquire(notifier, cancel).await?;
        self.persist(credential)
    }

    async fn refresh(&self, stored: &Credential) -> Result<Credential, AuthError> {
        // The stored refresh token may already be spent, so any failure here
        // (including an unusable new credential) forces a fresh login.
        let result = match self.refresher.refresh(&stored.refresh_token).await {
            Ok(credential) => self.persist(credential),
            Err(err) => Err(err),
        };
        if result.is_err() {
            if let Err(clear_err) = self.store.clear(&self.profile) {
                tracing::warn!(error = %clear_err, "failed to clear credential after refresh failure");
            }
        }
        result
    }

    fn persist(&self, credential: Credential) -> Result<Credential, AuthError> {
        if credential.is_expired_at(Utc::now().timestamp()) {
            return Err(AuthError::InvalidResponse(format!(
                "server issued a credential that expired at {}",
                credential.expires_at
            )));
        }
        self.store.save(&self.profile, &credential)?;
        Ok(credential)
    }
}

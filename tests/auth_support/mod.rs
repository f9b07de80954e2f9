#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio_util::sync::CancellationToken;
use trakt_backup::auth::{
    AuthError, AuthSession, AuthorizedCredential, Credential, DeviceAuthorizer,
    DeviceCodeChallenge, DeviceCodeNotifier, PollDelay, TokenRefresher, TokenStore,
};
use trakt_backup::config::ClientConfig;

pub const CLIENT_ID: &str = "test-client-id";
pub const CLIENT_SECRET: &str = "test-client-secret";

#[derive(Default)]
pub struct InMemoryTokenStore {
    tokens: Mutex<HashMap<String, Credential>>,
}

impl InMemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, profile: &str, credential: Credential) {
        self.tokens
            .lock()
            .expect("store lock poisoned")
            .insert(profile.to_string(), credential);
    }

    pub fn get(&self, profile: &str) -> Option<Credential> {
        self.tokens
            .lock()
            .expect("store lock poisoned")
            .get(profile)
            .cloned()
    }
}

impl TokenStore for InMemoryTokenStore {
    fn load(&self, profile: &str) -> Result<Option<Credential>, AuthError> {
        Ok(self.get(profile))
    }

    fn save(&self, profile: &str, credential: &Credential) -> Result<(), AuthError> {
        self.seed(profile, credential.clone());
        Ok(())
    }

    fn clear(&self, profile: &str) -> Result<(), AuthError> {
        self.tokens
            .lock()
            .expect("store lock poisoned")
            .remove(profile);
        Ok(())
    }
}

/// Records every requested wait and returns immediately.
#[derive(Default)]
pub struct RecordingDelay {
    waits: Mutex<Vec<Duration>>,
}

impl RecordingDelay {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn waits(&self) -> Vec<Duration> {
        self.waits.lock().expect("delay lock poisoned").clone()
    }

    pub fn total_secs(&self) -> u64 {
        self.waits().iter().map(Duration::as_secs).sum()
    }
}

#[async_trait]
impl PollDelay for RecordingDelay {
    async fn wait(&self, duration: Duration) {
        self.waits.lock().expect("delay lock poisoned").push(duration);
    }
}

/// Cancels the token on the first wait, then never finishes waiting.
pub struct CancelOnWait(pub CancellationToken);

#[async_trait]
impl PollDelay for CancelOnWait {
    async fn wait(&self, _duration: Duration) {
        self.0.cancel();
        std::future::pending::<()>().await;
    }
}

/// Notifier that remembers what it was shown.
#[derive(Default)]
pub struct RecordingNotifier {
    pub codes: Mutex<Vec<String>>,
    pub waits: Mutex<Vec<(u64, u64)>>,
}

impl DeviceCodeNotifier for RecordingNotifier {
    fn show_code(&self, challenge: &DeviceCodeChallenge) {
        self.codes
            .lock()
            .expect("notifier lock poisoned")
            .push(challenge.user_code.clone());
    }

    fn waiting(&self, elapsed_secs: u64, expires_in_secs: u64) {
        self.waits
            .lock()
            .expect("notifier lock poisoned")
            .push((elapsed_secs, expires_in_secs));
    }
}

pub fn client_config() -> ClientConfig {
    ClientConfig::new(CLIENT_ID, CLIENT_SECRET)
}

pub fn authorizer(base_url: &str, delay: Arc<dyn PollDelay>) -> DeviceAuthorizer {
    DeviceAuthorizer::new(reqwest::Client::new(), base_url, client_config()).with_delay(delay)
}

pub fn refresher(base_url: &str) -> TokenRefresher {
    TokenRefresher::new(reqwest::Client::new(), base_url, client_config())
}

pub fn session(
    base_url: &str,
    store: Arc<InMemoryTokenStore>,
    delay: Arc<dyn PollDelay>,
) -> AuthSession {
    AuthSession::new(
        store,
        "default",
        authorizer(base_url, delay),
        refresher(base_url),
    )
}

pub fn challenge(expires_in_secs: u64, interval_secs: u64) -> DeviceCodeChallenge {
    DeviceCodeChallenge {
        device_code: "device-code-1".to_string(),
        user_code: "5055CC52".to_string(),
        verification_url: "https://trakt.tv/activate".to_string(),
        expires_in_secs,
        interval_secs,
    }
}

/// Credential that expires `secs_from_now` seconds from now (negative for
/// already expired).
pub fn credential(access_token: &str, secs_from_now: i64) -> Credential {
    Credential {
        access_token: access_token.to_string(),
        refresh_token: format!("{access_token}-refresh"),
        expires_at: Utc::now().timestamp() + secs_from_now,
    }
}

pub fn authorized(access_token: &str) -> AuthorizedCredential {
    AuthorizedCredential {
        credential: credential(access_token, 3600),
        client_id: CLIENT_ID.to_string(),
    }
}

/// Token endpoint body with `created_at` set to now.
pub fn token_body(access_token: &str, refresh_token: &str) -> serde_json::Value {
    serde_json::json!({
        "access_token": access_token,
        "token_type": "bearer",
        "expires_in": 7_776_000,
        "refresh_token": refresh_token,
        "scope": "public",
        "created_at": Utc::now().timestamp(),
    })
}

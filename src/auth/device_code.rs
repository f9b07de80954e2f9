use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use tokio_util::sync::CancellationToken;

use super::error::AuthError;
use super::token::{Credential, TokenResponse};
use crate::config::ClientConfig;

pub const DEVICE_CODE_PATH: &str = "/oauth/device/code";
pub const DEVICE_TOKEN_PATH: &str = "/oauth/device/token";

/// Device-code challenge returned by the authorization server.
///
/// Lives only for the duration of one login and is never persisted.
///
/// # Example
/// ```no_run
/// use trakt_backup::auth::DeviceCodeChallenge;
///
/// let challenge = DeviceCodeChallenge {
///     device_code: "d3v1c3".to_string(),
///     user_code: "5055CC52".to_string(),
///     verification_url: "https://trakt.tv/activate".to_string(),
///     expires_in_secs: 600,
///     interval_secs: 5,
/// };
/// ```
#[derive(Clone)]
pub struct DeviceCodeChallenge {
    pub device_code: String,
    pub user_code: String,
    pub verification_url: String,
    pub expires_in_secs: u64,
    pub interval_secs: u64,
}

impl fmt::Debug for DeviceCodeChallenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceCodeChallenge")
            .field("device_code", &"[REDACTED]")
            .field("user_code", &self.user_code)
            .field("verification_url", &self.verification_url)
            .field("expires_in_secs", &self.expires_in_secs)
            .field("interval_secs", &self.interval_secs)
            .finish()
    }
}

/// Outcome of polling a device-code challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DevicePoll {
    /// Not approved yet; wait one interval and poll again.
    Pending,
    /// The operator approved the device.
    Approved(Credential),
    /// The server rejected the code with the given status.
    Denied { status: u16 },
    /// The challenge window elapsed without approval.
    Expired,
}

/// Presents the user code to the operator and reports polling progress.
///
/// Implementations must never see tokens; they only receive the challenge
/// and timing figures.
pub trait DeviceCodeNotifier: Send + Sync {
    fn show_code(&self, challenge: &DeviceCodeChallenge);

    fn waiting(&self, _elapsed_secs: u64, _expires_in_secs: u64) {}
}

/// Notifier that writes to the `tracing` log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl DeviceCodeNotifier for TracingNotifier {
    fn show_code(&self, challenge: &DeviceCodeChallenge) {
        tracing::info!(
            verification_url = %challenge.verification_url,
            user_code = %challenge.user_code,
            "go to the verification url and enter the user code"
        );
    }

    fn waiting(&self, elapsed_secs: u64, expires_in_secs: u64) {
        tracing::info!(elapsed_secs, expires_in_secs, "waiting for device authorization");
    }
}

/// Suspend point between two polls.
#[async_trait]
pub trait PollDelay: Send + Sync {
    async fn wait(&self, duration: Duration);
}

/// Default delay backed by the tokio timer.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioDelay;

#[async_trait]
impl PollDelay for TokioDelay {
    async fn wait(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Drives the OAuth device-code grant against the Trakt API.
///
/// # Example
/// ```no_run
/// use tokio_util::sync::CancellationToken;
/// use trakt_backup::auth::{DeviceAuthorizer, TracingNotifier};
/// use trakt_backup::config::ClientConfig;
///
/// # async fn example() -> Result<(), trakt_backup::auth::AuthError> {
/// let authorizer = DeviceAuthorizer::new(
///     reqwest::Client::new(),
///     "https://api.trakt.tv",
///     ClientConfig::new("client-id", "client-secret"),
/// );
/// let credential = authorizer
///     .acquire(&TracingNotifier, &CancellationToken::new())
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct DeviceAuthorizer {
    client: reqwest::Client,
    base_url: String,
    client_config: ClientConfig,
    delay: Arc<dyn PollDelay>,
}

impl DeviceAuthorizer {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        client_config: ClientConfig,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client_config,
            delay: Arc::new(TokioDelay),
        }
    }

    pub fn with_delay(mut self, delay: Arc<dyn PollDelay>) -> Self {
        self.delay = delay;
        self
    }

    pub fn client_id(&self) -> &str {
        &self.client_config.client_id
    }

    /// Request a fresh challenge, show it, and poll until it resolves.
    pub async fn acquire(
        &self,
        notifier: &dyn DeviceCodeNotifier,
        cancel: &CancellationToken,
    ) -> Result<Credential, AuthError> {
        let challenge = self.start().await?;
        notifier.show_code(&challenge);
        self.poll_until_complete(&challenge, notifier, cancel).await
    }

    pub async fn start(&self) -> Result<DeviceCodeChallenge, AuthError> {
        let resp = self
            .client
            .post(format!("{}{DEVICE_CODE_PATH}", self.base_url))
            .json(&json!({ "client_id": self.client_config.client_id }))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(AuthError::AuthorizationDenied {
                status: resp.status().as_u16(),
            });
        }
        let payload: DeviceCodeResponse = resp
            .json()
            .await
            .map_err(|e| AuthError::InvalidResponse(format!("device code response: {e}")))?;
        tracing::debug!(
            expires_in = payload.expires_in,
            interval = payload.interval,
            "received device code"
        );
        Ok(DeviceCodeChallenge {
            device_code: payload.device_code,
            user_code: payload.user_code,
            verification_url: payload.verification_url,
            expires_in_secs: payload.expires_in,
            interval_secs: payload.interval,
        })
    }

    /// Issue a single poll request.
    ///
    /// 200 approves, 400 means the operator has not acted yet, and every
    /// other status is a denial. Expiry is decided by the caller's clock, so
    /// this never returns [`DevicePoll::Expired`].
    pub async fn poll_once(&self, challenge: &DeviceCodeChallenge) -> Result<DevicePoll, AuthError> {
        let resp = self
            .client
            .post(format!("{}{DEVICE_TOKEN_PATH}", self.base_url))
            .json(&json!({
                "code": challenge.device_code,
                "client_id": self.client_config.client_id,
                "client_secret": self.client_config.client_secret,
            }))
            .send()
            .await?;

        match resp.status() {
            StatusCode::OK => {
                let payload: TokenResponse = resp
                    .json()
                    .await
                    .map_err(|e| AuthError::InvalidResponse(format!("device token response: {e}")))?;
                let credential = payload
                    .into_credential(Utc::now().timestamp())
                    .map_err(AuthError::InvalidResponse)?;
                Ok(DevicePoll::Approved(credential))
            }
            StatusCode::BAD_REQUEST => Ok(DevicePoll::Pending),
            other => Ok(DevicePoll::Denied {
                status: other.as_u16(),
            }),
        }
    }

    /// Poll every `interval_secs` until approval, denial, expiry or
    /// cancellation.
    ///
    /// Elapsed time is the sum of completed waits, so the number of polls is
    /// bounded by `expires_in_secs / interval_secs` regardless of request
    /// latency.
    pub async fn poll_until_complete(
        &self,
        challenge: &DeviceCodeChallenge,
        notifier: &dyn DeviceCodeNotifier,
        cancel: &CancellationToken,
    ) -> Result<Credential, AuthError> {
        // A zero interval would never advance the clock.
        let interval = challenge.interval_secs.max(1);
        let mut elapsed = 0u64;

        loop {
            if cancel.is_cancelled() {
                return Err(AuthError::Cancelled);
            }

            let outcome = if elapsed >= challenge.expires_in_secs {
                DevicePoll::Expired
            } else {
                self.poll_once(challenge).await?
            };
            match outcome {
                DevicePoll::Approved(credential) => {
                    tracing::info!(elapsed_secs = elapsed, "device authorization approved");
                    return Ok(credential);
                }
                DevicePoll::Denied { status } => {
                    tracing::warn!(status, "device authorization denied");
                    return Err(AuthError::AuthorizationDenied { status });
                }
                DevicePoll::Expired => {
                    tracing::warn!(
                        waited_secs = elapsed,
                        "device authorization expired without approval"
                    );
                    return Err(AuthError::AuthorizationExpired {
                        waited_secs: elapsed,
                    });
                }
                DevicePoll::Pending => {}
            }

            notifier.waiting(elapsed, challenge.expires_in_secs);
            tokio::select! {
                _ = cancel.cancelled() => return Err(AuthError::Cancelled),
                _ = self.delay.wait(Duration::from_secs(interval)) => {}
            }
            elapsed += interval;
        }
    }
}

#[derive(Debug, Deserialize)]
struct DeviceCodeResponse {
    device_code: String,
    user_code: String,
    verification_url: String,
    expires_in: u64,
    interval: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn challenge_debug_hides_device_code() {
        let challenge = DeviceCodeChallenge {
            device_code: "secret-device-code".into(),
            user_code: "ABCD1234".into(),
            verification_url: "https://trakt.tv/activate".into(),
            expires_in_secs: 600,
            interval_secs: 5,
        };
        let debug = format!("{challenge:?}");
        assert!(!debug.contains("secret-device-code"));
        assert!(debug.contains("ABCD1234"));
    }

    #[test]
    fn device_code_response_parses_trakt_shape() {
        let payload: DeviceCodeResponse = serde_json::from_str(
            r#"{
                "device_code": "d9c126a7706328d808914cfd1e40274b6e009f684b1aca271b9b3f90b3630e64",
                "user_code": "5055CC52",
                "verification_url": "https://trakt.tv/activate",
                "expires_in": 600,
                "interval": 5
            }"#,
        )
        .unwrap();
        assert_eq!(payload.user_code, "5055CC52");
        assert_eq!(payload.expires_in, 600);
        assert_eq!(payload.interval, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn tokio_delay_waits_the_full_interval() {
        let start = tokio::time::Instant::now();
        TokioDelay.wait(Duration::from_secs(5)).await;
        assert!(start.elapsed() >= Duration::from_secs(5));
    }
}

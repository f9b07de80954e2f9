//! CLI auth command handlers for login, status, logout and reset.

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::api::build_client;
use crate::auth::{AuthSession, AuthorizedCredential, DeviceCodeChallenge, DeviceCodeNotifier};
use crate::config::BackupConfig;
use crate::error::Result;

/// Prints the user code to the terminal while the device flow polls.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl DeviceCodeNotifier for ConsoleNotifier {
    fn show_code(&self, challenge: &DeviceCodeChallenge) {
        println!("🔗 Visit: {}", challenge.verification_url);
        println!("📋 Enter code: {}", challenge.user_code);
        println!("⏳ Waiting for authorization...");
    }

    fn waiting(&self, elapsed_secs: u64, expires_in_secs: u64) {
        tracing::debug!(elapsed_secs, expires_in_secs, "still waiting for approval");
    }
}

pub(crate) fn session(config: &BackupConfig) -> Result<AuthSession> {
    Ok(AuthSession::from_config(config, build_client()?))
}

/// Handle `trakt-backup auth login`.
pub async fn handle_login(config: &BackupConfig, cancel: &CancellationToken) -> Result<()> {
    let credential = session(config)?
        .get_valid_credential(&ConsoleNotifier, cancel)
        .await?;
    print_logged_in(&credential);
    Ok(())
}

/// Handle `trakt-backup auth reset`.
pub async fn handle_reset(config: &BackupConfig, cancel: &CancellationToken) -> Result<()> {
    let credential = session(config)?.reset(&ConsoleNotifier, cancel).await?;
    print_logged_in(&credential);
    Ok(())
}

/// Handle `trakt-backup auth status`.
pub fn handle_status(config: &BackupConfig) -> Result<()> {
    println!("🔐 Authentication Status ({})\n", config.profile);

    match session(config)?.status()? {
        Some(credential) => {
            let expires = credential
                .expires_at_utc()
                .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| credential.expires_at.to_string());
            if credential.is_expired_at(Utc::now().timestamp()) {
                println!("  ⚠️  Token expired {expires} (refreshed on next run)");
            } else {
                println!("  ✅ Logged in (expires {expires})");
            }
        }
        None => println!("  ❌ Not logged in"),
    }
    Ok(())
}

/// Handle `trakt-backup auth logout`.
pub fn handle_logout(config: &BackupConfig) -> Result<()> {
    session(config)?.logout()?;
    println!("✅ Logged out of profile {}", config.profile);
    Ok(())
}

fn print_logged_in(credential: &AuthorizedCredential) {
    match credential.credential.expires_at_utc() {
        Some(at) => println!("✅ Logged in (expires {})", at.format("%Y-%m-%d %H:%M")),
        None => println!("✅ Logged in"),
    }
}

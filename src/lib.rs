//! trakt-backup: personal data export for Trakt.
//!
//! Obtains an OAuth credential through the device-code flow, keeps it fresh
//! across runs, and downloads every `/users/me/` resource (following
//! pagination) into a local backup folder.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use trakt_backup::api::{build_client, PaginatedFetcher};
//! use trakt_backup::auth::{AuthSession, TracingNotifier};
//! use trakt_backup::backup::{BackupOptions, BackupRunner, DirectoryStore};
//! use trakt_backup::config::BackupConfig;
//!
//! # async fn example() -> trakt_backup::error::Result<()> {
//! let config = BackupConfig::load(None)?;
//! let client = build_client()?;
//! let session = AuthSession::from_config(&config, client.clone());
//! let credential = session
//!     .get_valid_credential(&TracingNotifier, &CancellationToken::new())
//!     .await?;
//!
//! let runner = BackupRunner::new(
//!     PaginatedFetcher::new(client, &config.api_base_url),
//!     Arc::new(DirectoryStore::new(&config.backup_dir)),
//!     BackupOptions::default(),
//! );
//! let report = runner.run(&credential).await?;
//! println!("{} files written", report.created() + report.updated());
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod backup;
pub mod config;
pub mod error;

#[cfg(feature = "cli")]
pub mod cli;

//! CLI handlers for `backup` and `fetch`.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::auth::ConsoleNotifier;
use super::{BackupArgs, FetchArgs};
use crate::api::{build_client, PaginatedFetcher};
use crate::auth::AuthSession;
use crate::backup::{BackupOptions, BackupRunner, DirectoryStore};
use crate::config::BackupConfig;
use crate::error::Result;

/// Handle `trakt-backup backup`.
///
/// Returns `Ok(false)` when some resources failed; everything else has
/// still been written.
pub async fn handle_backup(
    config: &BackupConfig,
    args: BackupArgs,
    cancel: &CancellationToken,
) -> Result<bool> {
    let client = build_client()?;
    let credential = AuthSession::from_config(config, client.clone())
        .get_valid_credential(&ConsoleNotifier, cancel)
        .await?;

    let output = args.output.unwrap_or_else(|| config.backup_dir.clone());
    let options = BackupOptions {
        follow_all_pages: !args.no_paginate,
        include_lists: !args.skip_lists,
    };
    let runner = BackupRunner::new(
        PaginatedFetcher::new(client, &config.api_base_url),
        Arc::new(DirectoryStore::new(&output)),
        options,
    );

    let report = runner.run(&credential).await?;
    println!(
        "📦 Backup written to {} ({} created, {} updated)",
        output.display(),
        report.created(),
        report.updated()
    );
    for (name, err) in report.failures() {
        eprintln!("  ❌ {name}: {err}");
    }
    Ok(report.is_success())
}

/// Handle `trakt-backup fetch <path>`.
pub async fn handle_fetch(
    config: &BackupConfig,
    args: FetchArgs,
    cancel: &CancellationToken,
) -> Result<()> {
    let client = build_client()?;
    let credential = AuthSession::from_config(config, client.clone())
        .get_valid_credential(&ConsoleNotifier, cancel)
        .await?;

    let fetcher = PaginatedFetcher::new(client, &config.api_base_url);
    let body = fetcher.fetch(&credential, &args.path, args.all_pages).await?;
    println!("{body}");
    Ok(())
}

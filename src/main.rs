//! trakt-backup binary entry point.

use std::process::ExitCode;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use trakt_backup::cli::{self, AuthCommands, Cli, Commands};
use trakt_backup::config::BackupConfig;
use trakt_backup::error::Result;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();
    init_tracing(cli.verbose);

    let cancel = CancellationToken::new();
    tokio::spawn(cancel_on_ctrl_c(cancel.clone()));

    let result = tokio::select! {
        result = run(cli, &cancel) => result,
        _ = cancel.cancelled() => {
            eprintln!("Interrupted.");
            return ExitCode::from(130);
        }
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(2),
        Err(err) => {
            eprintln!("Error: {}", cli::errors::format_error_help(&err));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, cancel: &CancellationToken) -> Result<bool> {
    let config = BackupConfig::load(cli.config.as_deref())?;
    tracing::debug!(?config, "configuration loaded");

    match cli.command {
        Commands::Auth(auth_args) => {
            match auth_args.command {
                AuthCommands::Login => cli::auth::handle_login(&config, cancel).await?,
                AuthCommands::Status => cli::auth::handle_status(&config)?,
                AuthCommands::Logout => cli::auth::handle_logout(&config)?,
                AuthCommands::Reset => cli::auth::handle_reset(&config, cancel).await?,
            }
            Ok(true)
        }
        Commands::Backup(args) => cli::backup::handle_backup(&config, args, cancel).await,
        Commands::Fetch(args) => {
            cli::backup::handle_fetch(&config, args, cancel).await?;
            Ok(true)
        }
    }
}

/// Log to stderr; `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        tracing::warn!("received Ctrl-C, cancelling");
        cancel.cancel();
    }
}

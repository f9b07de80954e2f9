//! CLI entry point for trakt-backup.

pub mod auth;
pub mod backup;
pub mod errors;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Trakt personal data backup
#[derive(Parser, Debug)]
#[command(name = "trakt-backup", version, about = "Back up your Trakt data to local JSON files")]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Authentication management
    Auth(AuthArgs),
    /// Back up every resource
    Backup(BackupArgs),
    /// Print one resource to stdout
    Fetch(FetchArgs),
}

/// Arguments for the `auth` subcommand group.
#[derive(Parser, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommands,
}

/// Auth subcommands.
#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Authorize this device if no valid credential is stored
    Login,
    /// Show the stored credential's expiry
    Status,
    /// Delete the stored credential
    Logout,
    /// Delete the stored credential and authorize again
    Reset,
}

/// Arguments for `trakt-backup backup`.
#[derive(Parser, Debug)]
pub struct BackupArgs {
    /// Only fetch the first page of listing endpoints
    #[arg(long)]
    pub no_paginate: bool,

    /// Skip custom lists
    #[arg(long)]
    pub skip_lists: bool,

    /// Directory to write the backup to (overrides config)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for `trakt-backup fetch`.
#[derive(Parser, Debug)]
pub struct FetchArgs {
    /// Resource path under /users/me/, e.g. `history` or `watched/movies`
    pub path: String,

    /// Follow x-pagination-page-count and merge every page
    #[arg(long)]
    pub all_pages: bool,
}

impl Cli {
    /// Parse CLI arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_auth_login() {
        let cli = Cli::try_parse_from(["trakt-backup", "auth", "login"]).unwrap();
        match cli.command {
            Commands::Auth(auth) => assert!(matches!(auth.command, AuthCommands::Login)),
            other => panic!("expected Auth, got {other:?}"),
        }
    }

    #[test]
    fn parse_auth_reset() {
        let cli = Cli::try_parse_from(["trakt-backup", "auth", "reset"]).unwrap();
        match cli.command {
            Commands::Auth(auth) => assert!(matches!(auth.command, AuthCommands::Reset)),
            other => panic!("expected Auth, got {other:?}"),
        }
    }

    #[test]
    fn parse_backup_with_defaults() {
        let cli = Cli::try_parse_from(["trakt-backup", "backup"]).unwrap();
        assert!(cli.config.is_none());
        assert!(!cli.verbose);
        match cli.command {
            Commands::Backup(args) => {
                assert!(!args.no_paginate);
                assert!(!args.skip_lists);
                assert!(args.output.is_none());
            }
            other => panic!("expected Backup, got {other:?}"),
        }
    }

    #[test]
    fn parse_backup_with_all_options() {
        let cli = Cli::try_parse_from([
            "trakt-backup",
            "backup",
            "--no-paginate",
            "--skip-lists",
            "-o",
            "/tmp/trakt",
            "--config",
            "trakt.toml",
            "-v",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("trakt.toml")));
        assert!(cli.verbose);
        match cli.command {
            Commands::Backup(args) => {
                assert!(args.no_paginate);
                assert!(args.skip_lists);
                assert_eq!(args.output, Some(PathBuf::from("/tmp/trakt")));
            }
            other => panic!("expected Backup, got {other:?}"),
        }
    }

    #[test]
    fn parse_fetch_all_pages() {
        let cli = Cli::try_parse_from(["trakt-backup", "fetch", "history", "--all-pages"]).unwrap();
        match cli.command {
            Commands::Fetch(args) => {
                assert_eq!(args.path, "history");
                assert!(args.all_pages);
            }
            other => panic!("expected Fetch, got {other:?}"),
        }
    }

    #[test]
    fn parse_missing_subcommand_is_error() {
        assert!(Cli::try_parse_from(["trakt-backup"]).is_err());
    }

    #[test]
    fn parse_fetch_missing_path_is_error() {
        assert!(Cli::try_parse_from(["trakt-backup", "fetch"]).is_err());
    }
}

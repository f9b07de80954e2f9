//! Configuration system (layered: env > config file > defaults).

pub mod client;

pub use client::ClientConfig;

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::auth::store::TokenStoreConfig;
use crate::error::TraktError;

pub const DEFAULT_API_BASE_URL: &str = "https://api.trakt.tv";
pub const DEFAULT_PROFILE: &str = "default";

/// Environment variables consulted by [`BackupConfig::load`].
const ENV_CLIENT_ID: &str = "TRAKT_CLIENT_ID";
const ENV_CLIENT_SECRET: &str = "TRAKT_CLIENT_SECRET";
const ENV_API_URL: &str = "TRAKT_API_URL";
const ENV_BACKUP_DIR: &str = "TRAKT_BACKUP_DIR";
const ENV_PROFILE: &str = "TRAKT_PROFILE";
const ENV_TOKEN_DIR: &str = "TRAKT_TOKEN_DIR";

/// Everything a backup run needs, resolved once at startup and passed
/// explicitly into each component.
///
/// Resolution order for every field:
/// 1. Environment variables (after loading `.env`)
/// 2. The TOML config file
/// 3. Built-in defaults
#[derive(Debug, Clone)]
pub struct BackupConfig {
    pub client: ClientConfig,
    pub api_base_url: String,
    pub backup_dir: PathBuf,
    pub profile: String,
    pub token_dir: PathBuf,
}

/// On-disk shape of `config.toml`. Every key is optional so the file can
/// hold only what the environment does not provide.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub api_base_url: Option<String>,
    pub backup_dir: Option<PathBuf>,
    pub profile: Option<String>,
    pub token_dir: Option<PathBuf>,
}

impl FileConfig {
    pub fn from_path(path: &Path) -> Result<Self, TraktError> {
        let raw = fs::read_to_string(path).map_err(|err| {
            TraktError::Configuration(format!("cannot read {}: {err}", path.display()))
        })?;
        toml::from_str(&raw).map_err(|err| {
            TraktError::Configuration(format!("invalid config file {}: {err}", path.display()))
        })
    }
}

impl BackupConfig {
    /// Load configuration from `path` (or the default location if it
    /// exists), then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, TraktError> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error

        let file = match path {
            Some(path) => FileConfig::from_path(path)?,
            None => {
                let default_path = Self::default_config_path();
                if default_path.is_file() {
                    tracing::debug!(path = %default_path.display(), "using default config file");
                    FileConfig::from_path(&default_path)?
                } else {
                    FileConfig::default()
                }
            }
        };

        Self::resolve(file, |key| std::env::var(key).ok())
    }

    /// Merge a parsed file with a variable lookup. Split out from [`load`]
    /// so resolution can be exercised without touching the process env.
    ///
    /// [`load`]: BackupConfig::load
    pub fn resolve(
        file: FileConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, TraktError> {
        let env = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let client_id = env(ENV_CLIENT_ID).or(file.client_id).ok_or_else(|| {
            TraktError::Configuration(format!(
                "client id missing: set {ENV_CLIENT_ID} or client_id in the config file"
            ))
        })?;
        let client_secret = env(ENV_CLIENT_SECRET).or(file.client_secret).ok_or_else(|| {
            TraktError::Configuration(format!(
                "client secret missing: set {ENV_CLIENT_SECRET} or client_secret in the config file"
            ))
        })?;

        let api_base_url = env(ENV_API_URL)
            .or(file.api_base_url)
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let backup_dir = env(ENV_BACKUP_DIR)
            .map(PathBuf::from)
            .or(file.backup_dir)
            .unwrap_or_else(default_backup_dir);

        let profile = env(ENV_PROFILE)
            .or(file.profile)
            .unwrap_or_else(|| DEFAULT_PROFILE.to_string());

        let token_dir = env(ENV_TOKEN_DIR)
            .map(PathBuf::from)
            .or(file.token_dir)
            .unwrap_or_else(TokenStoreConfig::default_dir);

        Ok(Self {
            client: ClientConfig::new(client_id, client_secret),
            api_base_url,
            backup_dir,
            profile,
            token_dir,
        })
    }

    pub fn default_config_path() -> PathBuf {
        directories::ProjectDirs::from("", "", "trakt-backup")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("trakt-backup.toml"))
    }

    pub fn token_store_config(&self) -> TokenStoreConfig {
        TokenStoreConfig::new(self.token_dir.clone())
    }
}

fn default_backup_dir() -> PathBuf {
    directories::UserDirs::new()
        .and_then(|dirs| dirs.document_dir().map(|docs| docs.join("trakt-backup")))
        .unwrap_or_else(|| PathBuf::from("trakt-backup"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn env_values_override_file_values() {
        let file = FileConfig {
            client_id: Some("file-id".into()),
            client_secret: Some("file-secret".into()),
            profile: Some("file-profile".into()),
            ..FileConfig::default()
        };
        let config = BackupConfig::resolve(
            file,
            lookup(&[("TRAKT_CLIENT_ID", "env-id"), ("TRAKT_PROFILE", "env-profile")]),
        )
        .unwrap();

        assert_eq!(config.client.client_id, "env-id");
        assert_eq!(config.client.client_secret, "file-secret");
        assert_eq!(config.profile, "env-profile");
    }

    #[test]
    fn defaults_fill_optional_fields() {
        let config = BackupConfig::resolve(
            FileConfig::default(),
            lookup(&[("TRAKT_CLIENT_ID", "id"), ("TRAKT_CLIENT_SECRET", "secret")]),
        )
        .unwrap();

        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.profile, DEFAULT_PROFILE);
    }

    #[test]
    fn missing_client_id_is_configuration_error() {
        let result = BackupConfig::resolve(
            FileConfig::default(),
            lookup(&[("TRAKT_CLIENT_SECRET", "secret")]),
        );
        match result {
            Err(TraktError::Configuration(msg)) => assert!(msg.contains("TRAKT_CLIENT_ID")),
            other => panic!("expected Configuration, got {other:?}"),
        }
    }

    #[test]
    fn blank_env_value_falls_back_to_file() {
        let file = FileConfig {
            client_id: Some("file-id".into()),
            client_secret: Some("file-secret".into()),
            ..FileConfig::default()
        };
        let config = BackupConfig::resolve(file, lookup(&[("TRAKT_CLIENT_ID", "  ")])).unwrap();
        assert_eq!(config.client.client_id, "file-id");
    }

    #[test]
    fn api_base_url_trailing_slash_is_trimmed() {
        let config = BackupConfig::resolve(
            FileConfig::default(),
            lookup(&[
                ("TRAKT_CLIENT_ID", "id"),
                ("TRAKT_CLIENT_SECRET", "secret"),
                ("TRAKT_API_URL", "http://localhost:8080/"),
            ]),
        )
        .unwrap();
        assert_eq!(config.api_base_url, "http://localhost:8080");
    }

    #[test]
    fn file_config_rejects_unknown_keys() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "client_id = \"id\"\nclientSecret = \"typo\"\n").unwrap();
        assert!(matches!(
            FileConfig::from_path(&path),
            Err(TraktError::Configuration(_))
        ));
    }

    #[test]
    fn file_config_parses_all_keys() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "client_id = \"id\"\nclient_secret = \"secret\"\nbackup_dir = \"/tmp/backup\"\nprofile = \"me\"\n",
        )
        .unwrap();
        let file = FileConfig::from_path(&path).unwrap();
        assert_eq!(file.client_id.as_deref(), Some("id"));
        assert_eq!(file.backup_dir, Some(PathBuf::from("/tmp/backup")));
        assert_eq!(file.profile.as_deref(), Some("me"));
    }

    #[test]
    fn debug_output_does_not_leak_secret() {
        let config = BackupConfig::resolve(
            FileConfig::default(),
            lookup(&[("TRAKT_CLIENT_ID", "id"), ("TRAKT_CLIENT_SECRET", "hunter2")]),
        )
        .unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("[REDACTED]"));
    }
}

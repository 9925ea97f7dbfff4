//! CLI configuration
//!
//! Read from a TOML file, then overridden by `WSCTX_API_URL` and
//! `WSCTX_TOKEN`:
//!
//! ```toml
//! state_file = "/home/me/.config/wsctx/state.json"
//!
//! [api]
//! base_url = "https://api.example.com/api/v1"
//! timeout_secs = 15
//!
//! [store]
//! kind = "project"
//! storage_key = "current_project_id"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use wsctx_client::ClientConfig;
use wsctx_store::StoreConfig;

/// Environment variable overriding `api.base_url`
pub(crate) const ENV_API_URL: &str = "WSCTX_API_URL";
/// Environment variable overriding `api.token`
pub(crate) const ENV_TOKEN: &str = "WSCTX_TOKEN";

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub(crate) enum ConfigError {
    /// File could not be read
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// File is not valid TOML for [`AppConfig`]
    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Full CLI configuration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct AppConfig {
    /// Backend connection
    pub(crate) api: ClientConfig,
    /// Store behaviour
    pub(crate) store: StoreConfig,
    /// Where the last active workspace id is kept
    pub(crate) state_file: Option<PathBuf>,
}

impl AppConfig {
    /// Load `path` if given, else the default location if it exists, else defaults
    pub(crate) fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => default_config_path().filter(|p| p.exists()),
        };

        let config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        Ok(config.with_env_overrides(|key| std::env::var(key).ok()))
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Apply overrides from a variable lookup
    pub(crate) fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.is_empty()) {
            self.api.base_url = url;
        }
        if let Some(token) = lookup(ENV_TOKEN).filter(|v| !v.is_empty()) {
            self.api.token = Some(token);
        }
        self
    }

    /// State file, defaulting next to the config file
    pub(crate) fn state_path(&self) -> PathBuf {
        self.state_file
            .clone()
            .or_else(|| config_dir().map(|d| d.join("state.json")))
            .unwrap_or_else(|| PathBuf::from(".wsctx-state.json"))
    }
}

fn config_dir() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
        .map(|d| d.join("wsctx"))
}

fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

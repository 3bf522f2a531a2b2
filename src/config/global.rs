//! Global user configuration (`~/.dekube/config.toml`).
//!
//! Every key is optional; an absent file is the same as an empty one.
//!
//! ```toml
//! [registries]
//! extensions = "https://example.com/extensions.json"
//! distributions = "/srv/mirror/distributions.json"
//!
//! [github]
//! api_base = "https://ghe.example.com/api/v3"
//! token = "ghp_xxx"
//!
//! [network]
//! request_timeout_secs = 10
//! max_attempts = 5
//! ```

use crate::constants::{
    CONFIG_PATH_ENV, DEFAULT_DISTRIBUTIONS_REGISTRY, DEFAULT_EXTENSIONS_REGISTRY,
    DEFAULT_MAX_ATTEMPTS, DEFAULT_REQUEST_TIMEOUT, GITHUB_API_BASE, GITHUB_RAW_BASE,
    GITHUB_RELEASE_BASE, GITHUB_TOKEN_ENV,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::debug;

/// Global configuration for dekube-manager.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GlobalConfig {
    /// Where the two registries are read from.
    #[serde(default)]
    pub registries: RegistrySettings,

    /// GitHub endpoints and credentials.
    #[serde(default)]
    pub github: GitHubSettings,

    /// Timeout and retry budget.
    #[serde(default)]
    pub network: NetworkSettings,
}

/// Registry source locations: `https://` URL, `file://` URL or local path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySettings {
    /// Extensions registry.
    pub extensions: String,
    /// Distributions registry.
    pub distributions: String,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS_REGISTRY.to_string(),
            distributions: DEFAULT_DISTRIBUTIONS_REGISTRY.to_string(),
        }
    }
}

/// GitHub base URLs and an optional token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubSettings {
    /// REST API base, used for release and tag lookups.
    pub api_base: String,
    /// Raw content base, used for extension files.
    pub raw_base: String,
    /// Web base, used for release asset downloads.
    pub release_base: String,
    /// Personal access token sent as a bearer token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            api_base: GITHUB_API_BASE.to_string(),
            raw_base: GITHUB_RAW_BASE.to_string(),
            release_base: GITHUB_RELEASE_BASE.to_string(),
            token: None,
        }
    }
}

/// Per-request timeout and attempt budget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSettings {
    /// Seconds before a single request is abandoned.
    pub request_timeout_secs: u64,
    /// Attempts per request, including the first.
    pub max_attempts: usize,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT.as_secs(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl NetworkSettings {
    /// Timeout as a [`Duration`].
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl GlobalConfig {
    /// Load from an explicit path, `$DEKUBE_CONFIG`, or the default location,
    /// in that order. A missing file yields the defaults unless the path was
    /// given explicitly.
    ///
    /// `GITHUB_TOKEN` replaces any token from the file.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit file is missing, or if the chosen file
    /// cannot be read or is not valid TOML.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let explicit = path.or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));

        let config = match explicit {
            Some(path) => Self::load_from(&path).await?,
            None => match Self::default_path() {
                Ok(path) if path.exists() => Self::load_from(&path).await?,
                _ => Self::default(),
            },
        };

        Ok(config.with_env_overrides(|key| std::env::var(key).ok()))
    }

    /// Load from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not parse.
    pub async fn load_from(path: &Path) -> Result<Self> {
        debug!("Reading global config from {}", path.display());
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read global config from {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse global config from {}", path.display()))
    }

    /// Default file path for the global configuration.
    ///
    /// - **Windows**: `%LOCALAPPDATA%\dekube\config.toml`
    /// - **Unix/macOS**: `~/.dekube/config.toml`
    ///
    /// # Errors
    ///
    /// Returns an error if the home (or local data) directory cannot be
    /// determined.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("dekube")
        } else {
            dirs::home_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
                .join(".dekube")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// Apply environment overrides through `lookup`.
    #[must_use]
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(token) = lookup(GITHUB_TOKEN_ENV).filter(|t| !t.trim().is_empty()) {
            self.github.token = Some(token.trim().to_string());
        }
        self
    }
}

//! Project config discovery.

use super::ProjectConfig;
use crate::constants::{LEGACY_CONFIG_FILE, PRIMARY_CONFIG_FILE};
use crate::core::DekubeError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A project config together with the file it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedConfig {
    /// File the config was read from.
    pub path: PathBuf,
    /// Parsed selection keys.
    pub config: ProjectConfig,
}

/// Ordered list of candidate config files.
///
/// The first candidate that exists wins. An explicit candidate list (from
/// `--file`) is required to exist; the default list is allowed to be empty
/// on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigCandidates {
    paths: Vec<PathBuf>,
    required: bool,
}

impl ConfigCandidates {
    /// `dekube.yaml`, then `helmfile2compose.yaml`, inside `dir`.
    #[must_use]
    pub fn default_in(dir: &Path) -> Self {
        Self {
            paths: vec![dir.join(PRIMARY_CONFIG_FILE), dir.join(LEGACY_CONFIG_FILE)],
            required: false,
        }
    }

    /// A single file the user asked for explicitly.
    #[must_use]
    pub fn explicit(path: PathBuf) -> Self {
        Self {
            paths: vec![path],
            required: true,
        }
    }

    /// First candidate present on disk.
    #[must_use]
    pub fn find_first(&self) -> Option<&Path> {
        self.paths.iter().map(PathBuf::as_path).find(|p| p.is_file())
    }

    /// Load the first existing candidate.
    ///
    /// Returns `Ok(None)` when no candidate exists and the list is not
    /// explicit.
    ///
    /// # Errors
    ///
    /// Fails when an explicit file is missing, or the chosen file cannot be
    /// read or parsed.
    pub fn load(&self) -> Result<Option<LoadedConfig>, DekubeError> {
        match self.find_first() {
            Some(path) => {
                debug!("Reading project config from {}", path.display());
                let config = ProjectConfig::load(path)?;
                Ok(Some(LoadedConfig {
                    path: path.to_path_buf(),
                    config,
                }))
            }
            None if self.required => Err(DekubeError::config(format!(
                "config file not found: {}",
                self.paths.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", ")
            ))),
            None => {
                debug!("No project config found; using command line only");
                Ok(None)
            }
        }
    }
}

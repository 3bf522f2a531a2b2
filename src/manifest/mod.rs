//! Declarative project config (`dekube.yaml`) parsing.
//!
//! The project config is shared with the downstream converter, which owns most
//! of its keys. dekube-manager reads only the keys that select artifacts:
//!
//! ```yaml
//! distribution: core           # base artifact name (optional)
//! distribution_version: v2.1.0 # base artifact pin (optional)
//! core_version: v2.0.0         # legacy alias, used when distribution_version is absent
//! depends:
//!   - keycloak
//!   - cert-manager==0.1.0
//! ```
//!
//! Every other key is ignored.
//!
//! # Discovery
//!
//! The config is looked up through an explicit ordered list of candidates, see
//! [`ConfigCandidates`]: `dekube.yaml` first, then the legacy
//! `helmfile2compose.yaml`. When no candidate exists the wishlist comes from
//! the command line only.

pub mod dependency_spec;
pub mod helpers;

pub use dependency_spec::DependencySpec;
pub use helpers::{ConfigCandidates, LoadedConfig};

use crate::core::DekubeError;
use crate::version::VersionConstraint;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

/// Artifact-selection keys of the declarative project config.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Distribution (base artifact) name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution: Option<String>,

    /// Distribution version pin.
    #[serde(
        default,
        deserialize_with = "scalar_as_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub distribution_version: Option<String>,

    /// Legacy spelling of [`Self::distribution_version`].
    #[serde(
        default,
        deserialize_with = "scalar_as_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub core_version: Option<String>,

    /// Extension tokens, `name` or `name==version`.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub depends: Vec<String>,
}

impl ProjectConfig {
    /// Parse config content. `origin` names the file in error messages.
    ///
    /// An empty document is an empty config.
    ///
    /// # Errors
    ///
    /// Returns [`DekubeError::ConfigError`] when the YAML is malformed or a
    /// selection key has the wrong type.
    pub fn parse(content: &str, origin: &Path) -> Result<Self, DekubeError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| {
            DekubeError::config(format!("failed to parse {}: {e}", origin.display()))
        })
    }

    /// Read and parse a config file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read, or a configuration
    /// error if it does not parse.
    pub fn load(path: &Path) -> Result<Self, DekubeError> {
        let content = std::fs::read_to_string(path).map_err(|e| DekubeError::FileSystemError {
            operation: format!("read config ({e})"),
            path: path.display().to_string(),
        })?;
        Self::parse(&content, path)
    }

    /// Distribution pin, falling back to the legacy `core_version` key.
    #[must_use]
    pub fn distribution_constraint(&self) -> VersionConstraint {
        self.distribution_version
            .as_ref()
            .or(self.core_version.as_ref())
            .map_or(VersionConstraint::Latest, |v| VersionConstraint::Pinned(v.clone()))
    }

    /// Parse every `depends` entry.
    ///
    /// # Errors
    ///
    /// Returns the first malformed token as a [`DekubeError::ConfigError`].
    pub fn dependency_specs(&self) -> Result<Vec<DependencySpec>, DekubeError> {
        self.depends.iter().map(|token| DependencySpec::parse(token)).collect()
    }
}

/// Accept `v2.0.0`, `2.0` or `2` for version keys; YAML reads the last two as numbers.
fn scalar_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let value = Option::<serde_yaml::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_yaml::Value::Null) => Ok(None),
        Some(serde_yaml::Value::String(s)) => {
            let trimmed = s.trim();
            Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
        }
        Some(serde_yaml::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!("expected a version string, found {other:?}"))),
    }
}

/// A bare `depends:` key reads as null; treat it as an empty list.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

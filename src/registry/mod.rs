//! Static registries of distributions and extensions.
//!
//! A registry maps artifact names to where their file lives and what they
//! depend on. Distributions and extensions live in two separate registries
//! with the same shape; names never cross between them.
//!
//! # Document format
//!
//! ```json
//! {
//!   "schema_version": 1,
//!   "extensions": {
//!     "trust-manager": {
//!       "repo": "dekubeio/dekube-provider-trust-manager",
//!       "file": "trust_manager.py",
//!       "description": "trust-manager bundles",
//!       "depends": ["cert-manager==0.1.0"],
//!       "incompatible": []
//!     }
//!   }
//! }
//! ```
//!
//! A distributions document uses the `distributions` key instead. A missing
//! `schema_version` reads as `1`.

pub mod loader;

pub use loader::RegistrySource;

use crate::constants::SUPPORTED_REGISTRY_SCHEMA;
use crate::core::{ArtifactKind, DekubeError};
use crate::manifest::DependencySpec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One artifact known to a registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    /// Artifact name, taken from the document key.
    #[serde(skip)]
    pub name: String,
    /// GitHub `owner/name` holding the artifact.
    pub repo: String,
    /// File to download, relative to the repository root or release assets.
    pub file: String,
    /// Human-readable summary.
    #[serde(default)]
    pub description: String,
    /// `name` / `name==version` tokens resolved in the same registry.
    #[serde(default)]
    pub depends: Vec<String>,
    /// Names that must not be installed alongside this artifact.
    #[serde(default)]
    pub incompatible: Vec<String>,
}

impl RegistryEntry {
    /// Entry with no description, dependencies or incompatibilities.
    pub fn new(name: impl Into<String>, repo: impl Into<String>, file: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            repo: repo.into(),
            file: file.into(),
            description: String::new(),
            depends: Vec::new(),
            incompatible: Vec::new(),
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the dependency tokens.
    #[must_use]
    pub fn with_depends<I, S>(mut self, depends: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends = depends.into_iter().map(Into::into).collect();
        self
    }

    /// Set the incompatible names.
    #[must_use]
    pub fn with_incompatible<I, S>(mut self, incompatible: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.incompatible = incompatible.into_iter().map(Into::into).collect();
        self
    }

    /// Parsed `depends` edges.
    ///
    /// # Errors
    ///
    /// Returns a configuration error naming this entry and the bad token.
    pub fn dependency_specs(&self) -> Result<Vec<DependencySpec>, DekubeError> {
        self.depends
            .iter()
            .map(|token| {
                DependencySpec::parse(token).map_err(|e| {
                    DekubeError::config(format!("registry entry '{}': {e}", self.name))
                })
            })
            .collect()
    }

    fn validate(&self) -> Result<(), String> {
        let mut parts = self.repo.split('/');
        let well_formed = matches!(
            (parts.next(), parts.next(), parts.next()),
            (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty()
        );
        if !well_formed {
            return Err(format!("entry '{}': repo '{}' is not 'owner/name'", self.name, self.repo));
        }
        if self.file.trim().is_empty() {
            return Err(format!("entry '{}': empty file", self.name));
        }
        self.dependency_specs().map_err(|e| e.to_string())?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct RegistryDocument {
    #[serde(default = "default_schema_version")]
    schema_version: u32,
    #[serde(default)]
    extensions: Option<BTreeMap<String, RegistryEntry>>,
    #[serde(default)]
    distributions: Option<BTreeMap<String, RegistryEntry>>,
}

const fn default_schema_version() -> u32 {
    1
}

/// Immutable name → entry mapping for one artifact kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    kind: ArtifactKind,
    entries: BTreeMap<String, RegistryEntry>,
}

impl Registry {
    /// Build a registry from entries.
    pub fn from_entries(kind: ArtifactKind, entries: impl IntoIterator<Item = RegistryEntry>) -> Self {
        Self {
            kind,
            entries: entries.into_iter().map(|e| (e.name.clone(), e)).collect(),
        }
    }

    /// An empty registry.
    #[must_use]
    pub fn empty(kind: ArtifactKind) -> Self {
        Self::from_entries(kind, [])
    }

    /// Parse a JSON registry document. `location` names it in errors.
    ///
    /// # Errors
    ///
    /// - [`DekubeError::ConfigError`] for an unsupported `schema_version`
    /// - [`DekubeError::RegistryError`] for malformed JSON, a missing
    ///   `extensions`/`distributions` key or an invalid entry
    pub fn parse(content: &str, kind: ArtifactKind, location: &str) -> Result<Self, DekubeError> {
        let invalid = |reason: String| DekubeError::RegistryError {
            location: location.to_string(),
            reason,
        };

        let document: RegistryDocument =
            serde_json::from_str(content).map_err(|e| invalid(e.to_string()))?;

        if document.schema_version != SUPPORTED_REGISTRY_SCHEMA {
            return Err(DekubeError::config(format!(
                "registry {location} has unsupported schema_version {} (supported: {SUPPORTED_REGISTRY_SCHEMA})",
                document.schema_version
            )));
        }

        let entries = match kind {
            ArtifactKind::Extension => document.extensions,
            ArtifactKind::Distribution => document.distributions,
        }
        .ok_or_else(|| invalid(format!("missing '{}' key", kind.registry_key())))?;

        let entries = entries
            .into_iter()
            .map(|(name, mut entry)| {
                entry.name = name;
                entry.validate().map(|()| entry)
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(invalid)?;

        Ok(Self::from_entries(kind, entries))
    }

    /// Which namespace this registry serves.
    #[must_use]
    pub const fn kind(&self) -> ArtifactKind {
        self.kind
    }

    /// Entry for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RegistryEntry> {
        self.entries.get(name)
    }

    /// Entry for `name`, or [`DekubeError::UnknownArtifact`].
    ///
    /// `required_by` names the dependent when the lookup follows a `depends`
    /// edge.
    ///
    /// # Errors
    ///
    /// Returns [`DekubeError::UnknownArtifact`] listing the available names.
    pub fn require(
        &self,
        name: &str,
        required_by: Option<&str>,
    ) -> Result<&RegistryEntry, DekubeError> {
        self.entries.get(name).ok_or_else(|| DekubeError::UnknownArtifact {
            kind: self.kind.label().to_string(),
            name: name.to_string(),
            required_by: required_by.map(ToString::to_string),
            available: self.names().into_iter().map(ToString::to_string).collect(),
        })
    }

    /// Known names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Entries sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.values()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

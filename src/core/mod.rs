//! Core types and error handling for dekube-manager.
//!
//! This module holds the pieces every other module depends on: the
//! [`DekubeError`] taxonomy, the [`ErrorContext`] used to render errors for
//! users, and [`ArtifactKind`], which separates the two registry namespaces.

pub mod error;

pub use error::{DekubeError, ErrorContext, user_friendly_error};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Registry namespace an artifact belongs to.
///
/// Distributions and extensions share the registry shape but never share
/// names: a distribution called `core` and an extension called `core` are
/// unrelated artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// The base artifact, installed at the root of the install directory.
    Distribution,
    /// Extension modules, installed under the `extensions/` subdirectory.
    Extension,
}

impl ArtifactKind {
    /// Singular lowercase label used in messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Distribution => "distribution",
            Self::Extension => "extension",
        }
    }

    /// Key of the entry map inside a registry document.
    #[must_use]
    pub const fn registry_key(self) -> &'static str {
        match self {
            Self::Distribution => "distributions",
            Self::Extension => "extensions",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

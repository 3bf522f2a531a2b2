//! Wishlist types: what the user asked for before dependency expansion.
//!
//! A wishlist is built fresh on every invocation by the [`merger`] from the
//! command line and the declarative project config. Each entry remembers its
//! [`Origin`], which decides precedence but never appears in the final plan.

pub mod merger;

pub use merger::{CliRequest, MergedSelection, SpecMerger};

use crate::version::VersionConstraint;
use serde::Serialize;
use std::fmt;

/// Where a wishlist entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Positional token or flag on the command line.
    Cli,
    /// `depends` list (or distribution keys) of the project config.
    DeclaredConfig,
    /// Reached through a registry `depends` edge.
    TransitiveDependency,
    /// Built-in default, only used for the distribution.
    BuiltinDefault,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Cli => "command line",
            Self::DeclaredConfig => "project config",
            Self::TransitiveDependency => "dependency",
            Self::BuiltinDefault => "default",
        })
    }
}

/// One requested artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WishlistEntry {
    /// Artifact name.
    pub name: String,
    /// Requested version.
    pub constraint: VersionConstraint,
    /// Source of the request.
    pub origin: Origin,
}

impl WishlistEntry {
    /// Build an entry.
    pub fn new(name: impl Into<String>, constraint: VersionConstraint, origin: Origin) -> Self {
        Self {
            name: name.into(),
            constraint,
            origin,
        }
    }
}

impl fmt::Display for WishlistEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.constraint {
            VersionConstraint::Latest => f.write_str(&self.name),
            VersionConstraint::Pinned(v) => write!(f, "{}=={v}", self.name),
        }
    }
}

/// Ordered extension wishlist with unique names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Wishlist {
    entries: Vec<WishlistEntry>,
}

impl Wishlist {
    /// Build from entries already known to have unique names.
    pub(crate) fn from_unique(entries: Vec<WishlistEntry>) -> Self {
        Self {
            entries,
        }
    }

    /// Entries in wishlist order.
    #[must_use]
    pub fn entries(&self) -> &[WishlistEntry] {
        &self.entries
    }

    /// Iterate entries in wishlist order.
    pub fn iter(&self) -> std::slice::Iter<'_, WishlistEntry> {
        self.entries.iter()
    }

    /// Entry for `name`, if requested.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&WishlistEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Number of requested extensions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was requested.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Wishlist {
    type Item = &'a WishlistEntry;
    type IntoIter = std::slice::Iter<'a, WishlistEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

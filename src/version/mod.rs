//! Version constraints and tag handling.
//!
//! Versions are opaque tag tokens. There are no ranges: an artifact is either
//! pinned to one exact tag or left at [`VersionConstraint::Latest`], which the
//! [`reconciler`] binds to the newest release of the artifact's repository.
//!
//! # Tag Normalization
//!
//! Users write `keycloak==0.2.0` while repositories tag `v0.2.0`. A pin is
//! therefore tried as the `v`-prefixed tag first and as written second, see
//! [`candidate_tags`].

pub mod reconciler;

pub use reconciler::VersionReconciler;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Version requirement for one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "type", content = "version")]
pub enum VersionConstraint {
    /// No pin: resolve to the newest release.
    #[default]
    Latest,
    /// Exact tag token as the user or registry wrote it.
    Pinned(String),
}

impl VersionConstraint {
    /// Build a pinned constraint.
    pub fn pinned(version: impl Into<String>) -> Self {
        Self::Pinned(version.into())
    }

    /// Whether the constraint carries an explicit pin.
    #[must_use]
    pub const fn is_pinned(&self) -> bool {
        matches!(self, Self::Pinned(_))
    }

    /// The pinned token, if any.
    #[must_use]
    pub fn pin(&self) -> Option<&str> {
        match self {
            Self::Latest => None,
            Self::Pinned(v) => Some(v),
        }
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str("latest"),
            Self::Pinned(v) => f.write_str(v),
        }
    }
}

/// Ensure a version string carries the `v` prefix used for release tags.
#[must_use]
pub fn normalize_tag(version: &str) -> String {
    if version.starts_with('v') {
        version.to_string()
    } else {
        format!("v{version}")
    }
}

/// Tags to probe for a pinned version, in order of preference.
///
/// ```
/// use dekube_manager::version::candidate_tags;
///
/// assert_eq!(candidate_tags("0.1.0"), vec!["v0.1.0", "0.1.0"]);
/// assert_eq!(candidate_tags("v2.0.0"), vec!["v2.0.0"]);
/// ```
#[must_use]
pub fn candidate_tags(version: &str) -> Vec<String> {
    let normalized = normalize_tag(version);
    if normalized == version {
        vec![normalized]
    } else {
        vec![normalized, version.to_string()]
    }
}

//! Parsing of `name` / `name==version` dependency tokens.
//!
//! The same token grammar appears on the command line, in the config file's
//! `depends` list and in registry `depends` edges. All three go through
//! [`DependencySpec::parse`] so the rules live in one place.

use crate::core::DekubeError;
use crate::version::VersionConstraint;
use std::fmt;

/// Separator between an artifact name and its pinned version.
pub const PIN_SEPARATOR: &str = "==";

/// A parsed dependency token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DependencySpec {
    /// `name`: no version requirement.
    Bare(String),
    /// `name==version`: exact pin.
    Pinned {
        /// Artifact name
        name: String,
        /// Opaque version token
        version: String,
    },
}

impl DependencySpec {
    /// Parse a token, trimming whitespace around the name and version.
    ///
    /// # Errors
    ///
    /// Returns [`DekubeError::ConfigError`] naming the token when the name is
    /// empty, the version after `==` is empty, or the token holds more than
    /// one `==`.
    ///
    /// # Examples
    ///
    /// ```
    /// use dekube_manager::manifest::DependencySpec;
    ///
    /// let spec = DependencySpec::parse("keycloak==0.2.0").unwrap();
    /// assert_eq!(spec.name(), "keycloak");
    /// assert!(DependencySpec::parse("a==1==2").is_err());
    /// ```
    pub fn parse(token: &str) -> Result<Self, DekubeError> {
        let mut parts = token.split(PIN_SEPARATOR);
        let name = parts.next().unwrap_or_default().trim();
        let version = parts.next().map(str::trim);

        if parts.next().is_some() {
            return Err(DekubeError::config(format!(
                "invalid dependency '{token}': more than one '{PIN_SEPARATOR}'"
            )));
        }
        if name.is_empty() {
            return Err(DekubeError::config(format!("invalid dependency '{token}': empty name")));
        }

        match version {
            None => Ok(Self::Bare(name.to_string())),
            Some("") => Err(DekubeError::config(format!(
                "invalid dependency '{token}': empty version after '{PIN_SEPARATOR}'"
            ))),
            Some(version) => Ok(Self::Pinned {
                name: name.to_string(),
                version: version.to_string(),
            }),
        }
    }

    /// Artifact name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Bare(name) | Self::Pinned { name, .. } => name,
        }
    }

    /// Version requirement carried by the token.
    #[must_use]
    pub fn constraint(&self) -> VersionConstraint {
        match self {
            Self::Bare(_) => VersionConstraint::Latest,
            Self::Pinned { version, .. } => VersionConstraint::Pinned(version.clone()),
        }
    }
}

impl fmt::Display for DependencySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bare(name) => f.write_str(name),
            Self::Pinned { name, version } => write!(f, "{name}{PIN_SEPARATOR}{version}"),
        }
    }
}

//! Merge command-line and project-config requests into one wishlist.
//!
//! # Precedence
//!
//! Per artifact, the command line beats the project config; the registry
//! contributes nothing at this stage. The two sources are merged by union of
//! names, so `dekube-manager install keycloak` with `depends: [cert-manager]`
//! installs both. When both name the same artifact the command-line
//! constraint replaces the config's outright.
//!
//! Ordering is deterministic: config entries in declared order (with
//! command-line overrides applied in place), then command-line-only names in
//! the order they were given.
//!
//! # Distribution
//!
//! `--distribution` / `--distribution-version` beat the config's
//! `distribution` / `distribution_version` (or legacy `core_version`), which
//! beat the built-in default. `--no-distribution` selects nothing.

use super::{Origin, Wishlist, WishlistEntry};
use crate::core::DekubeError;
use crate::manifest::{DependencySpec, ProjectConfig};
use crate::version::VersionConstraint;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Selection flags and tokens taken from the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliRequest {
    /// Positional `name[==version]` tokens.
    pub extensions: Vec<String>,
    /// `--distribution`
    pub distribution: Option<String>,
    /// `--distribution-version` (or its `--core-version` alias)
    pub distribution_version: Option<String>,
    /// `--no-distribution`
    pub no_distribution: bool,
}

/// Result of merging: the extension wishlist and the distribution choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedSelection {
    /// Extensions to resolve.
    pub wishlist: Wishlist,
    /// Distribution to install, `None` when suppressed.
    pub distribution: Option<WishlistEntry>,
}

impl MergedSelection {
    /// Nothing to install at all. Valid, and handled as a no-op run.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.wishlist.is_empty() && self.distribution.is_none()
    }
}

/// Combines the input layers into a [`MergedSelection`].
#[derive(Debug, Clone)]
pub struct SpecMerger {
    default_distribution: String,
}

impl Default for SpecMerger {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_DISTRIBUTION)
    }
}

impl SpecMerger {
    /// Merger with a given built-in distribution name.
    pub fn new(default_distribution: impl Into<String>) -> Self {
        Self {
            default_distribution: default_distribution.into(),
        }
    }

    /// Merge the command line with an optional project config.
    ///
    /// # Errors
    ///
    /// Returns [`DekubeError::ConfigError`] for malformed tokens, an empty
    /// distribution flag, or when one source pins the same artifact to two
    /// different versions.
    pub fn merge(
        &self,
        cli: &CliRequest,
        config: Option<&ProjectConfig>,
    ) -> Result<MergedSelection, DekubeError> {
        let cli_specs = cli
            .extensions
            .iter()
            .map(|token| DependencySpec::parse(token))
            .collect::<Result<Vec<_>, _>>()?;
        let config_specs = match config {
            Some(config) => config.dependency_specs()?,
            None => Vec::new(),
        };

        let wishlist = merge_wishlist(&cli_specs, &config_specs)?;
        let distribution = self.select_distribution(cli, config)?;

        debug!(
            "Merged wishlist: [{}], distribution: {}",
            wishlist.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "),
            distribution.as_ref().map_or_else(|| "none".to_string(), ToString::to_string)
        );

        Ok(MergedSelection {
            wishlist,
            distribution,
        })
    }

    /// Pick the distribution entry.
    ///
    /// A config pin only applies when the selected distribution is the one
    /// the config names, or the built-in default when the config names none.
    ///
    /// # Errors
    ///
    /// Returns [`DekubeError::ConfigError`] when `--distribution` or
    /// `--distribution-version` is empty.
    pub fn select_distribution(
        &self,
        cli: &CliRequest,
        config: Option<&ProjectConfig>,
    ) -> Result<Option<WishlistEntry>, DekubeError> {
        if cli.no_distribution {
            if cli.distribution.is_some() || cli.distribution_version.is_some() {
                warn!("--no-distribution given; ignoring distribution flags");
            }
            return Ok(None);
        }

        let cli_name = non_empty_flag("--distribution", cli.distribution.as_deref())?;
        let cli_version =
            non_empty_flag("--distribution-version", cli.distribution_version.as_deref())?;

        let config_name = config.and_then(|c| c.distribution.as_deref());
        let (name, name_origin) = match (cli_name, config_name) {
            (Some(name), _) => (name, Origin::Cli),
            (None, Some(name)) => (name, Origin::DeclaredConfig),
            (None, None) => (self.default_distribution.as_str(), Origin::BuiltinDefault),
        };

        if let Some(version) = cli_version {
            return Ok(Some(WishlistEntry::new(name, VersionConstraint::pinned(version), Origin::Cli)));
        }

        let config_target = config_name.unwrap_or(self.default_distribution.as_str());
        if let Some(config) = config.filter(|_| config_target == name) {
            let constraint = config.distribution_constraint();
            if constraint.is_pinned() {
                return Ok(Some(WishlistEntry::new(name, constraint, Origin::DeclaredConfig)));
            }
        }

        Ok(Some(WishlistEntry::new(name, VersionConstraint::Latest, name_origin)))
    }
}

/// Trimmed flag value; an empty one is rejected rather than read as a pin.
fn non_empty_flag<'a>(flag: &str, value: Option<&'a str>) -> Result<Option<&'a str>, DekubeError> {
    match value.map(str::trim) {
        Some("") => Err(DekubeError::config(format!("{flag} must not be empty"))),
        other => Ok(other),
    }
}

/// Union of both sources; the command line wins per name.
fn merge_wishlist(
    cli_specs: &[DependencySpec],
    config_specs: &[DependencySpec],
) -> Result<Wishlist, DekubeError> {
    let cli = collapse_duplicates(cli_specs, Origin::Cli)?;
    let config = collapse_duplicates(config_specs, Origin::DeclaredConfig)?;

    let cli_by_name: HashMap<&str, &WishlistEntry> =
        cli.iter().map(|e| (e.name.as_str(), e)).collect();

    let mut entries = Vec::with_capacity(cli.len() + config.len());
    for declared in &config {
        match cli_by_name.get(declared.name.as_str()) {
            Some(&overriding) => {
                if overriding.constraint != declared.constraint {
                    debug!(
                        "Command line overrides '{}' from project config ({} -> {})",
                        declared.name, declared.constraint, overriding.constraint
                    );
                }
                entries.push(overriding.clone());
            }
            None => entries.push(declared.clone()),
        }
    }
    for requested in cli {
        if !config.iter().any(|e| e.name == requested.name) {
            entries.push(requested);
        }
    }

    Ok(Wishlist::from_unique(entries))
}

/// Collapse repeated names within one source.
///
/// Identical repeats are dropped; a bare repeat of a pinned name keeps the
/// pin; two different pins are a configuration error.
fn collapse_duplicates(
    specs: &[DependencySpec],
    origin: Origin,
) -> Result<Vec<WishlistEntry>, DekubeError> {
    let mut entries: Vec<WishlistEntry> = Vec::with_capacity(specs.len());

    for spec in specs {
        let constraint = spec.constraint();
        let Some(existing) = entries.iter_mut().find(|e| e.name == spec.name()) else {
            entries.push(WishlistEntry::new(spec.name(), constraint, origin));
            continue;
        };

        match (&existing.constraint, &constraint) {
            (VersionConstraint::Pinned(a), VersionConstraint::Pinned(b)) if a != b => {
                return Err(DekubeError::config(format!(
                    "'{}' is requested twice in the {origin} with different versions: {a} and {b}",
                    spec.name()
                )));
            }
            (VersionConstraint::Latest, VersionConstraint::Pinned(_)) => {
                existing.constraint = constraint;
            }
            _ => {}
        }
    }

    Ok(entries)
}

//! Error handling for dekube-manager
//!
//! This module provides the error taxonomy of the resolver and fetcher, and the
//! user-friendly rendering used at the CLI boundary. The error system follows two
//! principles:
//! 1. **Strongly-typed errors** so callers (and tests) can match on the failure
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! - [`DekubeError`] - Enumerated error types for every failure path
//! - [`ErrorContext`] - Wrapper that adds details and suggestions for display
//!
//! # Error Categories
//!
//! - **Configuration**: [`DekubeError::ConfigError`], [`DekubeError::CircularDependency`]
//!   (fatal, raised before any network or filesystem activity)
//! - **Resolution**: [`DekubeError::UnknownArtifact`], [`DekubeError::DependencyConflict`],
//!   [`DekubeError::IncompatibleArtifacts`] (fatal, no partial plan is produced)
//! - **Reconciliation**: [`DekubeError::VersionNotFound`], [`DekubeError::NoReleases`],
//!   collected per artifact into [`DekubeError::ReconciliationFailed`]
//! - **Transport and filesystem**: [`DekubeError::NetworkError`],
//!   [`DekubeError::FileNotFound`], [`DekubeError::FileSystemError`]
//!
//! Every variant names the artifact(s) or path involved.
//!
//! # Examples
//!
//! ```rust,no_run
//! use dekube_manager::core::{DekubeError, user_friendly_error};
//!
//! let error = DekubeError::VersionNotFound {
//!     name: "keycloak".to_string(),
//!     version: "9.9.9".to_string(),
//!     repo: "dekubeio/dekube-provider-keycloak".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for dekube-manager operations.
#[derive(Error, Debug)]
pub enum DekubeError {
    /// Malformed input: bad `name==version` token, invalid config, duplicate pins.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// The registry's `depends` graph contains a cycle.
    ///
    /// This is a configuration error of the registry itself; the resolver never
    /// breaks a cycle silently.
    ///
    /// # Fields
    /// - `chain`: The dependency chain showing the circular reference
    #[error("Circular dependency detected: {chain}")]
    CircularDependency {
        /// String representation of the circular dependency chain
        chain: String,
    },

    /// An artifact name is absent from its registry.
    #[error("{}", unknown_artifact_message(.kind, .name, .required_by.as_deref()))]
    UnknownArtifact {
        /// Registry namespace the name was looked up in ("extension" or "distribution")
        kind: String,
        /// The unknown name
        name: String,
        /// The artifact whose `depends` list referenced the name, if any
        required_by: Option<String>,
        /// Names the registry does know, sorted
        available: Vec<String>,
    },

    /// Two transitive edges pin the same artifact to different versions.
    #[error(
        "Dependency conflict for '{name}': '{first_required_by}' requires {first_version}, \
         but '{second_required_by}' requires {second_version}"
    )]
    DependencyConflict {
        /// Artifact pinned twice
        name: String,
        /// Pin discovered first
        first_version: String,
        /// Dependent that declared the first pin
        first_required_by: String,
        /// Conflicting pin discovered later
        second_version: String,
        /// Dependent that declared the second pin
        second_required_by: String,
    },

    /// Two planned artifacts declare each other incompatible.
    #[error("Extensions '{first}' and '{second}' are incompatible")]
    IncompatibleArtifacts {
        /// Artifact declaring the incompatibility
        first: String,
        /// Artifact it is incompatible with
        second: String,
    },

    /// A pinned version does not exist as a tag on the artifact's repository.
    #[error("Version '{version}' not found for '{name}' in {repo}")]
    VersionNotFound {
        /// Artifact name
        name: String,
        /// The pinned version as requested
        version: String,
        /// Repository that was queried
        repo: String,
    },

    /// `latest` was requested but the repository has no release.
    #[error("No releases found for '{name}' in {repo}")]
    NoReleases {
        /// Artifact name
        name: String,
        /// Repository that was queried
        repo: String,
    },

    /// One or more artifacts could not be bound to a version.
    #[error("Version resolution failed for {} artifact(s):\n{}", .failures.len(), format_failures(.failures))]
    ReconciliationFailed {
        /// Every per-artifact failure, in plan order
        failures: Vec<DekubeError>,
    },

    /// A network call failed after exhausting its retry budget.
    #[error("Network error: {operation}: {reason}")]
    NetworkError {
        /// The network operation that failed
        operation: String,
        /// Reason for the network failure
        reason: String,
    },

    /// An artifact file is missing at its resolved version.
    #[error("File for '{name}' not found at {url}")]
    FileNotFound {
        /// Artifact name
        name: String,
        /// URL that returned 404
        url: String,
    },

    /// A registry document could not be read or parsed.
    #[error("Invalid registry at {location}: {reason}")]
    RegistryError {
        /// URL or path of the registry document
        location: String,
        /// Why the document was rejected
        reason: String,
    },

    /// File system error
    #[error("File system error: {operation}: {path}")]
    FileSystemError {
        /// The file system operation that failed
        operation: String,
        /// Path where the file system error occurred
        path: String,
    },

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

fn unknown_artifact_message(kind: &str, name: &str, required_by: Option<&str>) -> String {
    match required_by {
        Some(parent) => format!(
            "{} '{parent}' depends on '{name}', which is not in the registry",
            capitalize(kind)
        ),
        None => format!("Unknown {kind} '{name}'"),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn format_failures(failures: &[DekubeError]) -> String {
    failures.iter().map(|f| format!("  - {f}")).collect::<Vec<_>>().join("\n")
}

impl DekubeError {
    /// Shorthand for [`DekubeError::ConfigError`].
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Whether this error belongs to the configuration category.
    ///
    /// Configuration errors are raised before any network or filesystem activity.
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigError { .. } | Self::CircularDependency { .. })
    }
}

/// Error context wrapper that provides user-friendly error information
///
/// `ErrorContext` wraps a [`DekubeError`] and adds optional details and a
/// suggestion for resolution. When displayed, errors show:
/// 1. **Error**: The main error message in red
/// 2. **Details**: Additional context in yellow (optional)
/// 3. **Suggestion**: Actionable steps in green (optional)
///
/// # Examples
///
/// ```rust,no_run
/// use dekube_manager::core::{DekubeError, ErrorContext};
///
/// let context = ErrorContext::new(DekubeError::config("bad token 'a==b==c'"))
///     .with_suggestion("Use 'name' or 'name==version'")
///     .with_details("Each depends entry accepts at most one '=='");
///
/// context.display();
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: DekubeError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context from a [`DekubeError`]
    #[must_use]
    pub const fn new(error: DekubeError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into a user-friendly format with contextual suggestions.
///
/// [`DekubeError`] values anywhere at the top of the chain get tailored
/// suggestions; I/O errors get generic guidance; anything else is
/// rendered with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let error = match error.downcast::<DekubeError>() {
        Ok(dekube_error) => return create_error_context(dekube_error),
        Err(other) => other,
    };

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(DekubeError::FileSystemError {
                    operation: "file access".to_string(),
                    path: "unknown".to_string(),
                })
                .with_suggestion("Check the permissions of the install directory")
                .with_details(io_error.to_string());
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(DekubeError::FileSystemError {
                    operation: "file access".to_string(),
                    path: "unknown".to_string(),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct")
                .with_details(io_error.to_string());
            }
            _ => {}
        }
    }

    let mut message = error.to_string();
    let chain: Vec<String> =
        error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(DekubeError::Other {
        message,
    })
}

/// Map each [`DekubeError`] variant to an [`ErrorContext`] with suggestions.
fn create_error_context(error: DekubeError) -> ErrorContext {
    match &error {
        DekubeError::ConfigError { .. } => ErrorContext::new(error).with_suggestion(
            "Extensions are written as 'name' or 'name==version'. Check dekube.yaml and the command line",
        ),

        DekubeError::CircularDependency { chain } => {
            let details = format!(
                "Registry entries form a cycle: {chain}. Extensions cannot depend on themselves directly or indirectly"
            );
            ErrorContext::new(error)
                .with_suggestion("Report the cycle to the registry maintainers")
                .with_details(details)
        }

        DekubeError::UnknownArtifact { name, available, kind, .. } => {
            let suggestion = match closest_name(name, available) {
                Some(candidate) => format!("Did you mean '{candidate}'?"),
                None => format!("Run 'dekube-manager info' to list available {kind}s"),
            };
            let details = if available.is_empty() {
                "The registry is empty".to_string()
            } else {
                format!("Available: {}", available.join(", "))
            };
            ErrorContext::new(error).with_suggestion(suggestion).with_details(details)
        }

        DekubeError::DependencyConflict { name, .. } => {
            let suggestion = format!(
                "Pin '{name}' explicitly in dekube.yaml or on the command line to choose a version"
            );
            ErrorContext::new(error)
                .with_suggestion(suggestion)
                .with_details("Only a top-level request may override a version pinned by a dependency")
        }

        DekubeError::IncompatibleArtifacts { first, .. } => {
            let suggestion = format!("Use --ignore-compatibility-errors {first} to override");
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        DekubeError::VersionNotFound { repo, .. } => {
            let suggestion = format!("Check the tags published at https://github.com/{repo}/tags");
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        DekubeError::ReconciliationFailed { .. } => ErrorContext::new(error)
            .with_suggestion("Fix the versions listed above; every failing artifact is reported at once"),

        DekubeError::NetworkError { .. } => ErrorContext::new(error)
            .with_suggestion("Check your internet connection. Set GITHUB_TOKEN if you are hitting API rate limits")
            .with_details("Transient failures were retried before giving up"),

        DekubeError::RegistryError { .. } => ErrorContext::new(error)
            .with_suggestion("Check the registry location in ~/.dekube/config.toml"),

        _ => ErrorContext::new(error),
    }
}

/// Closest known name by Jaro-Winkler similarity, if reasonably close.
fn closest_name<'a>(name: &str, candidates: &'a [String]) -> Option<&'a str> {
    candidates
        .iter()
        .map(|candidate| (candidate, strsim::jaro_winkler(name, candidate)))
        .filter(|(_, score)| *score >= 0.8)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(candidate, _)| candidate.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_artifact_display() {
        let root = DekubeError::UnknownArtifact {
            kind: "extension".to_string(),
            name: "nope".to_string(),
            required_by: None,
            available: vec![],
        };
        assert_eq!(root.to_string(), "Unknown extension 'nope'");

        let edge = DekubeError::UnknownArtifact {
            kind: "extension".to_string(),
            name: "nope".to_string(),
            required_by: Some("trust-manager".to_string()),
            available: vec![],
        };
        assert_eq!(
            edge.to_string(),
            "Extension 'trust-manager' depends on 'nope', which is not in the registry"
        );
    }

    #[test]
    fn test_dependency_conflict_names_both_pins() {
        let error = DekubeError::DependencyConflict {
            name: "cert-manager".to_string(),
            first_version: "0.1.0".to_string(),
            first_required_by: "trust-manager".to_string(),
            second_version: "0.2.0".to_string(),
            second_required_by: "servicemonitor".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("cert-manager"));
        assert!(message.contains("0.1.0"));
        assert!(message.contains("0.2.0"));
    }

    #[test]
    fn test_reconciliation_failed_lists_every_failure() {
        let error = DekubeError::ReconciliationFailed {
            failures: vec![
                DekubeError::VersionNotFound {
                    name: "keycloak".to_string(),
                    version: "9.9.9".to_string(),
                    repo: "org/keycloak".to_string(),
                },
                DekubeError::NoReleases {
                    name: "nginx".to_string(),
                    repo: "org/nginx".to_string(),
                },
            ],
        };
        let message = error.to_string();
        assert!(message.starts_with("Version resolution failed for 2 artifact(s)"));
        assert!(message.contains("  - Version '9.9.9' not found for 'keycloak'"));
        assert!(message.contains("  - No releases found for 'nginx'"));
    }

    #[test]
    fn test_config_category() {
        assert!(DekubeError::config("x").is_config_error());
        assert!(
            DekubeError::CircularDependency {
                chain: "a → a".to_string()
            }
            .is_config_error()
        );
        assert!(
            !DekubeError::NoReleases {
                name: "a".to_string(),
                repo: "o/a".to_string()
            }
            .is_config_error()
        );
    }

    #[test]
    fn test_user_friendly_unknown_artifact_suggests_close_name() {
        let error = DekubeError::UnknownArtifact {
            kind: "extension".to_string(),
            name: "keycloack".to_string(),
            required_by: None,
            available: vec!["cert-manager".to_string(), "keycloak".to_string()],
        };
        let ctx = user_friendly_error(anyhow::Error::from(error));
        assert_eq!(ctx.suggestion.as_deref(), Some("Did you mean 'keycloak'?"));
        assert_eq!(ctx.details.as_deref(), Some("Available: cert-manager, keycloak"));
    }

    #[test]
    fn test_user_friendly_error_generic_includes_chain() {
        let error = anyhow::anyhow!("root cause").context("while installing");
        let ctx = user_friendly_error(error);
        let rendered = ctx.to_string();
        assert!(rendered.contains("while installing"));
        assert!(rendered.contains("Caused by:"));
        assert!(rendered.contains("root cause"));
    }

    #[test]
    fn test_user_friendly_io_error_behind_context() {
        let error = anyhow::Error::from(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"))
            .context("Failed to read global config from /tmp/config.toml");
        let ctx = user_friendly_error(error);
        assert!(matches!(ctx.error, DekubeError::FileSystemError { .. }));
        assert_eq!(ctx.details.as_deref(), Some("gone"));
    }

    #[test]
    fn test_error_context_display() {
        let ctx = ErrorContext::new(DekubeError::config("bad"))
            .with_details("some details")
            .with_suggestion("do this");
        assert_eq!(
            ctx.to_string(),
            "Configuration error: bad\nDetails: some details\nSuggestion: do this"
        );
    }
}

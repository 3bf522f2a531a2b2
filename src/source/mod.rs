//! Release metadata and artifact downloads.
//!
//! The reconciler and installer talk to the outside world only through two
//! traits, so both can be driven by in-memory fakes in tests:
//!
//! - [`ReleaseSource`]: latest release tag and tag existence per repository
//! - [`ArtifactFetcher`]: download URL construction and raw byte fetches
//!
//! [`GitHubClient`] implements both against GitHub.

pub mod github;

pub use github::GitHubClient;

use crate::core::ArtifactKind;
use std::future::Future;
use thiserror::Error;

/// Failure of a single remote call, after retries.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// The server answered 404.
    #[error("not found: {url}")]
    NotFound {
        /// Requested URL
        url: String,
    },

    /// Any other non-success status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// Status code
        status: u16,
        /// Requested URL
        url: String,
    },

    /// Connection, timeout or body read failure.
    #[error("request to {url} failed: {reason}")]
    Transport {
        /// Requested URL
        url: String,
        /// Underlying error text
        reason: String,
    },

    /// The URL could not be turned into a request.
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl {
        /// Offending URL
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// The response body was not what the endpoint promises.
    #[error("unexpected response from {url}: {reason}")]
    InvalidResponse {
        /// Requested URL
        url: String,
        /// Why the body was rejected
        reason: String,
    },
}

impl SourceError {
    /// Whether another attempt may succeed.
    ///
    /// Transport failures, 5xx and 429 are transient. 404 and other 4xx are
    /// permanent.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::Status { status, .. } => *status >= 500 || *status == 429,
            Self::NotFound { .. } | Self::InvalidUrl { .. } | Self::InvalidResponse { .. } => false,
        }
    }
}

/// Release metadata of artifact repositories.
pub trait ReleaseSource {
    /// Tag of the newest release, `None` when the repository has none.
    fn latest_tag(
        &self,
        repo: &str,
    ) -> impl Future<Output = Result<Option<String>, SourceError>> + Send;

    /// Whether `tag` exists on `repo`.
    fn tag_exists(
        &self,
        repo: &str,
        tag: &str,
    ) -> impl Future<Output = Result<bool, SourceError>> + Send;
}

/// Downloads of artifact files and registry documents.
pub trait ArtifactFetcher {
    /// URL of `file` in `repo` at `tag`.
    ///
    /// Distributions are release assets; extensions are raw files at the tag.
    fn artifact_url(&self, kind: ArtifactKind, repo: &str, tag: &str, file: &str) -> String;

    /// Body of `url`.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, SourceError>> + Send;
}

//! GitHub-backed [`ReleaseSource`] and [`ArtifactFetcher`].
//!
//! Endpoints used:
//!
//! | Purpose | URL |
//! |---------|-----|
//! | Latest release | `{api}/repos/{repo}/releases/latest` |
//! | Tag lookup | `{api}/repos/{repo}/git/ref/tags/{tag}` |
//! | Extension file | `{raw}/{repo}/refs/tags/{tag}/{file}` |
//! | Distribution file | `{release}/{repo}/releases/download/{tag}/{file}` |
//!
//! Every request has a bounded timeout and is retried with exponential
//! backoff while the failure is transient (see [`SourceError::is_transient`]).

use super::{ArtifactFetcher, ReleaseSource, SourceError};
use crate::config::{GitHubSettings, NetworkSettings};
use crate::constants::{MAX_BACKOFF_DELAY_MS, STARTING_BACKOFF_DELAY_MS, USER_AGENT};
use crate::core::{ArtifactKind, DekubeError};
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use std::time::Duration;
use tokio_retry::RetryIf;
use tokio_retry::strategy::ExponentialBackoff;
use tracing::{debug, warn};

const GITHUB_JSON: &str = "application/vnd.github+json";

#[derive(Debug, Deserialize)]
struct Release {
    tag_name: String,
}

/// HTTP client for GitHub releases, tags and raw files.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_base: String,
    raw_base: String,
    release_base: String,
    token: Option<String>,
    max_attempts: usize,
}

impl GitHubClient {
    /// Build a client from the global configuration sections.
    ///
    /// # Errors
    ///
    /// Returns [`DekubeError::NetworkError`] if the TLS backend cannot be
    /// initialised.
    pub fn new(github: &GitHubSettings, network: &NetworkSettings) -> Result<Self, DekubeError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(network.request_timeout())
            .build()
            .map_err(|e| DekubeError::NetworkError {
                operation: "create HTTP client".to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            api_base: github.api_base.trim_end_matches('/').to_string(),
            raw_base: github.raw_base.trim_end_matches('/').to_string(),
            release_base: github.release_base.trim_end_matches('/').to_string(),
            token: github.token.clone(),
            max_attempts: network.max_attempts.max(1),
        })
    }

    /// Delays between attempts: 200ms, 400ms, 800ms... capped at 2s.
    fn retry_strategy(&self) -> impl Iterator<Item = Duration> + Send {
        ExponentialBackoff::from_millis(2)
            .factor(STARTING_BACKOFF_DELAY_MS / 2)
            .max_delay(Duration::from_millis(MAX_BACKOFF_DELAY_MS))
            .take(self.max_attempts - 1)
    }

    async fn get_once(&self, url: &str, json: bool) -> Result<Vec<u8>, SourceError> {
        let mut request = self.http.get(url);
        if json {
            request = request.header(ACCEPT, GITHUB_JSON);
        }
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_builder() {
                SourceError::InvalidUrl {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            } else {
                SourceError::Transport {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(SourceError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await.map_err(|e| SourceError::Transport {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(body.to_vec())
    }

    async fn get(&self, url: &str, json: bool) -> Result<Vec<u8>, SourceError> {
        debug!("GET {url}");
        RetryIf::spawn(
            self.retry_strategy(),
            || self.get_once(url, json),
            |e: &SourceError| {
                let transient = e.is_transient();
                if transient {
                    warn!("Retrying after transient failure: {e}");
                }
                transient
            },
        )
        .await
    }
}

impl ReleaseSource for GitHubClient {
    async fn latest_tag(&self, repo: &str) -> Result<Option<String>, SourceError> {
        let url = format!("{}/repos/{repo}/releases/latest", self.api_base);
        let body = match self.get(&url, true).await {
            Ok(body) => body,
            Err(SourceError::NotFound { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };

        let release: Release =
            serde_json::from_slice(&body).map_err(|e| SourceError::InvalidResponse {
                url,
                reason: e.to_string(),
            })?;
        Ok(Some(release.tag_name))
    }

    async fn tag_exists(&self, repo: &str, tag: &str) -> Result<bool, SourceError> {
        let url = format!("{}/repos/{repo}/git/ref/tags/{tag}", self.api_base);
        match self.get(&url, true).await {
            Ok(_) => Ok(true),
            Err(SourceError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

impl ArtifactFetcher for GitHubClient {
    fn artifact_url(&self, kind: ArtifactKind, repo: &str, tag: &str, file: &str) -> String {
        match kind {
            ArtifactKind::Distribution => {
                format!("{}/{repo}/releases/download/{tag}/{file}", self.release_base)
            }
            ArtifactKind::Extension => format!("{}/{repo}/refs/tags/{tag}/{file}", self.raw_base),
        }
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, SourceError> {
        self.get(url, false).await
    }
}

//! In-memory [`ReleaseSource`] and [`ArtifactFetcher`].

use crate::core::ArtifactKind;
use crate::source::{ArtifactFetcher, ReleaseSource, SourceError};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Releases per repository; the last tag listed is the latest release.
#[derive(Debug, Default)]
pub struct FakeReleaseSource {
    tags: HashMap<String, Vec<String>>,
    failing: HashSet<String>,
    calls: AtomicUsize,
}

impl FakeReleaseSource {
    /// Register `repo` with `tags`, oldest first. An empty list means the
    /// repository exists but has no release.
    #[must_use]
    pub fn with_release(mut self, repo: &str, tags: &[&str]) -> Self {
        self.tags.insert(repo.to_string(), tags.iter().map(ToString::to_string).collect());
        self
    }

    /// Make every call for `repo` fail with a transport error.
    #[must_use]
    pub fn with_failing_repo(mut self, repo: &str) -> Self {
        self.failing.insert(repo.to_string());
        self
    }

    /// Number of calls made so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn check(&self, repo: &str) -> Result<(), SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(repo) {
            return Err(SourceError::Transport {
                url: format!("fake://{repo}"),
                reason: "connection refused".to_string(),
            });
        }
        Ok(())
    }
}

impl ReleaseSource for FakeReleaseSource {
    async fn latest_tag(&self, repo: &str) -> Result<Option<String>, SourceError> {
        self.check(repo)?;
        Ok(self.tags.get(repo).and_then(|tags| tags.last().cloned()))
    }

    async fn tag_exists(&self, repo: &str, tag: &str) -> Result<bool, SourceError> {
        self.check(repo)?;
        Ok(self.tags.get(repo).is_some_and(|tags| tags.iter().any(|t| t == tag)))
    }
}

/// URL → content map. Unknown URLs answer [`SourceError::NotFound`].
#[derive(Debug, Default)]
pub struct FakeFetcher {
    files: HashMap<String, Vec<u8>>,
    fetches: AtomicUsize,
}

impl FakeFetcher {
    /// Serve `content` at `url`.
    #[must_use]
    pub fn with_file(mut self, url: &str, content: impl Into<Vec<u8>>) -> Self {
        self.files.insert(url.to_string(), content.into());
        self
    }

    /// Serve `content` as `file` of `repo` at `tag`.
    #[must_use]
    pub fn with_artifact(
        self,
        kind: ArtifactKind,
        repo: &str,
        tag: &str,
        file: &str,
        content: impl Into<Vec<u8>>,
    ) -> Self {
        let url = self.artifact_url(kind, repo, tag, file);
        self.with_file(&url, content)
    }

    /// Number of fetches made so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl ArtifactFetcher for FakeFetcher {
    fn artifact_url(&self, kind: ArtifactKind, repo: &str, tag: &str, file: &str) -> String {
        format!("fake://{kind}/{repo}/{tag}/{file}")
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>, SourceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.files.get(url).cloned().ok_or_else(|| SourceError::NotFound {
            url: url.to_string(),
        })
    }
}

//! Materializing an [`InstallPlan`] on disk.
//!
//! # Installation Process
//!
//! For each plan entry, distribution first and then extensions in plan
//! order:
//!
//! 1. **Cache check**: with `reuse_cache` set, an existing destination file is
//!    kept as is and the fetch is skipped.
//! 2. **Fetch**: the file is downloaded at its resolved tag; distributions as
//!    release assets, extensions as raw files.
//! 3. **Atomic write**: the content goes to a temporary file next to the
//!    destination, which is then renamed over it.
//!
//! Installed files carry no version metadata; a later run either reuses them
//! verbatim or overwrites them. Entries are processed one at a time, and the
//! first failure stops the run. Files written before the failure stay in
//! place.

use crate::core::DekubeError;
use crate::plan::{InstallPlan, InstallPlanEntry};
use crate::source::{ArtifactFetcher, SourceError};
use crate::utils::{atomic_write, sha256_digest};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info};

/// A file written during the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstalledFile {
    /// Artifact name.
    pub name: String,
    /// Tag the file was fetched at.
    pub version: String,
    /// Destination path.
    pub path: PathBuf,
    /// `sha256:<hex>` of the written content.
    pub checksum: String,
}

/// What a run did with each plan entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstallReport {
    /// Files fetched and written.
    pub written: Vec<InstalledFile>,
    /// Existing files kept because of `reuse_cache`.
    pub cached: Vec<PathBuf>,
}

/// Writes plan entries into the install layout.
#[derive(Debug)]
pub struct Installer<'a, F> {
    fetcher: &'a F,
    reuse_cache: bool,
}

impl<'a, F: ArtifactFetcher + Sync> Installer<'a, F> {
    /// Installer downloading through `fetcher`.
    ///
    /// With `reuse_cache`, destinations that already exist are left alone.
    pub const fn new(fetcher: &'a F, reuse_cache: bool) -> Self {
        Self {
            fetcher,
            reuse_cache,
        }
    }

    /// Install every entry of `plan`.
    ///
    /// # Errors
    ///
    /// - [`DekubeError::FileNotFound`] when a file is missing at its tag
    /// - [`DekubeError::NetworkError`] when a download keeps failing
    /// - [`DekubeError::FileSystemError`] when a destination cannot be written
    pub async fn install(&self, plan: &InstallPlan) -> Result<InstallReport, DekubeError> {
        let mut report = InstallReport::default();

        for entry in plan.entries() {
            if self.reuse_cache && entry.destination.exists() {
                debug!("Keeping existing {}", entry.destination.display());
                report.cached.push(entry.destination.clone());
                continue;
            }
            report.written.push(self.install_entry(entry).await?);
        }

        Ok(report)
    }

    async fn install_entry(&self, entry: &InstallPlanEntry) -> Result<InstalledFile, DekubeError> {
        let url =
            self.fetcher.artifact_url(entry.kind, &entry.repo, &entry.resolved_version, &entry.file);
        info!("Fetching {} {} from {url}", entry.name, entry.resolved_version);

        let content = self.fetcher.fetch(&url).await.map_err(|e| match e {
            SourceError::NotFound { url } => DekubeError::FileNotFound {
                name: entry.name.clone(),
                url,
            },
            other => DekubeError::NetworkError {
                operation: format!("download '{}'", entry.name),
                reason: other.to_string(),
            },
        })?;

        atomic_write(&entry.destination, &content).map_err(|e| DekubeError::FileSystemError {
            operation: format!("write '{}' ({e:#})", entry.name),
            path: entry.destination.display().to_string(),
        })?;
        debug!("Wrote {} bytes to {}", content.len(), entry.destination.display());

        Ok(InstalledFile {
            name: entry.name.clone(),
            version: entry.resolved_version.clone(),
            path: entry.destination.clone(),
            checksum: sha256_digest(&content),
        })
    }
}

//! Binding constraints to concrete release tags.
//!
//! `latest` becomes the tag of the repository's newest release. A pin is
//! checked against the repository's tags, trying the `v`-prefixed form first
//! (see [`candidate_tags`]).
//!
//! Failures do not stop the pass: every artifact is tried, and all failures
//! are reported together in one [`DekubeError::ReconciliationFailed`], so a
//! user with three bad pins sees all three at once.

use super::{VersionConstraint, candidate_tags};
use crate::core::DekubeError;
use crate::plan::{InstallPlan, InstallPlanEntry};
use crate::resolver::{PlanSkeleton, ResolvedArtifact};
use crate::source::ReleaseSource;
use std::path::PathBuf;
use tracing::{debug, info};

/// Binds a [`PlanSkeleton`] to release tags, producing an [`InstallPlan`].
#[derive(Debug)]
pub struct VersionReconciler<'a, S> {
    source: &'a S,
    install_dir: PathBuf,
}

impl<'a, S: ReleaseSource + Sync> VersionReconciler<'a, S> {
    /// Reconciler querying `source`; plan destinations go under `install_dir`.
    pub fn new(source: &'a S, install_dir: impl Into<PathBuf>) -> Self {
        Self {
            source,
            install_dir: install_dir.into(),
        }
    }

    /// Bind every artifact of `skeleton`, distribution first.
    ///
    /// Artifacts are queried one at a time, in plan order.
    ///
    /// # Errors
    ///
    /// Returns [`DekubeError::ReconciliationFailed`] holding one
    /// [`DekubeError::VersionNotFound`], [`DekubeError::NoReleases`] or
    /// [`DekubeError::NetworkError`] per failing artifact.
    pub async fn reconcile(&self, skeleton: PlanSkeleton) -> Result<InstallPlan, DekubeError> {
        let mut failures = Vec::new();

        let distribution = match skeleton.distribution {
            Some(artifact) => self.bind(artifact, &mut failures).await,
            None => None,
        };

        let mut extensions = Vec::with_capacity(skeleton.extensions.len());
        for artifact in skeleton.extensions {
            if let Some(entry) = self.bind(artifact, &mut failures).await {
                extensions.push(entry);
            }
        }

        if !failures.is_empty() {
            return Err(DekubeError::ReconciliationFailed {
                failures,
            });
        }

        Ok(InstallPlan {
            install_dir: self.install_dir.clone(),
            distribution,
            extensions,
        })
    }

    async fn bind(
        &self,
        artifact: ResolvedArtifact,
        failures: &mut Vec<DekubeError>,
    ) -> Option<InstallPlanEntry> {
        match self.resolve_tag(&artifact).await {
            Ok(tag) => {
                info!("{} '{}' -> {tag}", artifact.kind, artifact.name);
                Some(InstallPlanEntry::bind(artifact, tag, &self.install_dir))
            }
            Err(e) => {
                debug!("Could not bind '{}': {e}", artifact.name);
                failures.push(e);
                None
            }
        }
    }

    /// Tag for one artifact.
    ///
    /// # Errors
    ///
    /// - [`DekubeError::NoReleases`] when `latest` is asked of a repository
    ///   without releases
    /// - [`DekubeError::VersionNotFound`] when no candidate tag of a pin exists
    /// - [`DekubeError::NetworkError`] when the source keeps failing
    pub async fn resolve_tag(&self, artifact: &ResolvedArtifact) -> Result<String, DekubeError> {
        let network_error = |operation: String, e: crate::source::SourceError| {
            DekubeError::NetworkError {
                operation,
                reason: e.to_string(),
            }
        };

        match &artifact.constraint {
            VersionConstraint::Latest => self
                .source
                .latest_tag(&artifact.repo)
                .await
                .map_err(|e| {
                    network_error(format!("latest release of '{}' ({})", artifact.name, artifact.repo), e)
                })?
                .ok_or_else(|| DekubeError::NoReleases {
                    name: artifact.name.clone(),
                    repo: artifact.repo.clone(),
                }),
            VersionConstraint::Pinned(version) => {
                for tag in candidate_tags(version) {
                    let exists = self.source.tag_exists(&artifact.repo, &tag).await.map_err(|e| {
                        network_error(format!("tag {tag} of '{}' ({})", artifact.name, artifact.repo), e)
                    })?;
                    if exists {
                        return Ok(tag);
                    }
                    debug!("Tag {tag} not found in {}", artifact.repo);
                }
                Err(DekubeError::VersionNotFound {
                    name: artifact.name.clone(),
                    version: version.clone(),
                    repo: artifact.repo.clone(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ArtifactKind;
    use crate::test_utils::FakeReleaseSource;

    fn artifact(name: &str, constraint: VersionConstraint) -> ResolvedArtifact {
        ResolvedArtifact {
            kind: ArtifactKind::Extension,
            name: name.to_string(),
            constraint,
            repo: format!("org/{name}"),
            file: format!("{name}.py"),
            required_by: Vec::new(),
        }
    }

    fn source() -> FakeReleaseSource {
        FakeReleaseSource::default()
            .with_release("org/keycloak", &["v0.1.0", "v0.2.0"])
            .with_release("org/raw", &["1.0.0"])
            .with_release("org/empty", &[])
    }

    #[tokio::test]
    async fn test_latest_binds_newest_release() {
        let source = source();
        let reconciler = VersionReconciler::new(&source, ".dekube");
        let tag = reconciler.resolve_tag(&artifact("keycloak", VersionConstraint::Latest)).await.unwrap();
        assert_eq!(tag, "v0.2.0");
    }

    #[tokio::test]
    async fn test_pin_prefers_v_prefix_then_raw() {
        let source = source();
        let reconciler = VersionReconciler::new(&source, ".dekube");

        let tag = reconciler
            .resolve_tag(&artifact("keycloak", VersionConstraint::pinned("0.1.0")))
            .await
            .unwrap();
        assert_eq!(tag, "v0.1.0");

        let tag =
            reconciler.resolve_tag(&artifact("raw", VersionConstraint::pinned("1.0.0"))).await.unwrap();
        assert_eq!(tag, "1.0.0");
    }

    #[tokio::test]
    async fn test_no_releases() {
        let source = source();
        let reconciler = VersionReconciler::new(&source, ".dekube");
        let err = reconciler.resolve_tag(&artifact("empty", VersionConstraint::Latest)).await.unwrap_err();
        assert!(matches!(err, DekubeError::NoReleases { .. }));
    }

    #[tokio::test]
    async fn test_failures_are_aggregated() {
        let source = source().with_failing_repo("org/flaky");
        let reconciler = VersionReconciler::new(&source, ".dekube");
        let skeleton = PlanSkeleton {
            distribution: None,
            extensions: vec![
                artifact("keycloak", VersionConstraint::pinned("9.9.9")),
                artifact("raw", VersionConstraint::Latest),
                artifact("flaky", VersionConstraint::Latest),
                artifact("empty", VersionConstraint::Latest),
            ],
        };

        let err = reconciler.reconcile(skeleton).await.unwrap_err();
        let DekubeError::ReconciliationFailed {
            failures,
        } = &err
        else {
            panic!("unexpected error: {err:?}");
        };
        assert_eq!(failures.len(), 3);
        assert!(matches!(failures[0], DekubeError::VersionNotFound { ref version, .. } if version == "9.9.9"));
        assert!(matches!(failures[1], DekubeError::NetworkError { .. }));
        assert!(matches!(failures[2], DekubeError::NoReleases { .. }));
        assert!(err.to_string().starts_with("Version resolution failed for 3 artifact(s)"));
    }

    #[tokio::test]
    async fn test_reconcile_builds_plan() {
        let source = source().with_release("org/core", &["v2.0.0"]);
        let reconciler = VersionReconciler::new(&source, "out");
        let mut dist = artifact("core", VersionConstraint::Latest);
        dist.kind = ArtifactKind::Distribution;
        let skeleton = PlanSkeleton {
            distribution: Some(dist),
            extensions: vec![artifact("keycloak", VersionConstraint::pinned("v0.1.0"))],
        };

        let plan = reconciler.reconcile(skeleton).await.unwrap();
        let dist = plan.distribution.as_ref().unwrap();
        assert_eq!(dist.resolved_version, "v2.0.0");
        assert_eq!(dist.destination, PathBuf::from("out/core.py"));
        assert_eq!(plan.extensions[0].resolved_version, "v0.1.0");
        assert_eq!(plan.extensions[0].destination, PathBuf::from("out/extensions/keycloak.py"));
    }
}

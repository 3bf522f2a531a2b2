//! The install plan: every artifact bound to a concrete version and a
//! destination path.
//!
//! A plan holds at most one version per name in each namespace. Extension
//! order is dependencies first, ties in discovery order, so identical inputs
//! produce an identical plan, and identical JSON from [`InstallPlan::to_json`].

use crate::constants::EXTENSIONS_SUBDIR;
use crate::core::ArtifactKind;
use crate::resolver::ResolvedArtifact;
use crate::version::VersionConstraint;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// One artifact to fetch and write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallPlanEntry {
    /// Artifact name.
    pub name: String,
    /// Registry namespace.
    pub kind: ArtifactKind,
    /// Constraint the version was resolved from.
    pub constraint: VersionConstraint,
    /// Tag the file is fetched at.
    pub resolved_version: String,
    /// GitHub `owner/name`.
    pub repo: String,
    /// File name in the repository or release assets.
    pub file: String,
    /// Where the file is written.
    pub destination: PathBuf,
    /// Dependents that pulled this artifact in.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required_by: Vec<String>,
}

impl InstallPlanEntry {
    /// Bind a resolved artifact to `tag` under `install_dir`.
    #[must_use]
    pub fn bind(artifact: ResolvedArtifact, tag: String, install_dir: &Path) -> Self {
        let destination = destination_for(install_dir, artifact.kind, &artifact.file);
        Self {
            name: artifact.name,
            kind: artifact.kind,
            constraint: artifact.constraint,
            resolved_version: tag,
            repo: artifact.repo,
            file: artifact.file,
            destination,
            required_by: artifact.required_by,
        }
    }
}

/// Install layout: distribution files at the root of `install_dir`,
/// extension files under `install_dir/extensions/`. Only the file's base
/// name is kept.
#[must_use]
pub fn destination_for(install_dir: &Path, kind: ArtifactKind, file: &str) -> PathBuf {
    let base = Path::new(file).file_name().map_or_else(|| PathBuf::from(file), PathBuf::from);
    match kind {
        ArtifactKind::Distribution => install_dir.join(base),
        ArtifactKind::Extension => install_dir.join(EXTENSIONS_SUBDIR).join(base),
    }
}

/// Fully resolved, conflict-free set of artifacts to install.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallPlan {
    /// Root of the install layout.
    pub install_dir: PathBuf,
    /// Distribution entry, if one was selected.
    pub distribution: Option<InstallPlanEntry>,
    /// Extension entries in install order.
    pub extensions: Vec<InstallPlanEntry>,
}

impl InstallPlan {
    /// A plan with nothing to install.
    #[must_use]
    pub fn empty(install_dir: impl Into<PathBuf>) -> Self {
        Self {
            install_dir: install_dir.into(),
            distribution: None,
            extensions: Vec::new(),
        }
    }

    /// Every entry, distribution first.
    pub fn entries(&self) -> impl Iterator<Item = &InstallPlanEntry> {
        self.distribution.iter().chain(self.extensions.iter())
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        usize::from(self.distribution.is_some()) + self.extensions.len()
    }

    /// Whether nothing is to be installed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pretty-printed JSON, stable across runs for identical inputs.
    ///
    /// # Errors
    ///
    /// Returns an error only if serialization itself fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact(kind: ArtifactKind, name: &str, file: &str) -> ResolvedArtifact {
        ResolvedArtifact {
            kind,
            name: name.to_string(),
            constraint: VersionConstraint::Latest,
            repo: format!("org/{name}"),
            file: file.to_string(),
            required_by: Vec::new(),
        }
    }

    #[test]
    fn test_destinations() {
        let dir = Path::new(".dekube");
        assert_eq!(
            destination_for(dir, ArtifactKind::Distribution, "dekube.py"),
            PathBuf::from(".dekube/dekube.py")
        );
        assert_eq!(
            destination_for(dir, ArtifactKind::Extension, "src/keycloak.py"),
            PathBuf::from(".dekube/extensions/keycloak.py")
        );
    }

    #[test]
    fn test_plan_json_shape() {
        let dir = Path::new("out");
        let mut cert = artifact(ArtifactKind::Extension, "cert-manager", "cert_manager.py");
        cert.constraint = VersionConstraint::pinned("0.1.0");
        cert.required_by = vec!["trust-manager".to_string()];

        let plan = InstallPlan {
            install_dir: dir.to_path_buf(),
            distribution: Some(InstallPlanEntry::bind(
                artifact(ArtifactKind::Distribution, "core", "dekube.py"),
                "v2.0.0".to_string(),
                dir,
            )),
            extensions: vec![InstallPlanEntry::bind(cert, "v0.1.0".to_string(), dir)],
        };

        assert_eq!(plan.len(), 2);
        let json: serde_json::Value = serde_json::from_str(&plan.to_json().unwrap()).unwrap();
        assert_eq!(json["distribution"]["kind"], "distribution");
        assert_eq!(json["distribution"]["constraint"]["type"], "latest");
        assert!(json["distribution"].get("required_by").is_none());
        assert_eq!(json["extensions"][0]["resolved_version"], "v0.1.0");
        assert_eq!(json["extensions"][0]["constraint"]["version"], "0.1.0");
        assert_eq!(json["extensions"][0]["required_by"][0], "trust-manager");
    }

    #[test]
    fn test_empty_plan() {
        let plan = InstallPlan::empty(".dekube");
        assert!(plan.is_empty());
        assert_eq!(plan.entries().count(), 0);
    }
}

//! End-to-end runs of the library pipeline against in-memory fakes:
//! merge, resolve, compatibility check, reconcile and install.

use dekube_manager::core::{ArtifactKind, DekubeError};
use dekube_manager::installer::Installer;
use dekube_manager::manifest::ProjectConfig;
use dekube_manager::plan::InstallPlan;
use dekube_manager::resolver::{DependencyResolver, check_compatibility};
use dekube_manager::test_utils::{
    FakeFetcher, FakeReleaseSource, init_test_logging, sample_distributions, sample_extensions,
};
use dekube_manager::version::{VersionConstraint, VersionReconciler};
use dekube_manager::wishlist::{CliRequest, SpecMerger};
use std::collections::HashSet;
use std::path::Path;
use tempfile::TempDir;

fn releases() -> FakeReleaseSource {
    FakeReleaseSource::default()
        .with_release("dekubeio/dekube-core", &["v1.0.0", "v2.0.0"])
        .with_release("dekubeio/dekube-provider-cert-manager", &["v0.1.0", "v0.2.0", "v0.3.0"])
        .with_release("dekubeio/dekube-provider-trust-manager", &["v0.1.0"])
        .with_release("dekubeio/dekube-provider-vault", &["v1.0.0"])
        .with_release("dekubeio/dekube-provider-keycloak", &["v0.1.0", "v0.2.0", "v0.3.0"])
        .with_release("dekubeio/dekube-transform-nginx", &[])
        .with_release("dekubeio/dekube-transform-traefik", &["v1.0.0"])
}

fn cli(extensions: &[&str]) -> CliRequest {
    CliRequest {
        extensions: extensions.iter().map(ToString::to_string).collect(),
        ..CliRequest::default()
    }
}

async fn plan_for(
    request: &CliRequest,
    config: Option<&str>,
    source: &FakeReleaseSource,
    install_dir: &Path,
) -> Result<InstallPlan, DekubeError> {
    init_test_logging(None);
    let config = config
        .map(|content| ProjectConfig::parse(content, Path::new("dekube.yaml")))
        .transpose()?;
    let selection = SpecMerger::default().merge(request, config.as_ref())?;

    let distributions = sample_distributions();
    let extensions = sample_extensions();
    let skeleton = DependencyResolver::new(&distributions, &extensions).resolve(&selection)?;
    check_compatibility(&skeleton.extensions, &extensions, &HashSet::new())?;

    VersionReconciler::new(source, install_dir).reconcile(skeleton).await
}

fn names(plan: &InstallPlan) -> Vec<(&str, &str)> {
    plan.extensions.iter().map(|e| (e.name.as_str(), e.resolved_version.as_str())).collect()
}

#[tokio::test]
async fn test_transitive_pin_is_installed_first() {
    let temp = TempDir::new().unwrap();
    let source = releases();

    let plan = plan_for(&cli(&["trust-manager"]), None, &source, temp.path()).await.unwrap();

    assert_eq!(names(&plan), vec![("cert-manager", "v0.1.0"), ("trust-manager", "v0.1.0")]);
    assert_eq!(plan.extensions[0].constraint, VersionConstraint::pinned("0.1.0"));
    assert_eq!(plan.extensions[0].required_by, vec!["trust-manager"]);
    assert_eq!(plan.extensions[1].constraint, VersionConstraint::Latest);

    let distribution = plan.distribution.as_ref().unwrap();
    assert_eq!(distribution.name, "core");
    assert_eq!(distribution.resolved_version, "v2.0.0");
    assert_eq!(distribution.destination, temp.path().join("dekube.py"));
}

#[tokio::test]
async fn test_command_line_pin_beats_config() {
    let temp = TempDir::new().unwrap();
    let source = FakeReleaseSource::default()
        .with_release("dekubeio/dekube-core", &["v2.0.0"])
        .with_release("dekubeio/dekube-provider-keycloak", &["v0.1.0", "v0.2.0", "v0.3.0"])
        .with_release("dekubeio/dekube-transform-nginx", &["v1.0.0"]);

    let plan = plan_for(
        &cli(&["keycloak==0.2.0"]),
        Some("depends:\n  - keycloak\n  - nginx\n"),
        &source,
        temp.path(),
    )
    .await
    .unwrap();

    assert_eq!(names(&plan), vec![("keycloak", "v0.2.0"), ("nginx", "v1.0.0")]);
    assert_eq!(plan.extensions[0].constraint, VersionConstraint::pinned("0.2.0"));
}

#[tokio::test]
async fn test_root_pin_overrides_dependency_pin() {
    let temp = TempDir::new().unwrap();

    let plan = plan_for(
        &cli(&["trust-manager", "cert-manager==0.3.0"]),
        None,
        &releases(),
        temp.path(),
    )
    .await
    .unwrap();

    assert_eq!(names(&plan), vec![("cert-manager", "v0.3.0"), ("trust-manager", "v0.1.0")]);
}

#[tokio::test]
async fn test_conflicting_dependency_pins() {
    let temp = TempDir::new().unwrap();
    let source = releases();

    let err = plan_for(&cli(&["trust-manager", "vault"]), None, &source, temp.path())
        .await
        .unwrap_err();

    match err {
        DekubeError::DependencyConflict {
            name,
            first_version,
            second_version,
            ..
        } => {
            assert_eq!(name, "cert-manager");
            assert_eq!(first_version, "0.1.0");
            assert_eq!(second_version, "0.2.0");
        }
        other => panic!("expected DependencyConflict, got {other:?}"),
    }
    assert_eq!(source.call_count(), 0);
}

#[tokio::test]
async fn test_unknown_extension_stops_before_lookups() {
    let temp = TempDir::new().unwrap();
    let source = releases();

    let err = plan_for(&cli(&["keycloack"]), None, &source, temp.path()).await.unwrap_err();

    assert!(matches!(err, DekubeError::UnknownArtifact { ref name, .. } if name == "keycloack"));
    assert_eq!(source.call_count(), 0);
    assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_incompatible_pair_rejected() {
    let temp = TempDir::new().unwrap();

    let err = plan_for(&cli(&["nginx", "traefik"]), None, &releases(), temp.path())
        .await
        .unwrap_err();
    assert!(matches!(err, DekubeError::IncompatibleArtifacts { .. }));
}

#[tokio::test]
async fn test_identical_inputs_give_identical_plans() {
    let temp = TempDir::new().unwrap();
    let source = releases();
    let request = cli(&["keycloak", "trust-manager"]);
    let config = Some("distribution_version: 1.0.0\ndepends:\n  - cert-manager\n");

    let first = plan_for(&request, config, &source, temp.path()).await.unwrap();
    let second = plan_for(&request, config, &source, temp.path()).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.to_json().unwrap(), second.to_json().unwrap());
    assert_eq!(first.distribution.as_ref().unwrap().resolved_version, "v1.0.0");
}

#[tokio::test]
async fn test_reconciliation_reports_every_failure() {
    let temp = TempDir::new().unwrap();

    let err = plan_for(
        &CliRequest {
            no_distribution: true,
            ..cli(&["keycloak==9.9.9", "nginx", "cert-manager"])
        },
        None,
        &releases(),
        temp.path(),
    )
    .await
    .unwrap_err();

    let DekubeError::ReconciliationFailed { failures } = err else {
        panic!("expected ReconciliationFailed");
    };
    assert_eq!(failures.len(), 2);
    assert!(matches!(failures[0], DekubeError::VersionNotFound { ref name, .. } if name == "keycloak"));
    assert!(matches!(failures[1], DekubeError::NoReleases { ref name, .. } if name == "nginx"));
}

#[tokio::test]
async fn test_install_then_reuse() {
    let temp = TempDir::new().unwrap();
    let install_dir = temp.path().join(".dekube");
    let plan = plan_for(&cli(&["trust-manager"]), None, &releases(), &install_dir).await.unwrap();

    let fetcher = FakeFetcher::default()
        .with_artifact(ArtifactKind::Distribution, "dekubeio/dekube-core", "v2.0.0", "dekube.py", "# core")
        .with_artifact(
            ArtifactKind::Extension,
            "dekubeio/dekube-provider-cert-manager",
            "v0.1.0",
            "cert_manager.py",
            "# cert-manager 0.1.0",
        )
        .with_artifact(
            ArtifactKind::Extension,
            "dekubeio/dekube-provider-trust-manager",
            "v0.1.0",
            "trust_manager.py",
            "# trust-manager",
        );

    let report = Installer::new(&fetcher, false).install(&plan).await.unwrap();
    assert_eq!(report.written.len(), 3);
    assert_eq!(std::fs::read_to_string(install_dir.join("dekube.py")).unwrap(), "# core");
    assert_eq!(
        std::fs::read_to_string(install_dir.join("extensions/cert_manager.py")).unwrap(),
        "# cert-manager 0.1.0"
    );

    let report = Installer::new(&fetcher, true).install(&plan).await.unwrap();
    assert!(report.written.is_empty());
    assert_eq!(report.cached.len(), 3);
    assert_eq!(fetcher.fetch_count(), 3);
}

#[tokio::test]
async fn test_missing_file_fails_install() {
    let temp = TempDir::new().unwrap();
    let plan = plan_for(
        &CliRequest {
            no_distribution: true,
            ..cli(&["keycloak"])
        },
        None,
        &releases(),
        temp.path(),
    )
    .await
    .unwrap();

    let err = Installer::new(&FakeFetcher::default(), false).install(&plan).await.unwrap_err();
    assert!(matches!(err, DekubeError::FileNotFound { ref name, .. } if name == "keycloak"));
}

//! Binary-level tests: argument handling, exit codes and error rendering.
//!
//! GitHub is unreachable in these tests, so only paths that finish before
//! the first release lookup are expected to succeed.

use predicates::prelude::*;

use crate::common::TestProject;

#[test]
fn test_help_lists_commands() {
    let project = TestProject::new().unwrap();
    project
        .command()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("install"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("info"));
}

#[test]
fn test_install_help_shows_selection_flags() {
    let project = TestProject::new().unwrap();
    project
        .command()
        .args(["install", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--no-distribution"))
        .stdout(predicate::str::contains("--no-reinstall"))
        .stdout(predicate::str::contains("--ignore-compatibility-errors"));
}

#[test]
fn test_empty_selection_is_a_noop() {
    let project = TestProject::new().unwrap();
    project.write_config("depends: []\nhelmfile_dir: ./helm\n").unwrap();

    project
        .command()
        .args(["install", "--no-distribution"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Nothing to install"));

    assert!(!project.install_dir().exists());
}

#[test]
fn test_unknown_extension_exits_with_suggestion() {
    let project = TestProject::new().unwrap();

    let output = project.run_dekube(&["install", "keycloack"]).unwrap();
    output
        .assert_failure_containing("Unknown extension 'keycloack'")
        .assert_failure_containing("Did you mean 'keycloak'?");
    assert_eq!(output.code, Some(1));
    assert!(!project.install_dir().exists());
}

#[test]
fn test_unknown_extension_from_config() {
    let project = TestProject::new().unwrap();
    project.write_config("depends:\n  - keycloak\n  - vaultwarden\n").unwrap();

    project
        .run_dekube(&["plan", "--no-distribution"])
        .unwrap()
        .assert_failure_containing("vaultwarden");
}

#[test]
fn test_malformed_token_rejected() {
    let project = TestProject::new().unwrap();

    project
        .run_dekube(&["plan", "keycloak==0.1==0.2"])
        .unwrap()
        .assert_failure_containing("Configuration error");
}

#[test]
fn test_conflicting_pins_reported() {
    let project = TestProject::new().unwrap();

    project
        .run_dekube(&["plan", "--no-distribution", "trust-manager", "vault"])
        .unwrap()
        .assert_failure_containing("Dependency conflict for 'cert-manager'")
        .assert_failure_containing("0.1.0")
        .assert_failure_containing("0.2.0");
}

#[test]
fn test_incompatible_extensions_reported() {
    let project = TestProject::new().unwrap();

    project
        .run_dekube(&["plan", "--no-distribution", "nginx", "traefik"])
        .unwrap()
        .assert_failure_containing("are incompatible")
        .assert_failure_containing("--ignore-compatibility-errors");
}

#[test]
fn test_ignored_incompatibility_reaches_version_lookup() {
    let project = TestProject::new().unwrap();

    let output = project
        .run_dekube(&[
            "plan",
            "--no-distribution",
            "nginx",
            "traefik",
            "--ignore-compatibility-errors",
            "traefik",
        ])
        .unwrap();
    output.assert_failure_containing("Version resolution failed");
    assert!(!output.stderr.contains("are incompatible"));
}

#[test]
fn test_missing_explicit_project_config() {
    let project = TestProject::new().unwrap();

    project
        .run_dekube(&["plan", "--file", "missing.yaml"])
        .unwrap()
        .assert_failure_containing("missing.yaml");
}

#[test]
fn test_info_survives_unreachable_github() {
    let project = TestProject::new().unwrap();

    project
        .command()
        .args(["info", "trust-manager"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cert-manager"))
        .stdout(predicate::str::contains("trust-manager Bundle support"))
        .stdout(predicate::str::contains("(could not fetch)"))
        .stdout(predicate::str::contains("depends: cert-manager==0.1.0"));
}

#[test]
fn test_info_lists_whole_registry() {
    let project = TestProject::new().unwrap();

    project
        .command()
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains("keycloak"))
        .stdout(predicate::str::contains("incompatible: nginx"));
}

#[test]
fn test_info_describes_extensions_with_differing_pins() {
    let project = TestProject::new().unwrap();

    project
        .command()
        .args(["info", "trust-manager", "vault"])
        .assert()
        .success()
        .stdout(predicate::str::contains("depends: cert-manager==0.1.0"))
        .stdout(predicate::str::contains("depends: cert-manager==0.2.0"))
        .stdout(predicate::str::contains("cert-manager Certificate and Issuer support"));
}

#[test]
fn test_empty_distribution_version_rejected() {
    let project = TestProject::new().unwrap();

    project
        .command()
        .args(["plan", "--core-version", ""])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("--distribution-version must not be empty"));
    assert!(!project.install_dir().exists());
}

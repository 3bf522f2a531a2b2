//! Common test utilities for dekube-manager integration tests

// Not every helper is used by every test module
#![allow(dead_code)]

use anyhow::{Context, Result};
use dekube_manager::constants::PRIMARY_CONFIG_FILE;
use dekube_manager::test_utils::RegistryFixture;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// A throwaway project directory with registries and a global config
/// pointing at them.
///
/// GitHub is configured on a closed local port, so commands that reach for
/// a release fail fast with a network error.
pub struct TestProject {
    _temp_dir: TempDir,
    project_dir: PathBuf,
    fixture: RegistryFixture,
}

impl TestProject {
    /// Project using the sample registries.
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let project_dir = temp_dir.path().join("project");
        let registry_dir = temp_dir.path().join("registry");
        fs::create_dir_all(&project_dir)?;
        fs::create_dir_all(&registry_dir)?;

        let fixture = RegistryFixture::write(&registry_dir)?;

        Ok(Self {
            _temp_dir: temp_dir,
            project_dir,
            fixture,
        })
    }

    pub fn project_path(&self) -> &Path {
        &self.project_dir
    }

    pub fn install_dir(&self) -> PathBuf {
        self.project_dir.join(".dekube")
    }

    /// Write `dekube.yaml` into the project directory.
    pub fn write_config(&self, content: &str) -> Result<()> {
        fs::write(self.project_dir.join(PRIMARY_CONFIG_FILE), content)
            .context("Failed to write project config")
    }

    /// `dekube-manager` command running in the project directory with the
    /// fixture's global config.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::Command::from_std(self.std_command());
        cmd.env("NO_COLOR", "1");
        cmd
    }

    /// Run the binary and capture its output.
    pub fn run_dekube(&self, args: &[&str]) -> Result<CommandOutput> {
        let output = self
            .std_command()
            .args(args)
            .env("NO_COLOR", "1")
            .output()
            .context("Failed to run dekube-manager")?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        })
    }

    fn std_command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_dekube-manager"));
        cmd.arg("--config")
            .arg(&self.fixture.config)
            .current_dir(&self.project_dir)
            .env_remove("DEKUBE_CONFIG")
            .env_remove("GITHUB_TOKEN")
            .env_remove("RUST_LOG");
        cmd
    }
}

/// Captured process output.
#[derive(Debug)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
    pub code: Option<i32>,
}

impl CommandOutput {
    pub fn assert_failure_containing(&self, text: &str) -> &Self {
        assert!(!self.success, "Expected failure. Stdout: {}", self.stdout);
        assert!(
            self.stderr.contains(text),
            "Expected stderr to contain '{text}'. Stderr: {}",
            self.stderr
        );
        self
    }
}

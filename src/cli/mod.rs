//! Command-line interface for dekube-manager.
//!
//! # Available Commands
//!
//! - `install` - Resolve the selection and write the artifacts to disk
//! - `plan` - Resolve the selection and print the install plan only
//! - `info` - Show registry entries with their latest release
//!
//! `install` and `plan` share the selection flags in [`common::SelectionArgs`]:
//! positional `name[==version]` tokens, distribution flags, the project
//! config file and the install directory.
//!
//! # Global Options
//!
//! - `--verbose` - Debug logging
//! - `--quiet` - Errors only
//! - `--config` - Path to the global config file
//!
//! # Example
//!
//! ```bash
//! # Install the default distribution plus two extensions
//! dekube-manager install keycloak cert-manager==0.2.0
//!
//! # Same selection, plan only, as JSON
//! dekube-manager plan keycloak cert-manager==0.2.0 --json
//!
//! # Extensions only, into a custom directory
//! dekube-manager install --no-distribution -d build/dekube nginx
//! ```

pub mod common;
mod info;
mod install;
mod plan;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Runtime configuration derived from the global flags.
///
/// Kept separate from [`Cli`] so tests and embedders can run a command with
/// their own logging and config location.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log filter directive. `None` defers to `RUST_LOG`, then `warn`.
    pub log_level: Option<String>,

    /// Global config file overriding `$DEKUBE_CONFIG` and the default
    /// location.
    pub config_path: Option<PathBuf>,
}

impl CliConfig {
    /// Configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the global tracing subscriber, writing to stderr.
    ///
    /// Only the first call in a process has an effect.
    pub fn init_logging(&self) {
        let filter = match &self.log_level {
            Some(level) => EnvFilter::new(level),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .try_init();
    }
}

/// Dependency resolver and fetcher for dekube distributions and extensions.
#[derive(Parser)]
#[command(
    name = "dekube-manager",
    about = "Resolve and install dekube distributions and extensions",
    version,
    long_about = "dekube-manager merges the command line with dekube.yaml, expands extension \
                  dependencies from the registry, binds each artifact to a GitHub release tag \
                  and writes the files into the install directory."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output.
    ///
    /// Equivalent to `RUST_LOG=debug`. Mutually exclusive with `--quiet`.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only report errors.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the global config file (default: `~/.dekube/config.toml`).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the selection and install every artifact.
    ///
    /// See [`install::InstallCommand`].
    Install(install::InstallCommand),

    /// Resolve the selection and print the install plan without writing.
    ///
    /// See [`plan::PlanCommand`].
    Plan(plan::PlanCommand),

    /// Show registry entries with their latest release.
    ///
    /// See [`info::InfoCommand`].
    Info(info::InfoCommand),
}

impl Cli {
    /// Execute the parsed command with a configuration built from the flags.
    ///
    /// # Errors
    ///
    /// Returns the command's error for the caller to render.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Translate the global flags into a [`CliConfig`].
    ///
    /// `--verbose` maps to `debug`, `--quiet` to `error`; with neither,
    /// `RUST_LOG` decides.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            Some("error".to_string())
        } else {
            None
        };

        CliConfig {
            log_level,
            config_path: self.config.clone(),
        }
    }

    /// Execute the command with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns the command's error for the caller to render.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();

        let quiet = self.quiet;
        match self.command {
            Commands::Install(cmd) => cmd.execute(&config, quiet).await,
            Commands::Plan(cmd) => cmd.execute(&config).await,
            Commands::Info(cmd) => cmd.execute(&config).await,
        }
    }
}

//! Pieces shared by the `install`, `plan` and `info` commands.

use anyhow::{Context, Result};
use clap::Args;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::GlobalConfig;
use crate::constants::DEFAULT_INSTALL_DIR;
use crate::core::ArtifactKind;
use crate::manifest::{ConfigCandidates, LoadedConfig};
use crate::plan::InstallPlan;
use crate::registry::{Registry, RegistrySource};
use crate::resolver::{DependencyResolver, check_compatibility};
use crate::source::GitHubClient;
use crate::version::VersionReconciler;
use crate::wishlist::{CliRequest, SpecMerger};

/// Selection flags shared by `install` and `plan`.
#[derive(Args, Debug, Clone)]
pub struct SelectionArgs {
    /// Extensions to install, as `name` or `name==version`
    #[arg(value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Distribution to install instead of the configured or default one
    #[arg(long, value_name = "NAME")]
    pub distribution: Option<String>,

    /// Pin the distribution to a release tag
    #[arg(long, visible_alias = "core-version", value_name = "VERSION")]
    pub distribution_version: Option<String>,

    /// Install extensions only
    #[arg(long)]
    pub no_distribution: bool,

    /// Install directory
    #[arg(short = 'd', long = "dir", value_name = "DIR", default_value = DEFAULT_INSTALL_DIR)]
    pub install_dir: PathBuf,

    /// Project config file (default: dekube.yaml, then helmfile2compose.yaml)
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Install these extensions even when the registry marks them incompatible
    #[arg(long, value_name = "EXT", num_args = 1..)]
    pub ignore_compatibility_errors: Vec<String>,
}

impl SelectionArgs {
    /// The command-line layer of the selection.
    #[must_use]
    pub fn cli_request(&self) -> CliRequest {
        CliRequest {
            extensions: self.extensions.clone(),
            distribution: self.distribution.clone(),
            distribution_version: self.distribution_version.clone(),
            no_distribution: self.no_distribution,
        }
    }

    /// Run merge, resolution, compatibility check and version reconciliation.
    ///
    /// An empty selection short-circuits to an empty plan without reading
    /// the registries. Everything that can be rejected from the inputs alone
    /// is rejected before the first release lookup.
    ///
    /// # Errors
    ///
    /// Returns the first failing stage's error.
    pub async fn build_plan(&self, context: &CommandContext) -> Result<InstallPlan> {
        let project = load_project_config(self.file.as_deref())?;
        let selection =
            SpecMerger::default().merge(&self.cli_request(), project.as_ref().map(|p| &p.config))?;

        if selection.is_empty() {
            debug!("Empty selection");
            return Ok(InstallPlan::empty(&self.install_dir));
        }

        let distributions = match selection.distribution {
            Some(_) => context.registry(ArtifactKind::Distribution).await?,
            None => Registry::empty(ArtifactKind::Distribution),
        };
        let extensions = if selection.wishlist.is_empty() {
            Registry::empty(ArtifactKind::Extension)
        } else {
            context.registry(ArtifactKind::Extension).await?
        };

        let skeleton = DependencyResolver::new(&distributions, &extensions).resolve(&selection)?;
        let ignore: HashSet<String> = self.ignore_compatibility_errors.iter().cloned().collect();
        check_compatibility(&skeleton.extensions, &extensions, &ignore)?;

        let plan = VersionReconciler::new(&context.client, &self.install_dir)
            .reconcile(skeleton)
            .await?;
        Ok(plan)
    }
}

/// Global config plus the GitHub client built from it.
#[derive(Debug)]
pub struct CommandContext {
    /// Loaded global configuration.
    pub global: GlobalConfig,
    /// Client for registries, releases and artifact downloads.
    pub client: GitHubClient,
}

impl CommandContext {
    /// Load the global config from `config_path` (or its defaults) and build
    /// the client.
    ///
    /// # Errors
    ///
    /// Fails when the config cannot be loaded or the client cannot be built.
    pub async fn load(config_path: Option<&Path>) -> Result<Self> {
        let global = GlobalConfig::load_with_optional(config_path.map(Path::to_path_buf)).await?;
        let client = GitHubClient::new(&global.github, &global.network)?;
        Ok(Self {
            global,
            client,
        })
    }

    /// Read the registry for `kind` from its configured location.
    ///
    /// # Errors
    ///
    /// Fails when the document cannot be read or parsed.
    pub async fn registry(&self, kind: ArtifactKind) -> Result<Registry> {
        let location = match kind {
            ArtifactKind::Distribution => &self.global.registries.distributions,
            ArtifactKind::Extension => &self.global.registries.extensions,
        };
        let registry = RegistrySource::parse(location).load(kind, &self.client).await?;
        debug!("{} {kind} entries from {location}", registry.len());
        Ok(registry)
    }
}

/// Find and parse the project config.
///
/// `file` must exist when given; otherwise the default candidates in the
/// working directory are tried and may all be absent.
///
/// # Errors
///
/// Fails when the working directory is unavailable, an explicit file is
/// missing, or the chosen file does not parse.
pub fn load_project_config(file: Option<&Path>) -> Result<Option<LoadedConfig>> {
    let candidates = match file {
        Some(path) => ConfigCandidates::explicit(path.to_path_buf()),
        None => {
            let cwd = std::env::current_dir().context("Failed to read the working directory")?;
            ConfigCandidates::default_in(&cwd)
        }
    };
    Ok(candidates.load()?)
}

//! Show registry entries with their latest release.
//!
//! With names, the dependency closure of those names is shown. Without
//! names, the project config's `depends` are used when a config exists, and
//! the whole extensions registry otherwise.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use tracing::warn;

use super::CliConfig;
use super::common::{CommandContext, load_project_config};
use crate::core::ArtifactKind;
use crate::registry::{Registry, RegistryEntry};
use crate::resolver::DependencyResolver;
use crate::source::ReleaseSource;
use crate::wishlist::{CliRequest, SpecMerger};

/// Describe extensions.
#[derive(Args, Debug)]
pub struct InfoCommand {
    /// Extensions to describe, with their dependencies
    #[arg(value_name = "EXT")]
    names: Vec<String>,

    /// Project config file (default: dekube.yaml, then helmfile2compose.yaml)
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,
}

impl InfoCommand {
    pub(super) async fn execute(self, config: &CliConfig) -> Result<()> {
        let context = CommandContext::load(config.config_path.as_deref()).await?;
        let registry = context.registry(ArtifactKind::Extension).await?;

        let names = self.selected_names(&registry)?;
        if names.is_empty() {
            println!("No extensions to show");
            return Ok(());
        }

        for name in names {
            if let Some(entry) = registry.get(&name) {
                let latest = latest_release(&context, entry).await;
                print_entry(entry, &latest);
            }
        }
        Ok(())
    }

    fn selected_names(&self, registry: &Registry) -> Result<Vec<String>> {
        let request = CliRequest {
            extensions: self.names.clone(),
            no_distribution: true,
            ..CliRequest::default()
        };

        let selection = if self.names.is_empty() {
            match load_project_config(self.file.as_deref())? {
                Some(project) => SpecMerger::default().merge(&request, Some(&project.config))?,
                None => return Ok(registry.names().into_iter().map(str::to_string).collect()),
            }
        } else {
            SpecMerger::default().merge(&request, None)?
        };

        let empty = Registry::empty(ArtifactKind::Distribution);
        Ok(DependencyResolver::new(&empty, registry).closure_names(&selection.wishlist)?)
    }
}

async fn latest_release(context: &CommandContext, entry: &RegistryEntry) -> String {
    match context.client.latest_tag(&entry.repo).await {
        Ok(Some(tag)) => tag,
        Ok(None) => "(no releases)".to_string(),
        Err(e) => {
            warn!("Latest release of {} unavailable: {e}", entry.repo);
            "(could not fetch)".to_string()
        }
    }
}

fn print_entry(entry: &RegistryEntry, latest: &str) {
    println!("{} {}", entry.name.cyan().bold(), latest);
    if !entry.description.is_empty() {
        println!("  {}", entry.description);
    }
    println!("  repo: {}", entry.repo);
    if !entry.depends.is_empty() {
        println!("  depends: {}", entry.depends.join(", "));
    }
    if !entry.incompatible.is_empty() {
        println!("  incompatible: {}", entry.incompatible.join(", "));
    }
}

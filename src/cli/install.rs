//! Resolve the selection and write the artifacts into the install directory.
//!
//! # Examples
//!
//! Install what `dekube.yaml` declares, with the default distribution:
//! ```bash
//! dekube-manager install
//! ```
//!
//! Add an extension on top and keep files that are already present:
//! ```bash
//! dekube-manager install keycloak --no-reinstall
//! ```
//!
//! # Installation Process
//!
//! 1. **Selection**: the command line is merged with the project config
//! 2. **Resolution**: extension dependencies are expanded from the registry
//! 3. **Reconciliation**: each artifact is bound to a release tag
//! 4. **Installation**: files are fetched and written atomically
//!
//! Nothing is written unless steps 1 to 3 all succeed.

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::CliConfig;
use super::common::{CommandContext, SelectionArgs};
use crate::installer::Installer;

/// Install the resolved selection.
#[derive(Args, Debug)]
pub struct InstallCommand {
    #[command(flatten)]
    pub(super) selection: SelectionArgs,

    /// Keep files already present in the install directory
    #[arg(long)]
    pub(super) no_reinstall: bool,
}

impl InstallCommand {
    pub(super) async fn execute(self, config: &CliConfig, quiet: bool) -> Result<()> {
        let context = CommandContext::load(config.config_path.as_deref()).await?;
        let plan = self.selection.build_plan(&context).await?;

        if plan.is_empty() {
            if !quiet {
                println!("Nothing to install");
            }
            return Ok(());
        }

        let report = Installer::new(&context.client, self.no_reinstall).install(&plan).await?;

        if quiet {
            return Ok(());
        }
        for file in &report.written {
            println!(
                "  {} {} {} -> {}",
                "+".green(),
                file.name.bold(),
                file.version,
                file.path.display()
            );
        }
        for path in &report.cached {
            println!("  {} {} (kept)", "=".yellow(), path.display());
        }
        println!(
            "\n{} {} written, {} kept in {}",
            "Installation complete!".green().bold(),
            report.written.len(),
            report.cached.len(),
            plan.install_dir.display()
        );

        Ok(())
    }
}

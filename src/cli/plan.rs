//! Print the install plan without writing anything.
//!
//! ```bash
//! dekube-manager plan trust-manager
//! dekube-manager plan trust-manager --json > plan.json
//! ```

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::CliConfig;
use super::common::{CommandContext, SelectionArgs};
use crate::plan::{InstallPlan, InstallPlanEntry};

/// Resolve the selection and print the plan.
#[derive(Args, Debug)]
pub struct PlanCommand {
    #[command(flatten)]
    pub(super) selection: SelectionArgs,

    /// Print the plan as JSON
    #[arg(long)]
    pub(super) json: bool,
}

impl PlanCommand {
    pub(super) async fn execute(self, config: &CliConfig) -> Result<()> {
        let context = CommandContext::load(config.config_path.as_deref()).await?;
        let plan = self.selection.build_plan(&context).await?;

        if self.json {
            println!("{}", plan.to_json()?);
        } else {
            print_plan(&plan);
        }
        Ok(())
    }
}

fn print_plan(plan: &InstallPlan) {
    if plan.is_empty() {
        println!("Nothing to install");
        return;
    }

    if let Some(entry) = &plan.distribution {
        println!("{}", "Distribution:".bold());
        print_entry(entry);
    }
    if !plan.extensions.is_empty() {
        println!("{}", "Extensions:".bold());
        for entry in &plan.extensions {
            print_entry(entry);
        }
    }
}

fn print_entry(entry: &InstallPlanEntry) {
    let mut line = format!(
        "  {} {} ({}) -> {}",
        entry.name.cyan(),
        entry.resolved_version,
        entry.constraint,
        entry.destination.display()
    );
    if !entry.required_by.is_empty() {
        line.push_str(&format!(" [required by {}]", entry.required_by.join(", ")).dimmed().to_string());
    }
    println!("{line}");
}

//! Raw command execution.

use anyhow::{Context, Result};
use colored::Colorize;
use omnicam_core::CommandState;
use tracing::debug;

use crate::ConnectionArgs;

/// Execute an arbitrary device command.
pub async fn execute(conn: &ConnectionArgs, name: &str, parameters: &str) -> Result<()> {
    let parameters: serde_json::Value =
        serde_json::from_str(parameters).context("Invalid --parameters JSON")?;

    let client = super::connect(conn)?;

    debug!(command = name, "executing raw command");
    let result = client
        .execute(name, parameters)
        .await
        .with_context(|| format!("Failed to execute {name}"))?;

    match result.state {
        CommandState::Done => println!("{}", "done".green().bold()),
        CommandState::InProgress => println!("{}", "inProgress".yellow().bold()),
        CommandState::Error => println!("{}", "error".red().bold()),
    }

    if let Some(progress) = result.progress {
        println!("   {} {progress}", "completion:".dimmed());
    }
    if let Some(results) = &result.results {
        println!(
            "{}",
            serde_json::to_string_pretty(results).context("Failed to render results")?
        );
    }
    if let Some(error) = &result.error {
        println!("   {} {} ({})", "error:".dimmed(), error.message, error.code);
    }

    Ok(())
}

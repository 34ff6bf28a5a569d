//! Info command implementation.

use anyhow::{Context, Result};
use colored::Colorize;
use tracing::debug;

use crate::ConnectionArgs;

/// Execute the info command.
pub async fn execute(conn: &ConnectionArgs) -> Result<()> {
    let client = super::connect(conn)?;

    debug!(endpoint = %conn.endpoint, "fetching device info");
    let info = client.info().await.context("Failed to fetch device info")?;

    println!("{}", "Device".bold());
    println!("   {} {}", "Manufacturer:".dimmed(), info.manufacturer);
    println!("   {} {}", "Model:".dimmed(), info.model);
    println!("   {} {}", "Serial number:".dimmed(), info.serial_number);
    println!("   {} {}", "Firmware:".dimmed(), info.firmware_version);

    Ok(())
}

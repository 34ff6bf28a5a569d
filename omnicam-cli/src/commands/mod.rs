//! Subcommand implementations.

pub mod capture;
pub mod command;
pub mod info;

use anyhow::{Context, Result};
use omnicam_core::{DigestAuth, OmnicamClient};

use crate::ConnectionArgs;

/// Builds a client from the shared connection options.
fn connect(conn: &ConnectionArgs) -> Result<OmnicamClient> {
    let client = match &conn.username {
        Some(username) => OmnicamClient::with_auth(
            &conn.endpoint,
            DigestAuth::new(username.clone(), conn.password.clone()),
        ),
        None => OmnicamClient::new(&conn.endpoint),
    };
    client.context("Failed to create device client")
}

//! Client facade wiring the transport stack together.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::debug;

use crate::auth::DigestAuth;
use crate::capture::CaptureBuilder;
use crate::commands::{CommandExecutor, CommandResult, DeviceInfo};
use crate::error::Result;
use crate::transport::{AuthTransport, HttpTransport, ReqwestTransport};

/// Cameras in access-point mode answer on this address.
pub const DEFAULT_ENDPOINT: &str = "http://192.168.1.1";

/// Connection settings for a device.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the device's web API.
    pub endpoint: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: crate::transport::DEFAULT_TIMEOUT,
        }
    }
}

/// Entry point to one device.
///
/// Owns the transport stack (reqwest transport wrapped in the digest
/// retry layer) and hands out capture builders and raw command execution.
/// The authenticator, when used, is injected here explicitly; there is no
/// process-wide credential state.
pub struct OmnicamClient {
    executor: Arc<CommandExecutor>,
}

impl OmnicamClient {
    /// Connects to an open device (no authentication).
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        Self::with_config(
            ClientConfig {
                endpoint: endpoint.into(),
                ..Default::default()
            },
            None,
        )
    }

    /// Connects to a client-mode device protected by digest auth.
    pub fn with_auth(endpoint: impl Into<String>, auth: DigestAuth) -> Result<Self> {
        Self::with_config(
            ClientConfig {
                endpoint: endpoint.into(),
                ..Default::default()
            },
            Some(auth),
        )
    }

    pub fn with_config(config: ClientConfig, auth: Option<DigestAuth>) -> Result<Self> {
        debug!(endpoint = %config.endpoint, "creating client");
        let transport = ReqwestTransport::with_timeout(&config.endpoint, config.timeout)?;
        let transport = AuthTransport::new(transport, auth);
        Ok(Self::with_transport(Arc::new(transport)))
    }

    /// Builds a client over an arbitrary transport (tests, custom stacks).
    pub fn with_transport(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            executor: Arc::new(CommandExecutor::new(transport)),
        }
    }

    /// Starts configuring a capture session.
    pub fn capture_builder(&self) -> CaptureBuilder {
        CaptureBuilder::new(self.executor.clone())
    }

    /// Executes an arbitrary device command. The capture orchestration
    /// issues its own commands; this is the escape hatch for the rest of
    /// the catalogue.
    pub async fn execute(&self, name: &str, parameters: Value) -> Result<CommandResult> {
        self.executor.execute(name, parameters).await
    }

    /// Fetches the device identity block.
    pub async fn info(&self) -> Result<DeviceInfo> {
        self.executor.info().await
    }
}

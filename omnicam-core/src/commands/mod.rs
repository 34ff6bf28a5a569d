//! Device command execution.
//!
//! Every command goes through one fixed endpoint as a JSON envelope
//! `{"name": …, "parameters": {…}}`; the device answers with a state field
//! (`done` / `inProgress` / `error`), an optional result payload, an
//! optional progress fraction, and an optional error object. This module
//! owns the envelope encoding/decoding and the mapping from HTTP status and
//! payload shape onto [`OmnicamError`]; it never retries (the transport
//! owns the 401 retry, capture orchestration owns business-level retries).

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::error::{OmnicamError, Result};
use crate::transport::{HttpRequest, HttpTransport};

/// The single command execution endpoint.
pub const COMMANDS_EXECUTE_PATH: &str = "/osc/commands/execute";

const INFO_PATH: &str = "/osc/info";

#[derive(Debug, Serialize)]
struct CommandRequest<'a> {
    name: &'a str,
    parameters: &'a Value,
}

/// Raw response envelope as the device serializes it.
#[derive(Debug, Deserialize)]
struct CommandEnvelope {
    state: CommandState,
    #[serde(default)]
    results: Option<Value>,
    #[serde(default)]
    progress: Option<ProgressEnvelope>,
    #[serde(default)]
    error: Option<DeviceError>,
}

#[derive(Debug, Deserialize)]
struct ProgressEnvelope {
    completion: f64,
}

/// Error statuses still carry a JSON envelope on most firmware; only the
/// error object matters there.
#[derive(Debug, Deserialize)]
struct ErrorProbe {
    #[serde(default)]
    error: Option<DeviceError>,
}

/// Execution state reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CommandState {
    Done,
    InProgress,
    Error,
}

/// Device-reported error object.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

/// Decoded result of one command execution or status poll. Transient;
/// produced per request, never persisted.
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub state: CommandState,
    pub results: Option<Value>,
    /// Completion fraction in `[0, 1]` while `state` is `InProgress`.
    pub progress: Option<f64>,
    pub error: Option<DeviceError>,
}

impl CommandResult {
    /// The `results.fileUrl` payload of a completed capture. The device may
    /// report completion with an empty string, which is a valid outcome.
    pub fn file_url(&self) -> Option<String> {
        self.results
            .as_ref()
            .and_then(|results| results.get("fileUrl"))
            .and_then(Value::as_str)
            .map(str::to_owned)
    }

    /// Maps an `error`-state result onto the error taxonomy; `None` for
    /// any other state.
    pub fn to_error(&self) -> Option<OmnicamError> {
        if self.state != CommandState::Error {
            return None;
        }
        let message = self
            .error
            .as_ref()
            .map(|e| e.message.clone())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| "device reported an error without a message".to_string());
        Some(OmnicamError::web_api(None, message))
    }
}

/// Device identity from `/osc/info`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    pub manufacturer: String,
    pub model: String,
    pub serial_number: String,
    pub firmware_version: String,
}

/// Sends named commands to the execution endpoint and decodes the envelope.
pub struct CommandExecutor {
    transport: Arc<dyn HttpTransport>,
}

impl CommandExecutor {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    /// Executes one device command.
    #[instrument(level = "debug", skip(self, parameters), fields(command = name))]
    pub async fn execute(&self, name: &str, parameters: Value) -> Result<CommandResult> {
        let body = serde_json::to_string(&CommandRequest {
            name,
            parameters: &parameters,
        })
        .map_err(|e| {
            OmnicamError::web_api(None, format!("failed to encode command envelope: {e}"))
        })?;

        let response = self
            .transport
            .send(HttpRequest::post(COMMANDS_EXECUTE_PATH, body))
            .await?;

        decode_envelope(response)
    }

    /// Fetches the device identity block.
    #[instrument(level = "debug", skip(self))]
    pub async fn info(&self) -> Result<DeviceInfo> {
        let response = self.transport.send(HttpRequest::get(INFO_PATH)).await?;

        if !response.is_success() {
            return Err(OmnicamError::web_api(
                Some(response.status),
                response.body,
            ));
        }
        serde_json::from_str(&response.body).map_err(|e| {
            OmnicamError::web_api(
                Some(response.status),
                format!("failed to parse device info as JSON: {e}"),
            )
        })
    }
}

fn decode_envelope(response: crate::transport::HttpResponse) -> Result<CommandResult> {
    if !response.is_success() {
        // Surface the device's own message when the error body parses,
        // otherwise the raw body text.
        let message = serde_json::from_str::<ErrorProbe>(&response.body)
            .ok()
            .and_then(|probe| probe.error)
            .map(|e| e.message)
            .filter(|m| !m.is_empty())
            .unwrap_or(response.body);
        return Err(OmnicamError::web_api(Some(response.status), message));
    }

    let envelope: CommandEnvelope = serde_json::from_str(&response.body).map_err(|e| {
        OmnicamError::web_api(
            Some(response.status),
            format!("failed to parse command response as JSON: {e}"),
        )
    })?;

    debug!(state = ?envelope.state, "decoded command envelope");

    Ok(CommandResult {
        state: envelope.state,
        results: envelope.results,
        progress: envelope.progress.map(|p| p.completion),
        error: envelope.error,
    })
}

//! Exit codes following sysexits.h conventions.
//!
//! These codes provide semantic meaning for different failure modes,
//! enabling scripts and CI systems to handle errors appropriately.

#![allow(dead_code)] // Constants may be used in future or for documentation

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// General error (catch-all).
pub const GENERAL_ERROR: i32 = 1;

/// Command line or configuration usage error (invalid arguments,
/// rejected poll interval). Maps to EX_USAGE from sysexits.h.
pub const USAGE_ERROR: i32 = 64;

/// The device answered but rejected the request (error envelope or
/// malformed payload). Maps to EX_DATAERR from sysexits.h.
pub const DEVICE_ERROR: i32 = 65;

/// The device could not be reached (timeout, refused connection).
/// Maps to EX_UNAVAILABLE from sysexits.h.
pub const NETWORK_ERROR: i32 = 69;

/// Represents an exit code with optional error context.
pub struct ExitCode {
    pub code: i32,
    pub message: Option<String>,
}

impl ExitCode {
    pub const fn success() -> Self {
        Self {
            code: SUCCESS,
            message: None,
        }
    }

    pub fn error(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: Some(message.into()),
        }
    }

    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let message = format!("{err:#}");

        // Classify error by inspecting the chain
        let code = if message.contains("invalid configuration")
            || message.contains("Invalid --parameters")
        {
            USAGE_ERROR
        } else if message.contains("not connected") {
            NETWORK_ERROR
        } else if message.contains("web API error") {
            DEVICE_ERROR
        } else {
            GENERAL_ERROR
        };

        Self {
            code,
            message: Some(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifies_configuration_errors_as_usage() {
        let err = anyhow::anyhow!("invalid configuration: poll interval must be greater than zero");
        assert_eq!(ExitCode::from_anyhow(&err).code, USAGE_ERROR);
    }

    #[test]
    fn test_classifies_unreachable_device_as_network() {
        let err = anyhow::anyhow!("not connected: connection timed out");
        assert_eq!(ExitCode::from_anyhow(&err).code, NETWORK_ERROR);
    }

    #[test]
    fn test_classifies_device_rejection() {
        let err = anyhow::anyhow!("web API error (status 503): busy");
        assert_eq!(ExitCode::from_anyhow(&err).code, DEVICE_ERROR);
    }

    #[test]
    fn test_unknown_errors_are_general() {
        let err = anyhow::anyhow!("something else entirely");
        assert_eq!(ExitCode::from_anyhow(&err).code, GENERAL_ERROR);
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OmnicamError {
    /// The device answered, but with an error envelope or a malformed
    /// payload. `status` is absent when the failure is a body-shape
    /// problem on an otherwise successful response.
    #[error("web API error{}: {message}", status_suffix(.status))]
    WebApi {
        status: Option<u16>,
        message: String,
    },

    /// The device could not be reached at all (timeout, refused, DNS).
    #[error("not connected: {0}")]
    NotConnected(String),

    /// Local configuration rejected before any network call.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl OmnicamError {
    pub(crate) fn web_api(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::WebApi {
            status,
            message: message.into(),
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(status) => format!(" (status {status})"),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, OmnicamError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_web_api_display_includes_status() {
        let err = OmnicamError::web_api(Some(503), "Status error UnitTest");
        assert_eq!(
            err.to_string(),
            "web API error (status 503): Status error UnitTest"
        );
    }

    #[test]
    fn test_web_api_display_without_status() {
        let err = OmnicamError::web_api(None, "missing field");
        assert_eq!(err.to_string(), "web API error: missing field");
    }

    #[test]
    fn test_not_connected_display() {
        let err = OmnicamError::NotConnected("connection timed out".to_string());
        assert_eq!(err.to_string(), "not connected: connection timed out");
    }
}

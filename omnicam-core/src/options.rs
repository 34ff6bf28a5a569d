//! Capture configuration.

use serde::Serialize;
use serde_json::{Map, Value};

/// Shooting mode the device must be in before a capture starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CaptureMode {
    Image,
    Video,
}

/// Option set applied via `camera.setOptions` before a capture. Built up
/// front, then handed to the executor as-is; nothing mutates it afterwards.
#[derive(Debug, Clone, Default)]
pub struct CaptureOptions {
    values: Map<String, Value>,
}

impl CaptureOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options preconfigured for the given shooting mode.
    pub fn capture_mode(mode: CaptureMode) -> Self {
        Self::new().with(
            "captureMode",
            serde_json::to_value(mode).unwrap_or(Value::Null),
        )
    }

    /// Adds one option by its device name.
    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The `camera.setOptions` parameter envelope.
    pub(crate) fn to_parameters(&self) -> Value {
        let mut parameters = Map::new();
        parameters.insert("options".to_string(), Value::Object(self.values.clone()));
        Value::Object(parameters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_capture_mode_serializes_camel_case() {
        assert_eq!(serde_json::to_value(CaptureMode::Image).unwrap(), "image");
        assert_eq!(serde_json::to_value(CaptureMode::Video).unwrap(), "video");
    }

    #[test]
    fn test_to_parameters_wraps_options() {
        let options = CaptureOptions::capture_mode(CaptureMode::Image)
            .with("_filter", json!("hdr"));

        let parameters = options.to_parameters();
        assert_eq!(parameters["options"]["captureMode"], "image");
        assert_eq!(parameters["options"]["_filter"], "hdr");
    }

    #[test]
    fn test_empty_options() {
        assert!(CaptureOptions::new().is_empty());
        assert!(!CaptureOptions::capture_mode(CaptureMode::Image).is_empty());
    }
}

//! Omnicam Core - control-plane client for OSC-style spherical cameras
//!
//! This crate drives a networked imaging device through its command/status
//! HTTP API:
//!
//! - HTTP Digest Authentication with challenge caching and a single
//!   retry on `401`
//! - Command execution over the fixed JSON envelope endpoint
//! - Long-running capture orchestration: configure → start → poll → stop,
//!   cancellable and callback-driven
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use omnicam_core::{CaptureCallback, DigestAuth, OmnicamClient, OmnicamError};
//!
//! struct PrintProgress;
//!
//! impl CaptureCallback for PrintProgress {
//!     fn on_progress(&self, completion: f64) {
//!         println!("capture {:.0}%", completion * 100.0);
//!     }
//!     fn on_success(&self, file_url: Option<String>) {
//!         println!("done: {file_url:?}");
//!     }
//!     fn on_error(&self, error: OmnicamError) {
//!         eprintln!("failed: {error}");
//!     }
//! }
//!
//! # async fn example() -> omnicam_core::Result<()> {
//! let auth = DigestAuth::new("THETAYL00105377", None);
//! let client = OmnicamClient::with_auth("http://192.168.1.5", auth)?;
//!
//! let session = client.capture_builder().build().await?;
//! let handle = session.start_capture(Arc::new(PrintProgress));
//! handle.cancel_capture(); // stops the capture early
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod capture;
pub mod client;
pub mod commands;
pub mod error;
pub mod options;
pub mod transport;

// Re-export main types for convenience
pub use auth::{DigestAuth, DEFAULT_QOP};
pub use capture::{
    CaptureBuilder, CaptureCallback, CaptureHandle, CaptureSession, DEFAULT_POLL_INTERVAL,
};
pub use client::{ClientConfig, OmnicamClient, DEFAULT_ENDPOINT};
pub use commands::{CommandExecutor, CommandResult, CommandState, DeviceError, DeviceInfo};
pub use error::{OmnicamError, Result};
pub use options::{CaptureMode, CaptureOptions};
pub use transport::{AuthTransport, HttpTransport, MockTransport, ReqwestTransport};

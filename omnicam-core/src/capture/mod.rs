//! Long-running capture orchestration.
//!
//! One capture attempt is one state machine: apply options, issue the start
//! command, poll the capture status until a terminal state, and honor
//! cancellation by issuing a stop. A single worker task owns the whole
//! sequence, so status checks are single-flight and the terminal callback
//! fires exactly once per attempt.
//!
//! ```text
//! Idle → Configuring → Starting → Polling → {Completed, Failed}
//!                                    ↓
//!                                 Stopping → {Completed, Failed, Cancelled}
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::sync::Notify;
use tracing::{debug, info, warn};

use crate::commands::{CommandExecutor, CommandState};
use crate::error::{OmnicamError, Result};
use crate::options::{CaptureMode, CaptureOptions};

/// Default delay between status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

const SET_OPTIONS_COMMAND: &str = "camera.setOptions";
const START_CAPTURE_COMMAND: &str = "camera.startCapture";
const CAPTURE_STATUS_COMMAND: &str = "camera.getCaptureStatus";
const STOP_CAPTURE_COMMAND: &str = "camera.stopCapture";

/// Receives the events of one capture attempt.
///
/// Exactly one of `on_success` / `on_error` fires per attempt, after which
/// no further callbacks arrive.
pub trait CaptureCallback: Send + Sync + 'static {
    /// Reported completion in `[0, 1]`. Fires with `0.0` as soon as the
    /// capture flow starts, before the device reports anything.
    fn on_progress(&self, completion: f64);

    /// Terminal success. `file_url` is `None` for a cancelled capture and
    /// `Some("")` when the device completes without reporting an artifact.
    fn on_success(&self, file_url: Option<String>);

    /// Terminal failure.
    fn on_error(&self, error: OmnicamError);
}

/// Configures and constructs a [`CaptureSession`].
///
/// Configuration failures surface here, synchronously: the poll interval is
/// validated before any network call, and the capture options are applied
/// on the device at `build` time so a rejected option set never reaches the
/// capture callback.
pub struct CaptureBuilder {
    executor: Arc<CommandExecutor>,
    poll_interval: Duration,
    options: CaptureOptions,
}

impl CaptureBuilder {
    pub(crate) fn new(executor: Arc<CommandExecutor>) -> Self {
        Self {
            executor,
            poll_interval: DEFAULT_POLL_INTERVAL,
            options: CaptureOptions::capture_mode(CaptureMode::Image),
        }
    }

    /// Overrides the delay between status polls. Must be greater than zero;
    /// validated at [`CaptureBuilder::build`].
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Replaces the option set applied before the capture starts.
    pub fn options(mut self, options: CaptureOptions) -> Self {
        self.options = options;
        self
    }

    /// Applies the capture options on the device and constructs the
    /// session.
    pub async fn build(self) -> Result<CaptureSession> {
        if self.poll_interval.is_zero() {
            return Err(OmnicamError::InvalidConfig(
                "poll interval must be greater than zero".to_string(),
            ));
        }

        let result = self
            .executor
            .execute(SET_OPTIONS_COMMAND, self.options.to_parameters())
            .await?;
        if let Some(error) = result.to_error() {
            return Err(error);
        }

        Ok(CaptureSession {
            executor: self.executor,
            poll_interval: self.poll_interval,
            options: self.options,
        })
    }
}

/// One capture attempt, ready to start.
///
/// A session is single-use: [`CaptureSession::start_capture`] consumes it,
/// so a fresh session must be built for every attempt and terminal states
/// cannot be re-entered by construction.
pub struct CaptureSession {
    executor: Arc<CommandExecutor>,
    poll_interval: Duration,
    options: CaptureOptions,
}

impl std::fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureSession")
            .field("poll_interval", &self.poll_interval)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl CaptureSession {
    /// The validated delay between status polls.
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Starts the capture and returns its cancellation handle immediately.
    /// Events arrive on `callback` from a spawned worker task.
    pub fn start_capture(self, callback: Arc<dyn CaptureCallback>) -> CaptureHandle {
        let cancel = Arc::new(CancelSignal::default());
        let handle = CaptureHandle {
            cancel: cancel.clone(),
        };

        tokio::spawn(async move {
            let outcome = run_capture(
                &self.executor,
                self.poll_interval,
                &self.options,
                callback.as_ref(),
                &cancel,
            )
            .await;

            // The single delivery point for the attempt's terminal event.
            match outcome {
                Outcome::Success(file_url) => {
                    info!(file_url = ?file_url, "capture finished");
                    callback.on_success(file_url);
                }
                Outcome::Failure(error) => {
                    warn!(error = %error, "capture failed");
                    callback.on_error(error);
                }
            }
        });

        handle
    }
}

/// Cancellation surface of a running capture.
#[derive(Clone)]
pub struct CaptureHandle {
    cancel: Arc<CancelSignal>,
}

impl CaptureHandle {
    /// Requests cancellation of the capture. Idempotent; once the session
    /// is terminal this is a no-op and no further callback fires.
    pub fn cancel_capture(&self) {
        self.cancel.request();
    }
}

#[derive(Default)]
struct CancelSignal {
    requested: AtomicBool,
    notify: Notify,
}

impl CancelSignal {
    fn request(&self) {
        if !self.requested.swap(true, Ordering::SeqCst) {
            // notify_one stores a permit, so a request landing between two
            // poll iterations still wakes the next wait immediately.
            self.notify.notify_one();
        }
    }

    fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    async fn wait_interval(&self, interval: Duration) {
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = self.notify.notified() => {}
        }
    }
}

enum Outcome {
    Success(Option<String>),
    Failure(OmnicamError),
}

/// Drives one capture attempt to its terminal state and returns the single
/// outcome to deliver. The cancellation flag is consulted at the top of
/// every iteration and immediately before the stop command; whichever of
/// natural completion and cancellation the loop observes first wins, and
/// the other outcome is discarded.
async fn run_capture(
    executor: &CommandExecutor,
    poll_interval: Duration,
    options: &CaptureOptions,
    callback: &dyn CaptureCallback,
    cancel: &CancelSignal,
) -> Outcome {
    // Configuring: options must fully apply before any capture attempt.
    debug!("applying capture options");
    match executor
        .execute(SET_OPTIONS_COMMAND, options.to_parameters())
        .await
    {
        Ok(result) => {
            if let Some(error) = result.to_error() {
                return Outcome::Failure(error);
            }
        }
        Err(error) => return Outcome::Failure(error),
    }

    if cancel.is_requested() {
        // Nothing is running on the device yet, so there is nothing to
        // stop; the pending callback still resolves.
        info!("capture cancelled before start");
        return Outcome::Success(None);
    }

    // Starting: the asynchronous flow begins here.
    callback.on_progress(0.0);
    debug!("issuing start command");
    let started = match executor.execute(START_CAPTURE_COMMAND, json!({})).await {
        Ok(result) => result,
        Err(error) => return Outcome::Failure(error),
    };
    if let Some(error) = started.to_error() {
        return Outcome::Failure(error);
    }
    if started.state == CommandState::Done {
        // Some firmware finishes short captures synchronously.
        return Outcome::Success(Some(started.file_url().unwrap_or_default()));
    }

    // Polling: single-flight status checks separated by timed waits.
    loop {
        if cancel.is_requested() {
            return stop_capture(executor).await;
        }
        cancel.wait_interval(poll_interval).await;
        if cancel.is_requested() {
            return stop_capture(executor).await;
        }

        let status = match executor.execute(CAPTURE_STATUS_COMMAND, json!({})).await {
            Ok(result) => result,
            Err(error) => return Outcome::Failure(error),
        };

        match status.state {
            CommandState::InProgress => {
                let completion = status.progress.unwrap_or(0.0);
                debug!(completion, "capture in progress");
                callback.on_progress(completion);
            }
            CommandState::Done => {
                // An empty fileUrl is a valid completion without an
                // artifact.
                return Outcome::Success(Some(status.file_url().unwrap_or_default()));
            }
            CommandState::Error => {
                let error = status.to_error().unwrap_or_else(|| {
                    OmnicamError::web_api(None, "device reported an error without details")
                });
                return Outcome::Failure(error);
            }
        }
    }
}

/// Resolves a cancelled capture with the stop command's outcome: a clean
/// stop completes the attempt with no file, a failed stop fails it.
async fn stop_capture(executor: &CommandExecutor) -> Outcome {
    info!("stopping capture");
    match executor.execute(STOP_CAPTURE_COMMAND, json!({})).await {
        Ok(result) => match result.to_error() {
            Some(error) => Outcome::Failure(error),
            None => Outcome::Success(None),
        },
        Err(error) => Outcome::Failure(error),
    }
}

//! Capture command implementation.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use colored::Colorize;
use omnicam_core::{CaptureCallback, CaptureMode, CaptureOptions, OmnicamError};
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::{debug, info};

use crate::ConnectionArgs;

enum CaptureEvent {
    Progress(f64),
    Done(Option<String>),
    Failed(OmnicamError),
}

struct ChannelCallback {
    tx: UnboundedSender<CaptureEvent>,
}

impl CaptureCallback for ChannelCallback {
    fn on_progress(&self, completion: f64) {
        let _ = self.tx.send(CaptureEvent::Progress(completion));
    }

    fn on_success(&self, file_url: Option<String>) {
        let _ = self.tx.send(CaptureEvent::Done(file_url));
    }

    fn on_error(&self, error: OmnicamError) {
        let _ = self.tx.send(CaptureEvent::Failed(error));
    }
}

/// Execute the capture command.
pub async fn execute(conn: &ConnectionArgs, interval_ms: u64, video: bool) -> Result<()> {
    let client = super::connect(conn)?;

    let mode = if video {
        CaptureMode::Video
    } else {
        CaptureMode::Image
    };
    debug!(?mode, interval_ms, "configuring capture");

    let session = client
        .capture_builder()
        .poll_interval(Duration::from_millis(interval_ms))
        .options(CaptureOptions::capture_mode(mode))
        .build()
        .await
        .context("Failed to configure capture")?;

    info!(endpoint = %conn.endpoint, "capture configured");
    println!("{}", "Capture started (ctrl-c to cancel)".bold());

    let (tx, mut rx) = mpsc::unbounded_channel();
    let handle = session.start_capture(Arc::new(ChannelCallback { tx }));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                eprintln!("{}", "Cancelling capture...".yellow());
                handle.cancel_capture();
            }
            event = rx.recv() => match event {
                Some(CaptureEvent::Progress(completion)) => {
                    println!("   {} {:>3.0}%", "progress:".dimmed(), completion * 100.0);
                }
                Some(CaptureEvent::Done(file_url)) => {
                    println!();
                    match file_url.as_deref() {
                        Some(url) if !url.is_empty() => {
                            println!("{}", "Capture complete!".green().bold());
                            println!("   {} {url}", "File:".dimmed());
                        }
                        Some(_) => {
                            println!("{}", "Capture complete (no file reported)".green().bold());
                        }
                        None => {
                            println!("{}", "Capture cancelled".yellow().bold());
                        }
                    }
                    return Ok(());
                }
                Some(CaptureEvent::Failed(error)) => bail!(error),
                None => bail!("capture ended without a result"),
            }
        }
    }
}

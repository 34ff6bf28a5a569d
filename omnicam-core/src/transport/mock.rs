//! Scripted transport for tests.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use super::{HttpRequest, HttpResponse, HttpTransport};
use crate::error::{OmnicamError, Result};

/// Transport replaying a scripted sequence of responses.
/// For testing only: records every request it sees, answers from the
/// script in FIFO order, and reports `NotConnected` once the script runs
/// dry.
#[derive(Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<Result<HttpResponse>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response with the given status and body.
    pub fn enqueue(&self, status: u16, body: &str) {
        self.push(Ok(HttpResponse {
            status,
            www_authenticate: None,
            body: body.to_string(),
        }));
    }

    /// Queues a response carrying a `WWW-Authenticate` header.
    pub fn enqueue_with_challenge(&self, status: u16, www_authenticate: &str, body: &str) {
        self.push(Ok(HttpResponse {
            status,
            www_authenticate: Some(www_authenticate.to_string()),
            body: body.to_string(),
        }));
    }

    /// Queues a transport-level failure.
    pub fn enqueue_error(&self, error: OmnicamError) {
        self.push(Err(error));
    }

    /// Every request seen so far, oldest first.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn push(&self, entry: Result<HttpResponse>) {
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(entry);
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request);
        self.script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
            .unwrap_or_else(|| {
                Err(OmnicamError::NotConnected(
                    "mock transport script exhausted".to_string(),
                ))
            })
    }
}

//! HTTP transport abstraction.
//!
//! The command layer talks to the device through the [`HttpTransport`]
//! trait so tests can substitute a scripted transport. The production stack
//! is [`ReqwestTransport`] wrapped in [`AuthTransport`], which handles the
//! digest-authentication retry on `401`.

mod authenticating;
mod http;
mod mock;

use async_trait::async_trait;

use crate::error::Result;

pub use authenticating::AuthTransport;
pub use http::{ReqwestTransport, DEFAULT_TIMEOUT};
pub use mock::MockTransport;

/// Request methods the device API uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// One outbound request. Cloneable so the authenticating layer can retry
/// it with the same method, path, and body.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub path: String,
    /// JSON body for POST requests.
    pub body: Option<String>,
    /// `Authorization` header value, attached by [`AuthTransport`].
    pub authorization: Option<String>,
}

impl HttpRequest {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: None,
            authorization: None,
        }
    }

    pub fn post(path: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            body: Some(body.into()),
            authorization: None,
        }
    }
}

/// The parts of a response the command layer needs.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    /// `WWW-Authenticate` header, if the device sent one.
    pub www_authenticate: Option<String>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// A transport executes one request and returns the device's response.
///
/// Implementations report reachability failures (timeout, refused
/// connection, DNS) as [`crate::OmnicamError::NotConnected`]; any HTTP
/// status, including errors, is a successful `send`.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

//! Transport backed by a real HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, WWW_AUTHENTICATE};
use reqwest::Client;
use tracing::{debug, warn};

use super::{HttpRequest, HttpResponse, HttpTransport, Method};
use crate::error::{OmnicamError, Result};

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// [`HttpTransport`] over [`reqwest`].
pub struct ReqwestTransport {
    client: Client,
    base_url: String,
}

impl ReqwestTransport {
    /// Creates a transport for a device endpoint such as
    /// `http://192.168.1.1`.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            warn!(error = %e, "failed to create HTTP client");
            OmnicamError::InvalidConfig(format!("failed to create HTTP client: {e}"))
        })?;

        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Ok(Self { client, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let url = self.url(&request.path);
        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
        };

        if let Some(body) = &request.body {
            builder = builder
                .header(CONTENT_TYPE, "application/json")
                .body(body.clone());
        }
        if let Some(authorization) = &request.authorization {
            builder = builder.header(AUTHORIZATION, authorization);
        }

        let response = builder.send().await.map_err(|e| {
            warn!(
                error = %e,
                timeout = e.is_timeout(),
                connect = e.is_connect(),
                path = %request.path,
                "request failed"
            );
            OmnicamError::NotConnected(e.to_string())
        })?;

        let status = response.status().as_u16();
        let www_authenticate = response
            .headers()
            .get(WWW_AUTHENTICATE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        let body = response
            .text()
            .await
            .map_err(|e| OmnicamError::NotConnected(e.to_string()))?;

        debug!(status, path = %request.path, "received response");

        Ok(HttpResponse {
            status,
            www_authenticate,
            body,
        })
    }
}

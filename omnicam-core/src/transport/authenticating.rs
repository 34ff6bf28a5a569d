//! Digest-authentication retry layer.

use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use super::{HttpRequest, HttpResponse, HttpTransport};
use crate::auth::{parse_www_authenticate, DigestAuth};
use crate::error::Result;

const UNAUTHORIZED: u16 = 401;

/// Wraps a transport and answers `401` challenges.
///
/// On an unauthorized response with a parseable Digest challenge, the
/// wrapper records the challenge, attaches a fresh `Authorization` header to
/// a copy of the request, and retries exactly once. The retry's response is
/// returned unconditionally; a second `401` is never retried again. Without
/// an authenticator, or with an unparseable challenge, the original
/// response passes through untouched.
///
/// The authenticator is supplied at construction (no ambient credential
/// lookup) and is locked across the update-challenge / compute-header pair
/// so a concurrent request cannot read a half-updated nonce.
pub struct AuthTransport<T> {
    inner: T,
    auth: Option<Mutex<DigestAuth>>,
}

impl<T: HttpTransport> AuthTransport<T> {
    pub fn new(inner: T, auth: Option<DigestAuth>) -> Self {
        Self {
            inner,
            auth: auth.map(Mutex::new),
        }
    }
}

#[async_trait]
impl<T: HttpTransport> HttpTransport for AuthTransport<T> {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let first = self.inner.send(request.clone()).await?;
        if first.status != UNAUTHORIZED {
            return Ok(first);
        }

        let Some(auth) = &self.auth else {
            debug!("401 with no authenticator configured, passing through");
            return Ok(first);
        };
        let Some(challenge) = first
            .www_authenticate
            .as_deref()
            .and_then(parse_www_authenticate)
        else {
            debug!("401 without a parseable digest challenge, passing through");
            return Ok(first);
        };

        let authorization = {
            let mut auth = auth
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            auth.update_challenge(challenge);
            auth.authorization_header(&request.path, request.method.as_str())
        };

        debug!(path = %request.path, "retrying with digest authorization");
        let mut retry = request;
        retry.authorization = Some(authorization);
        self.inner.send(retry).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    const CHALLENGE: &str = "Digest realm=\"THETA\", nonce=\"f31ae4b0\", qop=\"auth\"";

    fn auth() -> DigestAuth {
        DigestAuth::new("THETAYL00105377", None)
    }

    #[tokio::test]
    async fn test_passthrough_without_challenge_status() {
        let inner = MockTransport::new();
        inner.enqueue(200, "{\"state\":\"done\"}");
        let transport = AuthTransport::new(inner, Some(auth()));

        let response = transport
            .send(HttpRequest::post("/osc/commands/execute", "{}"))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
    }

    #[tokio::test]
    async fn test_retries_once_with_authorization() {
        let inner = MockTransport::new();
        inner.enqueue_with_challenge(401, CHALLENGE, "unauthorized");
        inner.enqueue(200, "{\"state\":\"done\"}");
        let transport = AuthTransport::new(inner, Some(auth()));

        let response = transport
            .send(HttpRequest::post("/osc/commands/execute", "{\"name\":\"x\"}"))
            .await
            .unwrap();
        assert_eq!(response.status, 200);

        let requests = transport.inner.requests();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].authorization.is_none());

        let header = requests[1].authorization.as_deref().expect("retry header");
        assert!(header.starts_with("Digest username=\"THETAYL00105377\""));
        assert!(header.contains("realm=\"THETA\""));
        assert!(header.contains("nonce=\"f31ae4b0\""));
        assert!(header.contains("uri=\"/osc/commands/execute\""));

        // Retry preserves method and body.
        assert_eq!(requests[1].method, requests[0].method);
        assert_eq!(requests[1].body, requests[0].body);
    }

    #[tokio::test]
    async fn test_second_unauthorized_is_returned() {
        let inner = MockTransport::new();
        inner.enqueue_with_challenge(401, CHALLENGE, "unauthorized");
        inner.enqueue_with_challenge(401, CHALLENGE, "still unauthorized");
        let transport = AuthTransport::new(inner, Some(auth()));

        let response = transport
            .send(HttpRequest::post("/osc/commands/execute", "{}"))
            .await
            .unwrap();

        assert_eq!(response.status, 401);
        assert_eq!(transport.inner.request_count(), 2, "no third attempt");
    }

    #[tokio::test]
    async fn test_passthrough_without_authenticator() {
        let inner = MockTransport::new();
        inner.enqueue_with_challenge(401, CHALLENGE, "unauthorized");
        let transport = AuthTransport::new(inner, None);

        let response = transport
            .send(HttpRequest::post("/osc/commands/execute", "{}"))
            .await
            .unwrap();

        assert_eq!(response.status, 401);
        assert_eq!(transport.inner.request_count(), 1);
    }

    #[tokio::test]
    async fn test_passthrough_on_unparseable_challenge() {
        let inner = MockTransport::new();
        inner.enqueue_with_challenge(401, "Basic realm=\"THETA\"", "unauthorized");
        let transport = AuthTransport::new(inner, Some(auth()));

        let response = transport
            .send(HttpRequest::post("/osc/commands/execute", "{}"))
            .await
            .unwrap();

        assert_eq!(response.status, 401);
        assert_eq!(transport.inner.request_count(), 1);
    }

    #[tokio::test]
    async fn test_passthrough_on_missing_challenge_header() {
        let inner = MockTransport::new();
        inner.enqueue(401, "unauthorized");
        let transport = AuthTransport::new(inner, Some(auth()));

        let response = transport
            .send(HttpRequest::post("/osc/commands/execute", "{}"))
            .await
            .unwrap();

        assert_eq!(response.status, 401);
        assert_eq!(transport.inner.request_count(), 1);
    }
}

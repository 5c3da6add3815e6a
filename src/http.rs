//! HTTP transport seam for outbound calls to the authorization server.
//!
//! The core issues exactly one kind of request: a form-encoded `POST`. The
//! trait keeps that surface substitutable per test; [`ReqwestTransport`] is
//! the implementation everything defaults to.

use async_trait::async_trait;

use crate::error::{OAuthError, Result};

/// Minimal response view the grant machinery needs: enough to decide
/// success/failure and to parse or report the body.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub reason: String,
    pub body: String,
}

impl HttpResponse {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One blocking round-trip per operation; no retries, no fan-out. A failed
/// or slow upstream call surfaces directly to the caller.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn post(
        &self,
        url: &str,
        headers: &[(String, String)],
        form: &[(String, String)],
    ) -> Result<HttpResponse>;
}

/// Default transport backed by a shared [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post(
        &self,
        url: &str,
        headers: &[(String, String)],
        form: &[(String, String)],
    ) -> Result<HttpResponse> {
        let mut request = self.client.post(url).form(form);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }
        let response = request.send().await.map_err(OAuthError::Network)?;
        let status = response.status();
        let reason = status.canonical_reason().unwrap_or("").to_string();
        let body = response.text().await.map_err(OAuthError::Network)?;
        Ok(HttpResponse {
            status: status.as_u16(),
            reason,
            body,
        })
    }
}

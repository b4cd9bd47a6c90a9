//! The transport seam and its `reqwest` implementation.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::error::TransportError;
use crate::request::{ApiRequest, ApiResponse, RequestBody};

/// Executes pending requests against the network.
///
/// The production implementation is [`ReqwestTransport`]; tests provide
/// their own implementations with canned responses.
#[async_trait]
pub trait HttpApi: Send + Sync {
    /// Executes the request, blocking the task until response or failure.
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

// ============================================================================
// Reqwest Transport
// ============================================================================

/// `reqwest`-backed transport with an explicit timeout and user agent.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    inner: reqwest::Client,
    timeout_secs: u64,
}

impl ReqwestTransport {
    /// Creates a transport.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Build`] when the underlying client cannot
    /// be constructed, which usually indicates a broken TLS configuration.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, TransportError> {
        let inner = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| TransportError::Build(e.to_string()))?;

        Ok(Self {
            inner,
            timeout_secs: timeout.as_secs(),
        })
    }
}

#[async_trait]
impl HttpApi for ReqwestTransport {
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        debug!("Executing request");

        let mut builder = self
            .inner
            .request(request.method, request.url)
            .headers(request.headers);

        if let Some((user, password)) = request.basic_auth {
            builder = builder.basic_auth(user, Some(password));
        }

        builder = match request.body {
            RequestBody::None => builder,
            RequestBody::Json(payload) => builder.json(&payload),
            RequestBody::Form(fields) => builder.form(&fields),
        };

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(self.timeout_secs)
            } else {
                TransportError::Request(e)
            }
        })?;

        let status = response.status();
        let body = response.text().await?;
        debug!(status = %status, "Response received");

        Ok(ApiResponse { status, body })
    }
}

// ============================================================================
// Tests
// ============================================================================

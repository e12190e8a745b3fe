//! JSON-over-HTTP transport

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::InfrastructureError;

/// Status and decoded body of a completed HTTP exchange
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,
    /// Body decoded as JSON; `None` when empty or not JSON
    pub body: Option<Value>,
}

impl TransportResponse {
    pub fn new(status: u16, body: Option<Value>) -> Self {
        Self { status, body }
    }

    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failure before any HTTP status was received
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Request failed: {0}")]
    Request(String),
}

/// Minimal JSON POST transport
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// POST `body` as JSON to `url`
    ///
    /// Any received status, including 4xx and 5xx, is a successful
    /// exchange. Requests are sent once; nothing is retried.
    async fn post_json(&self, url: &str, body: &Value) -> Result<TransportResponse, TransportError>;
}

/// `reqwest`-backed transport with a bounded per-request timeout
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, InfrastructureError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post_json(&self, url: &str, body: &Value) -> Result<TransportResponse, TransportError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(classify_error)?;

        let status = response.status().as_u16();
        let bytes = response.bytes().await.map_err(classify_error)?;
        let body = serde_json::from_slice::<Value>(&bytes).ok();

        debug!(
            url = %url,
            status,
            json_body = body.is_some(),
            "HTTP exchange completed"
        );

        Ok(TransportResponse { status, body })
    }
}

fn classify_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else {
        TransportError::Request(err.to_string())
    }
}

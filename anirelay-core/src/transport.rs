//! HTTP transport seam
//!
//! The engine and the enrichment provider only see [`HttpTransport`], so tests
//! can script upstream responses without a network.

use anirelay_common::config::UpstreamConfig;
use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{UpstreamError, UpstreamResult};

/// Decoded upstream response
///
/// Non-success statuses are returned, not raised: aggregator payloads
/// often carry their own status code alongside the HTTP one.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    /// HTTP status code
    pub status: u16,
    /// JSON body; a success body that is not JSON arrives as a string,
    /// a non-success one as `Null`
    pub body: Value,
}

impl UpstreamResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues GET requests and decodes JSON bodies
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Fetch `url` and decode its body as JSON
    ///
    /// Errors only on transport failure or cancellation.
    async fn get_json(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> UpstreamResult<UpstreamResponse>;
}

/// reqwest-backed transport
pub struct ReqwestTransport {
    http_client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(config: &UpstreamConfig) -> UpstreamResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .build()
            .map_err(|e| UpstreamError::Network(e.to_string()))?;

        Ok(Self { http_client })
    }

    /// Wrap an already configured client
    pub fn from_client(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }

    async fn fetch(&self, url: &str) -> UpstreamResult<UpstreamResponse> {
        let response = self.http_client.get(url).send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;

        Ok(UpstreamResponse {
            status,
            body: decode_body(status, text),
        })
    }
}

/// Decode a response body, keeping raw success text as a JSON string
///
/// Some server routes answer with a bare URL or iframe markup instead of
/// an envelope.
fn decode_body(status: u16, text: String) -> Value {
    match serde_json::from_str::<Value>(&text) {
        Ok(body) => body,
        Err(_) if !(200..300).contains(&status) => Value::Null,
        Err(_) if text.trim().is_empty() => Value::Null,
        Err(e) => {
            debug!(status, error = %e, "Success body is not JSON, keeping raw text");
            Value::String(text)
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get_json(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> UpstreamResult<UpstreamResponse> {
        if cancel.is_cancelled() {
            return Err(UpstreamError::Cancelled);
        }

        debug!(url = %url, "GET");

        tokio::select! {
            _ = cancel.cancelled() => Err(UpstreamError::Cancelled),
            result = self.fetch(url) => result,
        }
    }
}

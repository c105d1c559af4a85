//! Enrichment provider client
//!
//! The provider publishes a ceiling of about 3 requests per second. Every
//! call waits on a token bucket at that rate before touching the network,
//! whichever path (queued or direct) issued it.

use std::num::NonZeroU32;
use std::sync::Arc;

use anirelay_common::config::EnrichmentConfig;
use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::endpoints::EnrichmentEndpoints;
use crate::error::{UpstreamError, UpstreamResult};
use crate::transport::HttpTransport;

const HTTP_TOO_MANY_REQUESTS: u16 = 429;

/// Raw access to the enrichment provider
#[async_trait]
pub trait EnrichmentProvider: Send + Sync {
    /// Title search limited to the best match
    async fn search_anime(&self, title: &str, cancel: &CancellationToken) -> UpstreamResult<Value>;

    /// Top list ordered by popularity
    async fn top_anime(&self, limit: u32, cancel: &CancellationToken) -> UpstreamResult<Value>;
}

/// Rate-limited provider client over an [`HttpTransport`]
pub struct JikanProvider {
    transport: Arc<dyn HttpTransport>,
    endpoints: EnrichmentEndpoints,
    rate_limiter: DefaultDirectRateLimiter,
}

impl JikanProvider {
    pub fn new(transport: Arc<dyn HttpTransport>, config: &EnrichmentConfig) -> Self {
        let per_second = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);

        Self {
            transport,
            endpoints: EnrichmentEndpoints::new(&config.base_url),
            rate_limiter: RateLimiter::direct(Quota::per_second(per_second)),
        }
    }

    async fn get(&self, url: &str, cancel: &CancellationToken) -> UpstreamResult<Value> {
        tokio::select! {
            _ = cancel.cancelled() => return Err(UpstreamError::Cancelled),
            _ = self.rate_limiter.until_ready() => {}
        }

        debug!(url = %url, "Querying enrichment provider");
        let response = self.transport.get_json(url, cancel).await?;

        match response.status {
            HTTP_TOO_MANY_REQUESTS => Err(UpstreamError::RateLimited),
            _ if response.is_success() => Ok(response.body),
            status => Err(UpstreamError::Status(status)),
        }
    }
}

#[async_trait]
impl EnrichmentProvider for JikanProvider {
    async fn search_anime(&self, title: &str, cancel: &CancellationToken) -> UpstreamResult<Value> {
        let url = self.endpoints.anime_search(title);
        self.get(&url, cancel).await
    }

    async fn top_anime(&self, limit: u32, cancel: &CancellationToken) -> UpstreamResult<Value> {
        let url = self.endpoints.top_anime(limit);
        self.get(&url, cancel).await
    }
}

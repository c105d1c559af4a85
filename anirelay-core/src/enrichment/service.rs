//! Enrichment service
//!
//! Two call paths reach the provider. Bulk poster upgrades always go through
//! the queue and the poster cache. The per-detail metadata lookup takes the
//! path its caller names: queued, or direct after a short fixed delay.

use std::sync::Arc;
use std::time::Duration;

use anirelay_common::config::EnrichmentConfig;
use anirelay_common::{CatalogEntry, DetailEnrichment, EnrichmentPath};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::cache::PosterCache;
use super::provider::{EnrichmentProvider, JikanProvider};
use super::queue::{EnrichmentQueue, QueueConfig};
use super::title::clean_title;
use crate::error::UpstreamError;
use crate::normalizer::{normalize_enrichment, normalize_top_anime, poster_from_search};
use crate::transport::HttpTransport;

/// Poster upgrades and detail metadata from the enrichment provider
///
/// Never fails: provider errors, throttling and misses all come back as
/// `None` or an empty list.
pub struct EnrichmentService {
    provider: Arc<dyn EnrichmentProvider>,
    queue: Arc<EnrichmentQueue>,
    cache: PosterCache,
    direct_delay: Duration,
}

impl EnrichmentService {
    pub fn new(
        provider: Arc<dyn EnrichmentProvider>,
        queue: Arc<EnrichmentQueue>,
        cache: PosterCache,
        direct_delay: Duration,
    ) -> Self {
        Self {
            provider,
            queue,
            cache,
            direct_delay,
        }
    }

    /// Build the provider client, queue and cache from configuration
    ///
    /// Must be called inside a tokio runtime; the queue spawns its worker.
    pub fn from_config(transport: Arc<dyn HttpTransport>, config: &EnrichmentConfig) -> Self {
        let provider = Arc::new(JikanProvider::new(transport, config));
        let queue = Arc::new(EnrichmentQueue::new(QueueConfig {
            min_gap: config.queue_gap(),
        }));

        info!(
            base_url = %config.base_url,
            requests_per_second = config.requests_per_second,
            "Enrichment service configured"
        );

        Self::new(provider, queue, PosterCache::new(), config.direct_delay())
    }

    pub fn cache(&self) -> &PosterCache {
        &self.cache
    }

    pub fn queue(&self) -> &Arc<EnrichmentQueue> {
        &self.queue
    }

    /// High-resolution poster for a catalog title
    ///
    /// A cache hit returns without queueing. Otherwise the lookup is queued,
    /// and the task checks the cache again before calling the provider so
    /// queued duplicates of one title cost a single request.
    pub async fn high_quality_poster(
        &self,
        title: &str,
        cancel: &CancellationToken,
    ) -> Option<String> {
        let cleaned = clean_title(title, true);
        if cleaned.is_empty() {
            return None;
        }

        if let Some(poster) = self.cache.get(&cleaned) {
            debug!(title = %cleaned, "Poster cache hit");
            return Some(poster);
        }

        let provider = Arc::clone(&self.provider);
        let cache = self.cache.clone();
        let task_cancel = cancel.clone();

        let lookup = self.queue.enqueue(cancel, move || async move {
            if let Some(poster) = cache.get(&cleaned) {
                debug!(title = %cleaned, "Poster cached while queued");
                return Some(poster);
            }

            match provider.search_anime(&cleaned, &task_cancel).await {
                Ok(body) => {
                    let poster = poster_from_search(&body)?;
                    Some(cache.insert(&cleaned, poster))
                }
                Err(e) => {
                    log_provider_error(&cleaned, &e);
                    None
                }
            }
        });

        lookup.await.flatten()
    }

    /// Supplementary metadata for a detail view
    pub async fn detail_metadata(
        &self,
        title: &str,
        path: EnrichmentPath,
        cancel: &CancellationToken,
    ) -> Option<DetailEnrichment> {
        let cleaned = clean_title(title, false);
        if cleaned.is_empty() {
            return None;
        }

        match path {
            EnrichmentPath::Queued => {
                let provider = Arc::clone(&self.provider);
                let task_cancel = cancel.clone();
                self.queue
                    .enqueue(cancel, move || async move {
                        fetch_metadata(provider.as_ref(), &cleaned, &task_cancel).await
                    })
                    .await
                    .flatten()
            }
            EnrichmentPath::Direct => {
                tokio::select! {
                    _ = cancel.cancelled() => return None,
                    _ = tokio::time::sleep(self.direct_delay) => {}
                }
                fetch_metadata(self.provider.as_ref(), &cleaned, cancel).await
            }
        }
    }

    /// Most popular titles from the provider's top list
    pub async fn top_anime(&self, limit: u32, cancel: &CancellationToken) -> Vec<CatalogEntry> {
        match self.provider.top_anime(limit, cancel).await {
            Ok(body) => normalize_top_anime(&body),
            Err(e) => {
                log_provider_error("top list", &e);
                Vec::new()
            }
        }
    }
}

async fn fetch_metadata(
    provider: &dyn EnrichmentProvider,
    cleaned: &str,
    cancel: &CancellationToken,
) -> Option<DetailEnrichment> {
    match provider.search_anime(cleaned, cancel).await {
        Ok(body) => {
            let enrichment = normalize_enrichment(&body);
            if enrichment.is_none() {
                debug!(title = %cleaned, "No enrichment match");
            }
            enrichment
        }
        Err(e) => {
            log_provider_error(cleaned, &e);
            None
        }
    }
}

fn log_provider_error(subject: &str, err: &UpstreamError) {
    match err {
        UpstreamError::RateLimited => {
            warn!(subject = %subject, "Enrichment provider throttled the request, skipping")
        }
        UpstreamError::Cancelled => debug!(subject = %subject, "Enrichment lookup cancelled"),
        _ => warn!(subject = %subject, error = %err, "Enrichment lookup failed"),
    }
}

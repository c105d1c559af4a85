//! Resolution Engine
//!
//! Orchestrates the lookup chain: catalog or search, then detail, then
//! episode streams, then the playable server URL. Each step feeds the
//! normalizer and hands back canonical records.
//!
//! Failure policy: every network or parse failure is logged and becomes an
//! empty or absent result. The only compensating behavior is the detail
//! fallback, which retries through search when the direct fetch misses.

use std::sync::Arc;

use anirelay_common::config::TomlConfig;
use anirelay_common::{
    CatalogEntry, CatalogPage, Category, DetailRecord, EnrichmentPath, Genre, LoadState, Source,
    StreamResponse,
};
use futures::future::join_all;
use serde_json::Value;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::detail_view::DetailView;
use crate::endpoints::AggregatorEndpoints;
use crate::enrichment::EnrichmentService;
use crate::error::UpstreamResult;
use crate::normalizer::fields::{is_not_found, last_path_segment};
use crate::normalizer::{
    normalize_catalog, normalize_detail, normalize_genre_list, normalize_server_url,
    normalize_stream,
};
use crate::transport::{HttpTransport, ReqwestTransport};

/// Separators replaced by spaces when an id is turned into a search query
const ID_SEPARATORS: &[char] = &['-', '_'];

/// Engine behavior switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResolverConfig {
    /// Call path for the enrichment behind [`ResolutionEngine::open_detail`]
    pub detail_enrichment_path: EnrichmentPath,
}

/// Entry point for the presentation layer
///
/// Operations share no mutable state beyond the enrichment cache and may be
/// called concurrently.
pub struct ResolutionEngine {
    transport: Arc<dyn HttpTransport>,
    endpoints: AggregatorEndpoints,
    enrichment: Arc<EnrichmentService>,
    config: ResolverConfig,
}

impl ResolutionEngine {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        endpoints: AggregatorEndpoints,
        enrichment: Arc<EnrichmentService>,
        config: ResolverConfig,
    ) -> Self {
        Self {
            transport,
            endpoints,
            enrichment,
            config,
        }
    }

    /// Wire a reqwest transport, the enrichment service and the endpoints
    ///
    /// Must be called inside a tokio runtime.
    pub fn from_config(config: &TomlConfig) -> UpstreamResult<Self> {
        let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::new(&config.upstream)?);
        let enrichment = Arc::new(EnrichmentService::from_config(
            Arc::clone(&transport),
            &config.enrichment,
        ));

        info!(base_url = %config.upstream.base_url, "Resolution engine configured");

        Ok(Self::new(
            transport,
            AggregatorEndpoints::new(&config.upstream.base_url),
            enrichment,
            ResolverConfig {
                detail_enrichment_path: config.enrichment.detail_path,
            },
        ))
    }

    pub fn enrichment(&self) -> &Arc<EnrichmentService> {
        &self.enrichment
    }

    /// Fetch a JSON body; errors are logged and become `None`
    async fn fetch(&self, url: &str, cancel: &CancellationToken) -> Option<Value> {
        match self.transport.get_json(url, cancel).await {
            Ok(response) => {
                if !response.is_success() {
                    debug!(
                        url = %url,
                        status = response.status,
                        "Upstream returned non-success status"
                    );
                }
                Some(response.body)
            }
            Err(e) => {
                warn!(url = %url, error = %e, "Upstream request failed");
                None
            }
        }
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    /// One page of a category listing
    pub async fn list_catalog(
        &self,
        source: Source,
        category: &Category,
        page: u32,
        cancel: &CancellationToken,
    ) -> CatalogPage {
        let url = self.endpoints.catalog(source, category, page);
        let page = self
            .fetch(&url, cancel)
            .await
            .map(|body| normalize_catalog(&body))
            .unwrap_or_default();

        debug!(
            source = %source,
            category = ?category,
            entries = page.entries.len(),
            "Catalog page normalized"
        );
        page
    }

    pub async fn list_genres(&self, source: Source, cancel: &CancellationToken) -> Vec<Genre> {
        let url = self.endpoints.genre_list(source);
        self.fetch(&url, cancel)
            .await
            .map(|body| normalize_genre_list(&body))
            .unwrap_or_default()
    }

    /// Search, retrying with the path-segment form when the query form misses
    pub async fn search(
        &self,
        source: Source,
        query: &str,
        cancel: &CancellationToken,
    ) -> Vec<CatalogEntry> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }

        let url = self.endpoints.search_query(source, query);
        if let Some(body) = self.fetch(&url, cancel).await {
            let entries = normalize_catalog(&body).entries;
            if !entries.is_empty() {
                return entries;
            }
            if is_not_found(&body) {
                debug!(source = %source, query = %query, "Query search reported not found");
            }
        }

        if cancel.is_cancelled() {
            return Vec::new();
        }

        debug!(source = %source, query = %query, "Retrying search with path form");
        let url = self.endpoints.search_path(source, query);
        self.fetch(&url, cancel)
            .await
            .map(|body| normalize_catalog(&body).entries)
            .unwrap_or_default()
    }

    // ========================================================================
    // Detail
    // ========================================================================

    async fn fetch_detail(
        &self,
        source: Source,
        id: &str,
        cancel: &CancellationToken,
    ) -> Option<DetailRecord> {
        let url = self.endpoints.detail(source, id);
        let body = self.fetch(&url, cancel).await?;
        normalize_detail(&body, id)
    }

    /// Detail record, recovering from stale ids through search
    ///
    /// A direct miss turns the id into a query, takes the first search hit,
    /// and fetches once more under that hit's id if it differs.
    pub async fn get_detail(
        &self,
        source: Source,
        id: &str,
        cancel: &CancellationToken,
    ) -> Option<DetailRecord> {
        let id = id.trim();
        if id.is_empty() {
            return None;
        }

        if let Some(record) = self.fetch_detail(source, id, cancel).await {
            return Some(record);
        }
        if cancel.is_cancelled() {
            return None;
        }

        let query = id.replace(ID_SEPARATORS, " ");
        info!(source = %source, id = %id, query = %query, "Direct detail fetch missed, searching");

        let best_match = self.search(source, &query, cancel).await.into_iter().next()?;
        let Some(retry_id) = fallback_id(&best_match) else {
            debug!(id = %id, "First search hit has no usable id");
            return None;
        };
        if retry_id == id {
            debug!(id = %id, "Search resolved to the same id, giving up");
            return None;
        }

        info!(id = %id, retry_id = %retry_id, "Retrying detail fetch with search match");
        let record = self.fetch_detail(source, &retry_id, cancel).await;
        if record.is_none() {
            warn!(source = %source, id = %id, retry_id = %retry_id, "Detail fallback failed");
        }
        record
    }

    /// Detail record now, enrichment later
    ///
    /// The enrichment lookup runs on a spawned task using the configured
    /// call path; its outcome arrives on the view's watch channel.
    pub async fn open_detail(
        &self,
        source: Source,
        id: &str,
        cancel: &CancellationToken,
    ) -> Option<DetailView> {
        let record = self.get_detail(source, id, cancel).await?;

        let (tx, rx) = watch::channel(LoadState::Pending);
        let enrichment = Arc::clone(&self.enrichment);
        let title = record.title().to_string();
        let path = self.config.detail_enrichment_path;
        let cancel = cancel.clone();

        tokio::spawn(async move {
            let outcome = enrichment.detail_metadata(&title, path, &cancel).await;
            debug!(title = %title, found = outcome.is_some(), "Detail enrichment settled");
            tx.send_replace(LoadState::from_option(outcome));
        });

        Some(DetailView::new(record, rx))
    }

    // ========================================================================
    // Streams
    // ========================================================================

    pub async fn get_episode_stream(
        &self,
        source: Source,
        episode_id: &str,
        cancel: &CancellationToken,
    ) -> Option<StreamResponse> {
        let url = self.endpoints.episode(source, episode_id);
        let body = self.fetch(&url, cancel).await?;
        let stream = normalize_stream(&body, episode_id);
        if stream.is_none() {
            debug!(source = %source, episode_id = %episode_id, "Episode payload not recognized");
        }
        stream
    }

    /// Playable URL for a server id
    pub async fn resolve_server_url(
        &self,
        source: Source,
        server_id: &str,
        cancel: &CancellationToken,
    ) -> Option<String> {
        let url = self.endpoints.server(source, server_id);
        let body = self.fetch(&url, cancel).await?;
        normalize_server_url(&body)
    }

    // ========================================================================
    // Enrichment
    // ========================================================================

    pub async fn top_anime(&self, limit: u32, cancel: &CancellationToken) -> Vec<CatalogEntry> {
        self.enrichment.top_anime(limit, cancel).await
    }

    /// Replace posters with high-resolution ones where the provider has them
    ///
    /// Lookups are queued together and settle in submission order; entries
    /// without a match keep their original poster.
    pub async fn upgrade_posters(
        &self,
        entries: Vec<CatalogEntry>,
        cancel: &CancellationToken,
    ) -> Vec<CatalogEntry> {
        let lookups = entries
            .iter()
            .map(|entry| self.enrichment.high_quality_poster(&entry.title, cancel));
        let posters = join_all(lookups).await;

        entries
            .into_iter()
            .zip(posters)
            .map(|(mut entry, poster)| {
                if let Some(poster) = poster {
                    entry.poster_url = poster;
                }
                entry
            })
            .collect()
    }
}

/// Id to retry with: the entry id, else the last segment of its page URL
fn fallback_id(entry: &CatalogEntry) -> Option<String> {
    let id = entry.id.trim();
    if !id.is_empty() {
        return Some(id.to_string());
    }
    entry.url.as_deref().and_then(last_path_segment)
}

//! Test Helper Utilities
//!
//! Scripted test doubles and builders shared by the anirelay-core
//! integration tests.

#![allow(dead_code)]

pub mod fake_provider;
pub mod fake_transport;

use std::sync::Arc;
use std::time::Duration;

use anirelay_core::enrichment::{EnrichmentQueue, EnrichmentService, PosterCache, QueueConfig};
use anirelay_core::{AggregatorEndpoints, ResolutionEngine, ResolverConfig};
use serde_json::{json, Value};

pub use fake_provider::{FakeProvider, ProviderCall};
pub use fake_transport::ScriptedTransport;

/// Base URL the scripted aggregator answers on
pub const UPSTREAM_BASE: &str = "http://upstream.test";

/// Base URL the scripted enrichment provider answers on
pub const ENRICHMENT_BASE: &str = "http://enrichment.test";

pub fn endpoints() -> AggregatorEndpoints {
    AggregatorEndpoints::new(UPSTREAM_BASE)
}

/// Enrichment service over a fake provider with a zero direct delay
pub fn enrichment_service(
    provider: Arc<FakeProvider>,
    queue: QueueConfig,
) -> Arc<EnrichmentService> {
    Arc::new(EnrichmentService::new(
        provider,
        Arc::new(EnrichmentQueue::new(queue)),
        PosterCache::new(),
        Duration::ZERO,
    ))
}

/// Engine over scripted doubles with a gapless queue
pub fn engine(
    transport: Arc<ScriptedTransport>,
    provider: Arc<FakeProvider>,
) -> ResolutionEngine {
    ResolutionEngine::new(
        transport,
        endpoints(),
        enrichment_service(provider, QueueConfig::immediate()),
        ResolverConfig::default(),
    )
}

// ============================================================================
// Payload fixtures
// ============================================================================

/// Successful list envelope around raw items
pub fn list_payload(items: Value) -> Value {
    json!({ "status": "Ok", "data": { "animeList": items } })
}

/// Successful detail envelope for one title
pub fn detail_payload(title: &str, episode_ids: &[&str]) -> Value {
    let episodes: Vec<Value> = episode_ids
        .iter()
        .map(|id| json!({ "title": id, "slug": id }))
        .collect();
    json!({
        "statusCode": 200,
        "data": {
            "animeDetail": {
                "title": title,
                "poster": "https://img.example/small.jpg",
                "synopsis": "Original synopsis.",
                "episode_list": episodes
            }
        }
    })
}

/// The aggregator's shape for an unknown id
pub fn not_found_payload() -> Value {
    json!({ "statusCode": 404, "message": "Not Found", "data": null })
}

/// Provider search hit with the given poster and score
pub fn provider_hit(poster: &str, score: f64) -> Value {
    json!({
        "data": [{
            "mal_id": 52991,
            "title": "Sousou no Frieren",
            "score": score,
            "episodes": 28,
            "rating": "PG-13 - Teens 13 or older",
            "images": { "jpg": { "large_image_url": poster } }
        }]
    })
}

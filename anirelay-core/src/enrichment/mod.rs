//! Enrichment Queue & Cache
//!
//! Serialized, rate-limited access to the secondary metadata provider plus
//! a poster cache keyed by normalized title.

pub mod cache;
pub mod provider;
pub mod queue;
pub mod service;
pub mod title;

pub use cache::PosterCache;
pub use provider::{EnrichmentProvider, JikanProvider};
pub use queue::{EnrichmentQueue, QueueConfig};
pub use service::EnrichmentService;
pub use title::{cache_key, clean_title};

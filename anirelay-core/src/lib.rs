//! # anirelay core
//!
//! Aggregation and resolution layer over scraped anime sources:
//! - Response normalization into canonical records
//! - Resolution chain (catalog, detail with search fallback, streams, servers)
//! - Rate-limited enrichment queue with a poster cache

pub mod endpoints;
pub mod enrichment;
pub mod error;
pub mod normalizer;
pub mod resolver;
pub mod transport;

pub use endpoints::{AggregatorEndpoints, EnrichmentEndpoints};
pub use enrichment::{
    EnrichmentProvider, EnrichmentQueue, EnrichmentService, PosterCache, QueueConfig,
};
pub use error::{UpstreamError, UpstreamResult};
pub use resolver::{DetailView, ResolutionEngine, ResolverConfig};
pub use transport::{HttpTransport, ReqwestTransport, UpstreamResponse};

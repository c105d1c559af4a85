//! # anirelay common library
//!
//! Shared code for the anirelay crates:
//! - Canonical record types (catalog entries, detail records, stream servers)
//! - Common error type
//! - Configuration loading
//! - Tracing initialisation

pub mod config;
pub mod error;
pub mod logging;
pub mod models;

pub use error::{Error, Result};
pub use models::{
    CatalogEntry, CatalogPage, Category, DetailEnrichment, DetailRecord, EnrichmentPath,
    EpisodeRef, Genre, LoadState, PageInfo, Source, StreamResponse, StreamServer,
};

//! Response Normalizer
//!
//! Pure functions from arbitrary upstream JSON to canonical records. None of
//! them fail: unrecognized input degrades to an empty or absent result.

pub mod catalog;
pub mod detail;
pub mod enrichment;
pub mod fields;
pub mod genre;
pub mod server;
pub mod stream;

pub use catalog::{catalog_entry, normalize_catalog};
pub use detail::normalize_detail;
pub use enrichment::{normalize_enrichment, normalize_top_anime, poster_from_search};
pub use genre::normalize_genre_list;
pub use server::normalize_server_url;
pub use stream::normalize_stream;

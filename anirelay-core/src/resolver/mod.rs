//! Resolution Engine

pub mod detail_view;
pub mod engine;

pub use detail_view::DetailView;
pub use engine::{ResolutionEngine, ResolverConfig};

//! # fuzzystore
//!
//! Named key/value dictionary stores with approximate string matching.
//!
//! Each store owns a key→value mapping and a fuzzy index over its key set.
//! Lookups are bounded by Levenshtein edit distance: a query returns every
//! key within the requested budget, smallest distances first. The index
//! prunes candidates with character-count buckets and histogram signatures
//! so that bounded queries avoid scoring the whole key set.
//!
//! ## Example
//!
//! ```rust
//! use fuzzystore::prelude::*;
//!
//! let registry = std::sync::Arc::new(StoreRegistry::new());
//! let engine = QueryEngine::new(registry, EngineConfig::default());
//!
//! engine.add("demostore", "hello", "greeting").unwrap();
//! engine.add("demostore", "help", "assist").unwrap();
//!
//! let matches = engine.query("demostore", "hell", 1, 5).unwrap();
//! assert_eq!(matches[0].key, "hello");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod distance;
pub mod engine;
pub mod harness;
pub mod index;
pub mod store;

/// HTTP service surface (axum router and handlers)
#[cfg(feature = "server")]
pub mod server;

/// Common imports for convenient usage
pub mod prelude {
    pub use crate::engine::{EngineConfig, EngineError, QueryEngine};
    pub use crate::harness::{run_benchmark, BenchmarkConfig, BenchmarkReport};
    pub use crate::index::{FuzzyIndex, Match};
    pub use crate::store::{DictionaryStore, StoreRegistry};
}

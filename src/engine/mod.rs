//! Query engine: the public operation surface over stores.
//!
//! The engine mediates every caller-facing operation — exact lookup, fuzzy
//! lookup, insert, clear, bulk load — resolving store names through the
//! registry and validating parameters before any store work begins.

use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::index::Match;
use crate::store::{DictionaryStore, StoreRegistry};

/// Errors reported by the query engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A store name was referenced while auto-creation is disabled and no
    /// store with that name exists.
    #[error("unknown store: {0}")]
    UnknownStore(String),

    /// A request parameter is missing, non-numeric, or out of range.
    /// Rejected before any mutation or search work begins.
    #[error("invalid parameter {name}: {reason}")]
    MalformedParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// A benchmark run requested more sample keys than the store holds.
    #[error("insufficient keys: requested {requested}, store holds {available}")]
    InsufficientKeys {
        /// Keys requested for the sample.
        requested: usize,
        /// Keys actually present in the store.
        available: usize,
    },

    /// An operation exceeded its allotted time.
    #[error("operation timed out after {budget:?}")]
    Timeout {
        /// The time budget that was exhausted.
        budget: Duration,
    },
}

/// A specialized `Result` type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Time budget for a single fuzzy query. Queries that run past this
    /// report [`EngineError::Timeout`] instead of hanging.
    pub query_timeout: Duration,
    /// Whether referencing an unknown store name creates an empty store
    /// (the default) or fails with [`EngineError::UnknownStore`].
    pub create_missing_stores: bool,
    /// Largest accepted distance budget; anything above is malformed.
    pub max_distance: usize,
    /// Result limits are clamped to this ceiling.
    pub max_results: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            query_timeout: Duration::from_secs(30),
            create_missing_stores: true,
            max_distance: 64,
            max_results: 1000,
        }
    }
}

/// Thin mediator between callers and the stores in a registry.
///
/// Cheap to clone; clones share the registry.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    registry: Arc<StoreRegistry>,
    config: EngineConfig,
}

impl QueryEngine {
    /// Create an engine over a registry.
    pub fn new(registry: Arc<StoreRegistry>, config: EngineConfig) -> Self {
        Self { registry, config }
    }

    /// The registry this engine resolves store names against.
    pub fn registry(&self) -> &Arc<StoreRegistry> {
        &self.registry
    }

    /// The engine's configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Fuzzy lookup: keys within `distance` edits of `term` in the named
    /// store, at most `limit` of them (clamped to the configured ceiling),
    /// ordered by ascending distance and then by key.
    pub fn query(
        &self,
        store: &str,
        term: &str,
        distance: usize,
        limit: usize,
    ) -> Result<Vec<Match>> {
        self.validate_distance(distance)?;
        let store = self.store(store)?;
        let limit = limit.min(self.config.max_results);
        let deadline = Instant::now() + self.config.query_timeout;
        tracing::debug!(term, distance, limit, "fuzzy query");
        store
            .fuzzy(term, distance, limit, Some(deadline))
            .map_err(|_| EngineError::Timeout {
                budget: self.config.query_timeout,
            })
    }

    /// Exact lookup: the value under `key`, or `None`. A miss is a normal
    /// outcome, not an error.
    pub fn exact(&self, store: &str, key: &str) -> Result<Option<String>> {
        Ok(self.store(store)?.get(key))
    }

    /// Insert or update one entry.
    pub fn add(&self, store: &str, key: &str, value: &str) -> Result<()> {
        if key.is_empty() {
            return Err(EngineError::MalformedParameter {
                name: "key",
                reason: "must not be empty".to_string(),
            });
        }
        self.store(store)?.insert(key, value);
        Ok(())
    }

    /// Empty the named store: every previously inserted key is absent from
    /// both exact and fuzzy lookups once this returns.
    pub fn clear(&self, store: &str) -> Result<()> {
        let store_name = store;
        self.store(store)?.clear();
        tracing::info!(store = store_name, "store cleared");
        Ok(())
    }

    /// Insert many entries into the named store. All entries are visible
    /// together once this returns; readers during the load may see a
    /// prefix, never an inconsistent mapping/index pair. Returns the number
    /// of entries applied.
    pub fn bulk_load<I>(&self, store: &str, entries: I) -> Result<usize>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let store_name = store;
        let store = self.store(store)?;
        let applied = store.bulk_insert(entries.into_iter().filter(|(key, _)| !key.is_empty()));
        tracing::info!(store = store_name, applied, "bulk load complete");
        Ok(applied)
    }

    /// Reject a distance budget above the configured ceiling, before any
    /// store or search work.
    pub(crate) fn validate_distance(&self, distance: usize) -> Result<()> {
        if distance > self.config.max_distance {
            return Err(EngineError::MalformedParameter {
                name: "distance",
                reason: format!(
                    "{distance} exceeds the maximum of {}",
                    self.config.max_distance
                ),
            });
        }
        Ok(())
    }

    /// Resolve a store name according to the creation policy.
    pub(crate) fn store(&self, name: &str) -> Result<Arc<DictionaryStore>> {
        if name.is_empty() {
            return Err(EngineError::MalformedParameter {
                name: "store",
                reason: "must not be empty".to_string(),
            });
        }
        if self.config.create_missing_stores {
            Ok(self.registry.resolve(name))
        } else {
            self.registry
                .resolve_existing(name)
                .ok_or_else(|| EngineError::UnknownStore(name.to_string()))
        }
    }
}

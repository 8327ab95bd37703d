//! Named dictionary stores and the process-wide registry.
//!
//! A [`DictionaryStore`] owns a key→value mapping together with the
//! [`FuzzyIndex`] built over its key set. Both live behind one
//! `parking_lot::RwLock`, so a reader can never observe a key present in
//! the mapping but missing from the index (or the reverse): every mutation
//! updates both under the writer lock.
//!
//! The [`StoreRegistry`] maps store names to shared store handles. Each
//! store is its own exclusion domain; mutating one store never blocks
//! readers or writers of another.

use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::index::{DeadlineExceeded, FuzzyIndex, Match};

/// Number of entries inserted per writer-lock acquisition during bulk load.
/// Keeps interactive mutations from stalling behind a large load.
const BULK_CHUNK: usize = 4096;

/// Mapping and index, mutated together under one lock.
#[derive(Debug, Default)]
struct StoreInner {
    entries: FxHashMap<String, String>,
    index: FuzzyIndex,
}

/// A named, isolated key→value dictionary with a fuzzy index over its keys.
#[derive(Debug, Default)]
pub struct DictionaryStore {
    inner: RwLock<StoreInner>,
}

impl DictionaryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries in the store.
    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Upsert an entry. A new key also enters the fuzzy index; re-inserting
    /// an existing key replaces only the value and leaves the index alone.
    pub fn insert(&self, key: &str, value: &str) {
        let mut inner = self.inner.write();
        if !inner.entries.contains_key(key) {
            inner.index.insert(key);
        }
        inner.entries.insert(key.to_string(), value.to_string());
    }

    /// Exact lookup: the value stored under `key`, or `None`. Ignores the
    /// fuzzy index entirely.
    pub fn get(&self, key: &str) -> Option<String> {
        self.inner.read().entries.get(key).cloned()
    }

    /// Fuzzy lookup: every key within `max_distance` edits of `term`,
    /// smallest `limit` matches, ordered by distance then key.
    ///
    /// A budget of zero takes the exact-lookup fast path over the mapping,
    /// which by construction agrees with what the index would report.
    pub fn fuzzy(
        &self,
        term: &str,
        max_distance: usize,
        limit: usize,
        deadline: Option<Instant>,
    ) -> Result<Vec<Match>, DeadlineExceeded> {
        if max_distance == 0 {
            if limit == 0 {
                return Ok(Vec::new());
            }
            let inner = self.inner.read();
            return Ok(match inner.entries.get_key_value(term) {
                Some((key, _)) => vec![Match {
                    key: key.clone(),
                    distance: 0,
                }],
                None => Vec::new(),
            });
        }
        self.inner.read().index.query(term, max_distance, limit, deadline)
    }

    /// Remove every entry and every indexed key, atomically.
    pub fn clear(&self) {
        let mut inner = self.inner.write();
        inner.entries.clear();
        inner.index.clear();
    }

    /// Insert many entries. At least as consistent as repeated
    /// [`insert`](Self::insert): the writer lock is taken per chunk, so
    /// concurrent readers may see a prefix of the load but never a key
    /// that is in the mapping and not in the index. Returns the number of
    /// entries applied.
    pub fn bulk_insert<I>(&self, pairs: I) -> usize
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut applied = 0;
        let mut iter = pairs.into_iter().peekable();
        while iter.peek().is_some() {
            let mut inner = self.inner.write();
            for (key, value) in iter.by_ref().take(BULK_CHUNK) {
                if !inner.entries.contains_key(&key) {
                    inner.index.insert(&key);
                }
                inner.entries.insert(key, value);
                applied += 1;
            }
        }
        applied
    }

    /// Snapshot of every key, sorted. Used by the benchmark harness for
    /// deterministic sampling; not intended for hot paths.
    pub fn snapshot_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.inner.read().entries.keys().cloned().collect();
        keys.sort_unstable();
        keys
    }
}

/// Process-wide table of named dictionary stores.
///
/// Stores are created lazily on first resolution; the `DashMap` entry API
/// guarantees that a creation race over one name still yields a single
/// store. Stores are never deleted during the registry's lifetime —
/// clearing empties a store but keeps its handle valid.
#[derive(Debug, Default)]
pub struct StoreRegistry {
    stores: DashMap<String, Arc<DictionaryStore>>,
}

impl StoreRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a store by name, creating it if absent.
    pub fn resolve(&self, name: &str) -> Arc<DictionaryStore> {
        if let Some(store) = self.stores.get(name) {
            return Arc::clone(&store);
        }
        Arc::clone(
            &self
                .stores
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(DictionaryStore::new())),
        )
    }

    /// Resolve a store by name without creating it.
    pub fn resolve_existing(&self, name: &str) -> Option<Arc<DictionaryStore>> {
        self.stores.get(name).map(|store| Arc::clone(&store))
    }

    /// Whether a store with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.stores.contains_key(name)
    }

    /// Number of stores in the registry.
    pub fn len(&self) -> usize {
        self.stores.len()
    }

    /// Whether the registry holds no stores.
    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

//! Signature-filtered fuzzy index over a store's key set.
//!
//! Keys are bucketed first by character count, then by their 32-bit XOR
//! signature. A bounded query only visits buckets whose character count is
//! within the distance budget of the query term, discards whole signature
//! groups via [`signature_lower_bound`], discards individual candidates via
//! [`extended_lower_bound`], and runs the threshold-bounded DP only on
//! whatever survives. Insertion is incremental: one key enters one bucket,
//! nothing is rebuilt.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Instant;

use rustc_hash::FxHashMap;
use serde::Serialize;
use smallvec::SmallVec;
use thiserror::Error;

use crate::distance::{
    extended_lower_bound, extended_signature, levenshtein_within, signature,
    signature_lower_bound,
};

/// A key matched by a fuzzy query, with its edit distance from the term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match {
    /// The matching dictionary key.
    pub key: String,
    /// Levenshtein distance between the query term and `key`.
    pub distance: usize,
}

impl Ord for Match {
    /// Ascending distance, then lexicographic key (deterministic tie-break).
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .cmp(&other.distance)
            .then_with(|| self.key.cmp(&other.key))
    }
}

impl PartialOrd for Match {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A bounded query ran out of time before visiting every candidate bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("fuzzy query deadline exceeded")]
pub struct DeadlineExceeded;

/// One indexed key with its precomputed extended signature.
#[derive(Debug, Clone)]
struct IndexedKey {
    key: Box<str>,
    extended: u64,
}

/// Keys sharing one XOR signature within one length bucket. Collisions are
/// rare, so the inline capacity covers almost every group.
type SignatureGroup = SmallVec<[IndexedKey; 2]>;

/// Incremental fuzzy index supporting Levenshtein-bounded queries.
///
/// The index stores keys only; values live in the owning store. It must be
/// kept in lockstep with the store's key set, which the store guarantees by
/// mutating both under one writer lock.
#[derive(Debug, Default)]
pub struct FuzzyIndex {
    /// character count → XOR signature → keys
    buckets: FxHashMap<usize, FxHashMap<u32, SignatureGroup>>,
    len: usize,
}

impl FuzzyIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys in the index.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the index holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Add a key to the index. Returns `false` if the key was already
    /// present (the index is unchanged in that case).
    pub fn insert(&mut self, key: &str) -> bool {
        let chars = key.chars().count();
        let sig = signature(key);
        let group = self
            .buckets
            .entry(chars)
            .or_default()
            .entry(sig)
            .or_default();
        if group.iter().any(|entry| &*entry.key == key) {
            return false;
        }
        group.push(IndexedKey {
            key: Box::from(key),
            extended: extended_signature(key),
        });
        self.len += 1;
        true
    }

    /// Remove every key from the index.
    pub fn clear(&mut self) {
        self.buckets.clear();
        self.len = 0;
    }

    /// Find every key within `max_distance` edits of `term` and return the
    /// smallest `limit` matches, ordered by ascending distance and then by
    /// key.
    ///
    /// A `deadline` in the past aborts the scan with [`DeadlineExceeded`];
    /// the deadline is checked once per length bucket, so a query over an
    /// empty or tiny index always completes.
    pub fn query(
        &self,
        term: &str,
        max_distance: usize,
        limit: usize,
        deadline: Option<Instant>,
    ) -> Result<Vec<Match>, DeadlineExceeded> {
        if limit == 0 || self.is_empty() {
            return Ok(Vec::new());
        }

        let term_chars = term.chars().count();
        let term_sig = signature(term);
        let term_extended = extended_signature(term);

        // Top-k: a max-heap capped at `limit` keeps the smallest matches.
        let mut best: BinaryHeap<Match> = BinaryHeap::with_capacity(limit.min(1024) + 1);

        // Only lengths actually present bound the scan; this also keeps a
        // huge budget from walking an absurd range of empty buckets.
        let longest = self.buckets.keys().max().copied().unwrap_or(0);
        let lo = term_chars.saturating_sub(max_distance);
        let hi = term_chars.saturating_add(max_distance).min(longest);
        for chars in lo..=hi {
            if let Some(deadline) = deadline {
                if Instant::now() >= deadline {
                    return Err(DeadlineExceeded);
                }
            }
            let Some(bucket) = self.buckets.get(&chars) else {
                continue;
            };
            let length_diff = chars.abs_diff(term_chars);
            for (&sig, group) in bucket {
                if signature_lower_bound(term_sig, sig, length_diff) > max_distance {
                    continue;
                }
                for entry in group {
                    if extended_lower_bound(term_extended, entry.extended, length_diff)
                        > max_distance
                    {
                        continue;
                    }
                    if let Some(distance) = levenshtein_within(term, &entry.key, max_distance) {
                        best.push(Match {
                            key: entry.key.to_string(),
                            distance,
                        });
                        if best.len() > limit {
                            best.pop();
                        }
                    }
                }
            }
        }

        Ok(best.into_sorted_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_of(keys: &[&str]) -> FuzzyIndex {
        let mut index = FuzzyIndex::new();
        for key in keys {
            assert!(index.insert(key));
        }
        index
    }

    #[test]
    fn insert_is_idempotent() {
        let mut index = FuzzyIndex::new();
        assert!(index.insert("hello"));
        assert!(!index.insert("hello"));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn query_orders_by_distance_then_key() {
        let index = index_of(&["hello", "help", "helm", "world"]);
        let matches = index.query("hell", 1, 10, None).unwrap();
        let pairs: Vec<_> = matches
            .iter()
            .map(|m| (m.key.as_str(), m.distance))
            .collect();
        assert_eq!(pairs, vec![("hello", 1), ("helm", 1), ("help", 1)]);
    }

    #[test]
    fn limit_keeps_smallest_matches() {
        let index = index_of(&["hello", "help", "helm", "hell"]);
        let matches = index.query("hell", 2, 2, None).unwrap();
        let pairs: Vec<_> = matches
            .iter()
            .map(|m| (m.key.as_str(), m.distance))
            .collect();
        assert_eq!(pairs, vec![("hell", 0), ("helm", 1)]);
    }

    #[test]
    fn zero_distance_requires_identity() {
        let index = index_of(&["hello", "help"]);
        assert!(index.query("hell", 0, 5, None).unwrap().is_empty());
        let exact = index.query("help", 0, 5, None).unwrap();
        assert_eq!(exact.len(), 1);
        assert_eq!(exact[0].key, "help");
        assert_eq!(exact[0].distance, 0);
    }

    #[test]
    fn empty_term_matches_by_key_length() {
        let index = index_of(&["a", "ab", "abc"]);
        let matches = index.query("", 2, 10, None).unwrap();
        let pairs: Vec<_> = matches
            .iter()
            .map(|m| (m.key.as_str(), m.distance))
            .collect();
        assert_eq!(pairs, vec![("a", 1), ("ab", 2)]);
    }

    #[test]
    fn empty_index_yields_empty_results() {
        let index = FuzzyIndex::new();
        assert!(index.query("anything", 3, 10, None).unwrap().is_empty());
    }

    #[test]
    fn zero_limit_yields_empty_results() {
        let index = index_of(&["hello"]);
        assert!(index.query("hello", 1, 0, None).unwrap().is_empty());
    }

    #[test]
    fn expired_deadline_aborts() {
        let index = index_of(&["hello", "help"]);
        let past = Instant::now() - std::time::Duration::from_millis(1);
        assert_eq!(
            index.query("hell", 1, 5, Some(past)),
            Err(DeadlineExceeded)
        );
    }

    #[test]
    fn clear_empties_the_index() {
        let mut index = index_of(&["hello", "help"]);
        index.clear();
        assert!(index.is_empty());
        assert!(index.query("hello", 2, 5, None).unwrap().is_empty());
    }
}

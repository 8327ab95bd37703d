//! Benchmark harness: accuracy and latency of fuzzy lookup under
//! controlled query corruption.
//!
//! A run samples keys from a store, corrupts each with a fixed number of
//! random single-character edits, replays the corrupted terms through the
//! query engine, and reports what fraction of lookups recovered the
//! original key and how long the whole batch took.
//!
//! Corruption policy: every edit is drawn uniformly from insert, delete,
//! and substitute at a uniformly random position (delete is skipped when
//! the intermediate string is empty; substitution always picks a character
//! different from the one it replaces). Later edits may interact with
//! earlier ones, so the corrupted term is guaranteed to be within the
//! requested distance of the original, and is at exactly that distance
//! with high probability.

use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::engine::{EngineError, QueryEngine, Result};

/// Parameters for one benchmark run. Not persisted; lives for one run.
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Store to sample keys from and query against.
    pub store: String,
    /// Edit-distance budget, used both to corrupt and to query.
    pub distance: usize,
    /// Number of keys to sample.
    pub keys: usize,
    /// Result limit passed to each fuzzy lookup.
    pub results: usize,
    /// RNG seed for reproducible corruption; a fixed seed against a fixed
    /// dictionary yields a stable accuracy across runs.
    pub seed: Option<u64>,
}

/// Aggregate outcome of one benchmark run. No per-key detail is kept.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkReport {
    /// Edit-distance budget the run was measured at.
    pub distance: usize,
    /// Number of corrupted lookups issued.
    pub keys: usize,
    /// Result limit each lookup was issued with.
    pub results: usize,
    /// Percentage of lookups whose results contained the original key,
    /// in [0, 100].
    pub accuracy: f64,
    /// Wall-clock milliseconds elapsed for the whole batch of lookups
    /// (sampling and corruption excluded).
    pub time: f64,
}

/// Apply exactly `edits` random single-character edits to `term`.
///
/// See the module documentation for the corruption policy and its
/// distance guarantee.
pub fn corrupt_term<R: Rng>(term: &str, edits: usize, rng: &mut R) -> String {
    let mut chars: Vec<char> = term.chars().collect();
    for _ in 0..edits {
        // 0 = insert, 1 = delete, 2 = substitute
        let op = if chars.is_empty() { 0 } else { rng.gen_range(0..3) };
        match op {
            0 => {
                let pos = rng.gen_range(0..=chars.len());
                chars.insert(pos, random_letter(rng));
            }
            1 => {
                let pos = rng.gen_range(0..chars.len());
                chars.remove(pos);
            }
            _ => {
                let pos = rng.gen_range(0..chars.len());
                let replacement = loop {
                    let candidate = random_letter(rng);
                    if candidate != chars[pos] {
                        break candidate;
                    }
                };
                chars[pos] = replacement;
            }
        }
    }
    chars.into_iter().collect()
}

fn random_letter<R: Rng>(rng: &mut R) -> char {
    char::from(b'a' + rng.gen_range(0..26u8))
}

/// Execute one benchmark run against the engine.
///
/// Samples `config.keys` distinct keys from the store (failing with
/// [`EngineError::InsufficientKeys`] if the store holds fewer), corrupts
/// each with `config.distance` edits, and issues one fuzzy lookup per
/// corrupted term through the ordinary shared-read query path — the run
/// never holds a store lock across the sweep, so interactive mutations
/// interleave freely.
pub fn run_benchmark(engine: &QueryEngine, config: &BenchmarkConfig) -> Result<BenchmarkReport> {
    // Fail fast, before any sampling or corruption work, and resolve the
    // store through the engine so its creation policy applies.
    engine.validate_distance(config.distance)?;
    let store = engine.store(&config.store)?;
    let all_keys = store.snapshot_keys();
    if all_keys.len() < config.keys {
        return Err(EngineError::InsufficientKeys {
            requested: config.keys,
            available: all_keys.len(),
        });
    }

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let sample = rand::seq::index::sample(&mut rng, all_keys.len(), config.keys);
    let queries: Vec<(String, String)> = sample
        .iter()
        .map(|i| {
            let key = all_keys[i].clone();
            let corrupted = corrupt_term(&key, config.distance, &mut rng);
            (key, corrupted)
        })
        .collect();

    tracing::debug!(
        store = %config.store,
        distance = config.distance,
        keys = config.keys,
        results = config.results,
        "benchmark run starting"
    );

    let mut hits = 0usize;
    let start = Instant::now();
    for (key, corrupted) in &queries {
        let matches = engine.query(&config.store, corrupted, config.distance, config.results)?;
        if matches.iter().any(|m| &m.key == key) {
            hits += 1;
        }
    }
    let elapsed = start.elapsed();

    let accuracy = if config.keys == 0 {
        0.0
    } else {
        100.0 * hits as f64 / config.keys as f64
    };

    Ok(BenchmarkReport {
        distance: config.distance,
        keys: config.keys,
        results: config.results,
        accuracy,
        time: elapsed.as_secs_f64() * 1_000.0,
    })
}

//! Property tests cross-validating the fuzzy index against a naive
//! linear scan, plus ordering and monotonicity properties.

use std::collections::BTreeSet;

use proptest::prelude::*;

use fuzzystore::distance::levenshtein;
use fuzzystore::index::FuzzyIndex;

/// Reference implementation: score every key with the full DP and keep
/// those within budget.
fn naive_scan(keys: &BTreeSet<String>, term: &str, max_distance: usize) -> Vec<(String, usize)> {
    let mut matches: Vec<(String, usize)> = keys
        .iter()
        .filter_map(|key| {
            let d = levenshtein(term, key);
            (d <= max_distance).then(|| (key.clone(), d))
        })
        .collect();
    matches.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    matches
}

fn small_word() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-e]{0,6}").unwrap()
}

proptest! {
    #[test]
    fn index_agrees_with_linear_scan(
        keys in proptest::collection::btree_set(small_word(), 0..40),
        term in small_word(),
        max_distance in 0usize..4,
    ) {
        let mut index = FuzzyIndex::new();
        for key in &keys {
            index.insert(key);
        }

        let expected = naive_scan(&keys, &term, max_distance);
        let actual: Vec<(String, usize)> = index
            .query(&term, max_distance, usize::MAX, None)
            .unwrap()
            .into_iter()
            .map(|m| (m.key, m.distance))
            .collect();

        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn results_are_monotone_in_distance_budget(
        keys in proptest::collection::btree_set(small_word(), 0..40),
        term in small_word(),
        d1 in 0usize..3,
        extra in 1usize..3,
    ) {
        let mut index = FuzzyIndex::new();
        for key in &keys {
            index.insert(key);
        }
        let d2 = d1 + extra;

        let narrow: BTreeSet<String> = index
            .query(&term, d1, usize::MAX, None)
            .unwrap()
            .into_iter()
            .map(|m| m.key)
            .collect();
        let wide: BTreeSet<String> = index
            .query(&term, d2, usize::MAX, None)
            .unwrap()
            .into_iter()
            .map(|m| m.key)
            .collect();

        prop_assert!(narrow.is_subset(&wide));
    }

    #[test]
    fn limited_results_are_a_prefix_of_unlimited(
        keys in proptest::collection::btree_set(small_word(), 0..40),
        term in small_word(),
        max_distance in 0usize..4,
        limit in 0usize..10,
    ) {
        let mut index = FuzzyIndex::new();
        for key in &keys {
            index.insert(key);
        }

        let all = index.query(&term, max_distance, usize::MAX, None).unwrap();
        let limited = index.query(&term, max_distance, limit, None).unwrap();

        prop_assert_eq!(limited.len(), all.len().min(limit));
        prop_assert_eq!(&limited[..], &all[..limited.len()]);
    }

    #[test]
    fn reported_distances_are_correct(
        keys in proptest::collection::btree_set(small_word(), 0..40),
        term in small_word(),
        max_distance in 0usize..4,
    ) {
        let mut index = FuzzyIndex::new();
        for key in &keys {
            index.insert(key);
        }

        for m in index.query(&term, max_distance, usize::MAX, None).unwrap() {
            prop_assert_eq!(m.distance, levenshtein(&term, &m.key));
            prop_assert!(m.distance <= max_distance);
        }
    }
}

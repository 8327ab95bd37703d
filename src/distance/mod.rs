//! Levenshtein distance computation and signature-based lower bounds.
//!
//! Two kinds of primitives live here:
//!
//! - **Distance functions**: a plain two-row dynamic-programming
//!   implementation, and a threshold-bounded variant that abandons a
//!   comparison as soon as the running row minimum proves the distance
//!   exceeds the budget.
//! - **Signatures**: cheap per-string fingerprints (a 32-bit XOR histogram
//!   and a 64-bit saturating-counter histogram) whose pairwise comparison
//!   yields a lower bound on the true distance. The fuzzy index uses them
//!   to discard most candidates without running any DP.
//!
//! All functions operate on Unicode scalar values (`char`), so "length"
//! throughout means character count, not byte count.

use smallvec::SmallVec;

/// Inline capacity for character buffers; most dictionary keys are short.
type CharBuf = SmallVec<[char; 32]>;

/// Mask selecting the low bits of a code point that pick a signature bit.
const SIGNATURE_MASK: u32 = 31;

/// Width in bits of one extended-signature counter bucket.
const BUCKET_BITS: u32 = 2;

/// Saturation value of one extended-signature counter bucket.
const BUCKET_MASK: u64 = (1 << BUCKET_BITS) - 1;

/// Number of counter buckets in an extended signature.
const BUCKET_COUNT: u32 = 64 / BUCKET_BITS;

/// Compute the Levenshtein distance between two strings.
///
/// Unit-cost insertions, deletions, and substitutions. Uses the classic
/// two-row dynamic program in O(|a|·|b|) time and O(min(|a|,|b|)) space.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: CharBuf = a.chars().collect();
    let b: CharBuf = b.chars().collect();
    let (short, long) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };

    if short.is_empty() {
        return long.len();
    }

    let mut prev: Vec<usize> = (0..=short.len()).collect();
    let mut curr: Vec<usize> = vec![0; short.len() + 1];

    for (i, &lc) in long.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &sc) in short.iter().enumerate() {
            let cost = usize::from(lc != sc);
            curr[j + 1] = (curr[j] + 1).min(prev[j + 1] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[short.len()]
}

/// Compute the Levenshtein distance between two strings if and only if it
/// does not exceed `threshold`.
///
/// Returns `Some(distance)` when `distance <= threshold`, otherwise `None`.
/// Comparisons are abandoned early: a character-count difference larger
/// than the threshold short-circuits before any DP work, and each DP row
/// tracks its minimum so a hopeless comparison stops at the first row
/// whose best cell already exceeds the budget.
pub fn levenshtein_within(a: &str, b: &str, threshold: usize) -> Option<usize> {
    let a: CharBuf = a.chars().collect();
    let b: CharBuf = b.chars().collect();
    let (short, long) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };

    if long.len() - short.len() > threshold {
        return None;
    }
    if short.is_empty() {
        // Distance is the longer length; already known to be within budget.
        return Some(long.len());
    }

    let mut prev: Vec<usize> = (0..=long.len()).collect();
    let mut curr: Vec<usize> = vec![0; long.len() + 1];

    for (i, &sc) in short.iter().enumerate() {
        curr[0] = i + 1;
        let mut row_min = curr[0];
        for (j, &lc) in long.iter().enumerate() {
            let cost = usize::from(sc != lc);
            curr[j + 1] = (curr[j] + 1).min(prev[j + 1] + 1).min(prev[j] + cost);
            row_min = row_min.min(curr[j + 1]);
        }
        if row_min > threshold {
            return None;
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    let distance = prev[long.len()];
    (distance <= threshold).then_some(distance)
}

/// Compute the 32-bit XOR histogram signature of a string.
///
/// Each character toggles the bit selected by the low five bits of its
/// code point. Two strings at small edit distance have nearby signatures,
/// which [`signature_lower_bound`] turns into a distance lower bound.
pub fn signature(s: &str) -> u32 {
    let mut result = 0u32;
    for c in s.chars() {
        result ^= 1 << (c as u32 & SIGNATURE_MASK);
    }
    result
}

/// Lower-bound the Levenshtein distance from two XOR signatures and the
/// character-count difference of the underlying strings.
///
/// A substitution toggles at most two signature bits; an insertion or
/// deletion toggles at most one and contributes one to the length
/// difference. Hence `(popcount(a ^ b) + length_diff) / 2` never exceeds
/// the true distance.
pub fn signature_lower_bound(a: u32, b: u32, length_diff: usize) -> usize {
    (((a ^ b).count_ones() as usize) + length_diff) >> 1
}

/// Compute the 64-bit extended signature of a string.
///
/// Thirty-two 2-bit saturating counters, one per character class
/// (code point mod 32). A finer but slower filter than [`signature`];
/// the index applies it only to candidates that survive the XOR filter.
pub fn extended_signature(s: &str) -> u64 {
    let mut buckets = [0u64; BUCKET_COUNT as usize];
    for c in s.chars() {
        let index = (c as u32 % BUCKET_COUNT) as usize;
        if buckets[index] < BUCKET_MASK {
            buckets[index] += 1;
        }
    }
    let mut result = 0u64;
    for (i, &count) in buckets.iter().enumerate() {
        result |= count << (i as u32 * BUCKET_BITS);
    }
    result
}

/// Lower-bound the Levenshtein distance from two extended signatures and
/// the character-count difference of the underlying strings.
pub fn extended_lower_bound(mut a: u64, mut b: u64, length_diff: usize) -> usize {
    let mut result = length_diff;
    for _ in 0..BUCKET_COUNT {
        let bucket_a = a & BUCKET_MASK;
        let bucket_b = b & BUCKET_MASK;
        result += bucket_a.abs_diff(bucket_b) as usize;
        a >>= BUCKET_BITS;
        b >>= BUCKET_BITS;
    }
    result >> 1
}

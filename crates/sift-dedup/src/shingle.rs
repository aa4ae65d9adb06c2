//! Word n-gram shingling.

use std::collections::HashSet;

/// Set of unique word n-grams for one document.
pub type ShingleSet = HashSet<String>;

/// Extract the set of contiguous `n`-word windows from normalized text.
///
/// Tokens are separated by whitespace and each window is joined with a
/// single space. Text with fewer than `n` tokens yields an empty set.
///
/// # Panics
///
/// Panics if `n == 0`. Configurations are validated before any corpus pass,
/// so reaching this with zero is a caller bug.
#[must_use]
pub fn shingles(normalized: &str, n: usize) -> ShingleSet {
    assert!(n >= 1, "n-gram size must be at least 1");

    let words: Vec<&str> = normalized.split_whitespace().collect();
    if words.len() < n {
        return ShingleSet::new();
    }

    words.windows(n).map(|window| window.join(" ")).collect()
}

//! Exact Jaccard similarity and candidate confirmation.

use crate::corpus::{Corpus, DocId};
use rayon::prelude::*;
use std::collections::HashSet;
use std::hash::Hash;

/// Jaccard similarity `|a ∩ b| / |a ∪ b|`.
///
/// Two empty sets are identical (1.0).
#[must_use]
pub fn similarity<T: Eq + Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }

    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let intersection = small.iter().filter(|x| large.contains(*x)).count();
    let union = a.len() + b.len() - intersection;

    intersection as f64 / union as f64
}

/// A confirmed duplicate edge between two documents.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Edge {
    /// Smaller document id.
    pub a: DocId,
    /// Larger document id.
    pub b: DocId,
    /// Exact Jaccard similarity of the pair.
    pub similarity: f64,
}

/// Confirm candidate pairs against their shingle sets.
///
/// Each distinct pair is compared once no matter how many buckets it came
/// from. Comparisons run in parallel; the returned edges are sorted by
/// `(a, b)` so the output does not depend on scheduling.
#[must_use]
pub fn confirm_pairs<I>(candidates: I, corpus: &Corpus, threshold: f64) -> Vec<Edge>
where
    I: IntoIterator<Item = (DocId, DocId)>,
{
    let pairs: HashSet<(DocId, DocId)> = candidates
        .into_iter()
        .filter(|(x, y)| x != y)
        .map(|(x, y)| if x < y { (x, y) } else { (y, x) })
        .collect();

    let mut edges: Vec<Edge> = pairs
        .into_par_iter()
        .filter_map(|(a, b)| {
            let similarity = similarity(&corpus[a].shingles, &corpus[b].shingles);
            (similarity >= threshold).then_some(Edge { a, b, similarity })
        })
        .collect();

    edges.sort_by_key(|e| (e.a, e.b));
    edges
}

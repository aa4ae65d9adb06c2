//! Locality-Sensitive Hashing (LSH) for candidate pair generation.
//!
//! LSH groups similar documents into buckets based on their MinHash signatures,
//! allowing near-linear candidate generation instead of comparing all pairs.
//! Bucket membership is only a recall filter; pairs are confirmed later by
//! exact Jaccard similarity.

use crate::corpus::DocId;
use crate::minhash::MinHashSignature;
use sift_core::{Result, SiftError};
use std::collections::{HashMap, HashSet};

/// Key of one LSH bucket: the band index plus that band's signature rows.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BucketKey {
    /// Band index in `0..num_bands`.
    pub band: usize,
    /// The `rows_per_band` signature values of this band.
    pub rows: Vec<u64>,
}

/// LSH index for finding candidate duplicate pairs.
///
/// The index divides each MinHash signature into bands of rows.
/// Documents that share the exact rows of at least one band are candidates.
#[derive(Debug)]
pub struct LshIndex {
    /// Number of bands (groups of rows).
    num_bands: usize,
    /// Rows per band.
    rows_per_band: usize,
    /// Buckets for each band: band_id -> band rows -> doc_ids.
    buckets: Vec<HashMap<Vec<u64>, Vec<DocId>>>,
}

impl LshIndex {
    /// Create an index for signatures of `num_hashes` values split into
    /// `num_bands` bands.
    ///
    /// Fails unless `num_bands` evenly divides `num_hashes`; trailing rows
    /// are never dropped.
    pub fn new(num_hashes: usize, num_bands: usize) -> Result<Self> {
        if num_bands == 0 {
            return Err(SiftError::config("num_bands must be > 0"));
        }
        if num_hashes == 0 {
            return Err(SiftError::config("num_hashes must be > 0"));
        }
        if num_hashes % num_bands != 0 {
            return Err(SiftError::config(format!(
                "num_hashes ({num_hashes}) must be divisible by num_bands ({num_bands})"
            )));
        }

        Ok(Self {
            num_bands,
            rows_per_band: num_hashes / num_bands,
            buckets: (0..num_bands).map(|_| HashMap::new()).collect(),
        })
    }

    /// Get the number of bands.
    #[must_use]
    pub fn num_bands(&self) -> usize {
        self.num_bands
    }

    /// Get the number of rows per band.
    #[must_use]
    pub fn rows_per_band(&self) -> usize {
        self.rows_per_band
    }

    /// Signature length this index accepts.
    #[must_use]
    pub fn signature_len(&self) -> usize {
        self.num_bands * self.rows_per_band
    }

    /// Add a document signature to the index.
    ///
    /// The document lands in exactly one bucket per band.
    ///
    /// # Panics
    ///
    /// Panics if the signature length differs from [`Self::signature_len`].
    pub fn insert(&mut self, doc_id: DocId, signature: &MinHashSignature) {
        assert_eq!(
            signature.len(),
            self.signature_len(),
            "Signature length does not match LSH configuration"
        );

        for (band, buckets) in self.buckets.iter_mut().enumerate() {
            let rows = signature.band(band * self.rows_per_band, self.rows_per_band);
            buckets.entry(rows.to_vec()).or_default().push(doc_id);
        }
    }

    /// Iterate over every bucket as `(band, rows, members)`.
    pub fn buckets(&self) -> impl Iterator<Item = (usize, &[u64], &[DocId])> + '_ {
        self.buckets.iter().enumerate().flat_map(|(band, band_buckets)| {
            band_buckets
                .iter()
                .map(move |(rows, docs)| (band, rows.as_slice(), docs.as_slice()))
        })
    }

    /// Buckets with at least two members; singletons cannot yield pairs.
    pub fn candidate_buckets(&self) -> impl Iterator<Item = &[DocId]> + '_ {
        self.buckets()
            .map(|(_, _, docs)| docs)
            .filter(|docs| docs.len() > 1)
    }

    /// Get all candidate pairs from the index.
    ///
    /// Returns unique `(a, b)` pairs with `a < b` whose documents share at
    /// least one bucket. Pairs shared by several buckets are yielded once.
    pub fn candidate_pairs(&self) -> impl Iterator<Item = (DocId, DocId)> + '_ {
        let mut seen = HashSet::new();

        self.candidate_buckets()
            .flat_map(|bucket| {
                bucket.iter().enumerate().flat_map(move |(i, &id1)| {
                    bucket[i + 1..]
                        .iter()
                        .map(move |&id2| if id1 < id2 { (id1, id2) } else { (id2, id1) })
                })
            })
            .filter(|(a, b)| a != b)
            .filter(move |pair| seen.insert(*pair))
    }

    /// Get the number of buckets with multiple documents.
    #[must_use]
    pub fn num_collision_buckets(&self) -> usize {
        self.candidate_buckets().count()
    }

    /// Get the number of distinct documents in the index.
    #[must_use]
    pub fn num_documents(&self) -> usize {
        // Every document is in exactly one bucket of band 0.
        self.buckets
            .first()
            .map_or(0, |band| band.values().map(Vec::len).sum())
    }

    /// Consume the index into a flat bucket map.
    #[must_use]
    pub fn into_buckets(self) -> HashMap<BucketKey, Vec<DocId>> {
        self.buckets
            .into_iter()
            .enumerate()
            .flat_map(|(band, band_buckets)| {
                band_buckets
                    .into_iter()
                    .map(move |(rows, docs)| (BucketKey { band, rows }, docs))
            })
            .collect()
    }
}

/// Group documents into LSH buckets by band.
///
/// The signature length is taken from the first signature; every signature
/// must share it and `num_bands` must divide it.
pub fn bucket<'a, I>(signatures: I, num_bands: usize) -> Result<HashMap<BucketKey, Vec<DocId>>>
where
    I: IntoIterator<Item = (DocId, &'a MinHashSignature)>,
{
    let mut signatures = signatures.into_iter().peekable();
    let Some((_, first)) = signatures.peek() else {
        if num_bands == 0 {
            return Err(SiftError::config("num_bands must be > 0"));
        }
        return Ok(HashMap::new());
    };

    let mut index = LshIndex::new(first.len(), num_bands)?;
    for (doc_id, signature) in signatures {
        if signature.len() != index.signature_len() {
            return Err(SiftError::InvalidFormat(format!(
                "signature for document {doc_id} has {} values, expected {}",
                signature.len(),
                index.signature_len()
            )));
        }
        index.insert(doc_id, signature);
    }

    Ok(index.into_buckets())
}

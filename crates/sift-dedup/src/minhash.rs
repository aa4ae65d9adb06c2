//! MinHash signature generation for document similarity.
//!
//! MinHash is a locality-sensitive hashing technique that approximates
//! the Jaccard similarity between sets. Hash function `i` is the seeded
//! xxh3 family member `seed + i`, so signatures depend only on the shingle
//! set and the caller's seed.

use crate::shingle::ShingleSet;
use sift_core::hashing::hash_with_seed;

/// Signature value used for every slot of an empty shingle set.
pub const EMPTY_SLOT: u64 = 0;

/// MinHash signature - a compact representation of a document's shingle set.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct MinHashSignature {
    /// The minimum hash values for each hash function.
    pub values: Vec<u64>,
}

impl MinHashSignature {
    /// Create a new signature with the given values.
    #[must_use]
    pub fn new(values: Vec<u64>) -> Self {
        Self { values }
    }

    /// Get the number of hash functions in this signature.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the signature is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Rows `[start, start + rows)` of the signature.
    #[must_use]
    pub fn band(&self, start: usize, rows: usize) -> &[u64] {
        &self.values[start..start + rows]
    }
}

/// MinHash signature generator.
#[derive(Debug, Clone)]
pub struct MinHasher {
    /// Number of hash functions.
    num_hashes: usize,
    /// Seed of hash function 0.
    seed: u64,
}

impl MinHasher {
    /// Create a new MinHasher with `num_hashes` functions anchored at `seed`.
    #[must_use]
    pub fn new(num_hashes: usize, seed: u64) -> Self {
        Self { num_hashes, seed }
    }

    /// Get the number of hash functions.
    #[must_use]
    pub fn num_hashes(&self) -> usize {
        self.num_hashes
    }

    /// Get the base seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Generate a MinHash signature from a shingle set.
    ///
    /// Each shingle is hashed with each function, and the minimum
    /// hash value is kept per function. An empty set maps to a signature
    /// of [`EMPTY_SLOT`] values so empty documents remain comparable.
    #[must_use]
    pub fn signature(&self, shingles: &ShingleSet) -> MinHashSignature {
        if shingles.is_empty() {
            return MinHashSignature::new(vec![EMPTY_SLOT; self.num_hashes]);
        }

        let mut min_hashes = vec![u64::MAX; self.num_hashes];

        for shingle in shingles {
            let bytes = shingle.as_bytes();
            for (i, slot) in min_hashes.iter_mut().enumerate() {
                let hash = hash_with_seed(bytes, self.seed.wrapping_add(i as u64));
                *slot = (*slot).min(hash);
            }
        }

        MinHashSignature::new(min_hashes)
    }

    /// Estimate Jaccard similarity from two MinHash signatures.
    ///
    /// The similarity is approximated by the fraction of hash values
    /// that match between the two signatures.
    #[must_use]
    pub fn similarity(sig1: &MinHashSignature, sig2: &MinHashSignature) -> f64 {
        assert_eq!(
            sig1.values.len(),
            sig2.values.len(),
            "Signatures must have the same length"
        );

        if sig1.values.is_empty() {
            return 0.0;
        }

        let matches = sig1
            .values
            .iter()
            .zip(sig2.values.iter())
            .filter(|(a, b)| a == b)
            .count();

        matches as f64 / sig1.values.len() as f64
    }
}

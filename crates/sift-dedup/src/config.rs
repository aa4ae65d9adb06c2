//! Fuzzy deduplication parameters.

use serde::{Deserialize, Serialize};
use sift_core::{Result, SiftError};
use std::path::Path;

/// Parameters for MinHash/LSH deduplication.
///
/// Every field is explicit; there is no `Default`. Call [`DedupConfig::validate`]
/// before reading any input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DedupConfig {
    /// Signature length (number of MinHash functions).
    pub num_hashes: usize,
    /// Number of LSH bands; must divide `num_hashes`.
    pub num_bands: usize,
    /// Word n-gram size for shingling.
    pub ngram_size: usize,
    /// Minimum exact Jaccard similarity for a confirmed duplicate edge.
    pub jaccard_threshold: f64,
    /// Seed of the MinHash function family.
    pub seed: u64,
}

impl DedupConfig {
    /// Create a config from all parameters.
    #[must_use]
    pub fn new(
        num_hashes: usize,
        num_bands: usize,
        ngram_size: usize,
        jaccard_threshold: f64,
        seed: u64,
    ) -> Self {
        Self {
            num_hashes,
            num_bands,
            ngram_size,
            jaccard_threshold,
            seed,
        }
    }

    /// Load a config from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        serde_json::from_str(&raw)
            .map_err(|e| SiftError::InvalidFormat(format!("{}: {e}", path.display())))
    }

    /// Check every parameter contract.
    pub fn validate(&self) -> Result<()> {
        if self.num_hashes == 0 {
            return Err(SiftError::config("num_hashes must be > 0"));
        }
        if self.num_bands == 0 {
            return Err(SiftError::config("num_bands must be > 0"));
        }
        if self.num_hashes % self.num_bands != 0 {
            return Err(SiftError::config(format!(
                "num_hashes ({}) must be divisible by num_bands ({})",
                self.num_hashes, self.num_bands
            )));
        }
        if self.ngram_size == 0 {
            return Err(SiftError::config("ngram_size must be > 0"));
        }
        if !(0.0..=1.0).contains(&self.jaccard_threshold) {
            return Err(SiftError::config(format!(
                "jaccard_threshold must be between 0.0 and 1.0, got {}",
                self.jaccard_threshold
            )));
        }
        Ok(())
    }

    /// Rows per LSH band. Only meaningful on a validated config.
    #[must_use]
    pub fn rows_per_band(&self) -> usize {
        self.num_hashes / self.num_bands.max(1)
    }

    /// Approximate similarity at which a pair becomes an LSH candidate with
    /// probability one half, `(1/b)^(1/r)`.
    #[must_use]
    pub fn lsh_threshold(&self) -> f64 {
        let b = self.num_bands.max(1) as f64;
        let r = self.rows_per_band().max(1) as f64;
        (1.0 / b).powf(1.0 / r)
    }
}

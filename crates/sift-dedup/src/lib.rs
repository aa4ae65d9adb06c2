//! # sift-dedup
//!
//! Duplicate removal for plain-text training corpora.
//!
//! Two independent pipelines:
//! - **Exact line dedup** ([`ExactDeduplicator`]): drops every line whose
//!   content occurs more than once anywhere in the corpus.
//! - **Fuzzy document dedup** ([`FuzzyDeduplicator`]): normalizes and
//!   shingles each document, computes MinHash signatures, buckets them with
//!   LSH banding, confirms candidates by exact Jaccard similarity, clusters
//!   the confirmed pairs and keeps one document per cluster.
//!
//! ## Quick Start
//!
//! ```no_run
//! use sift_dedup::{DedupConfig, FuzzyDeduplicator};
//! use std::path::Path;
//!
//! let config = DedupConfig::new(128, 16, 5, 0.8, 42);
//! let dedup = FuzzyDeduplicator::new(config)?;
//! let report = dedup.run(&["a.txt", "b.txt"], Path::new("out"))?;
//! println!("removed {} duplicates", report.stats.duplicate_count);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Modules
//!
//! - [`normalize`] / [`shingle`] - text normalization and word n-grams
//! - [`minhash`] - MinHash signatures
//! - [`lsh`] - LSH banding and candidate pairs
//! - [`jaccard`] - exact similarity and pair confirmation
//! - [`cluster`] - union-find duplicate clusters
//! - [`exact`] / [`fuzzy`] - the two corpus rewriters

pub mod cluster;
pub mod config;
pub mod corpus;
pub mod exact;
pub mod fuzzy;
pub mod io;
pub mod jaccard;
pub mod lsh;
pub mod minhash;
pub mod normalize;
pub mod shingle;

pub use cluster::{build_clusters, DuplicateCluster, UnionFind};
pub use config::DedupConfig;
pub use corpus::{Corpus, DocId, Document};
pub use exact::{ExactDeduplicator, ExactReport, ExactStats, LineCounts};
pub use fuzzy::{FuzzyAnalysis, FuzzyDeduplicator, FuzzyReport, SurvivorPolicy};
pub use io::{FileFailure, IoError};
pub use jaccard::{confirm_pairs, Edge};
pub use lsh::{bucket, BucketKey, LshIndex};
pub use minhash::{MinHashSignature, MinHasher};
pub use normalize::normalize;
pub use shingle::{shingles, ShingleSet};

use serde::Serialize;
use thiserror::Error;

/// Errors from a full dedup run.
#[derive(Error, Debug)]
pub enum DedupError {
    /// Invalid configuration or other shared failure.
    #[error(transparent)]
    Core(#[from] sift_core::SiftError),

    /// Output directory could not be prepared.
    #[error(transparent)]
    Io(#[from] IoError),
}

/// Statistics from fuzzy deduplication.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DedupStats {
    /// Documents that loaded successfully.
    pub total_documents: usize,
    /// Documents kept (survivors plus unclustered).
    pub unique_documents: usize,
    /// Documents removed.
    pub duplicate_count: usize,
    /// `duplicate_count / total_documents`.
    pub duplicate_ratio: f64,
    /// Number of duplicate clusters.
    pub cluster_count: usize,
    /// Distinct LSH candidate pairs.
    pub candidate_pairs: usize,
    /// Candidate pairs confirmed by Jaccard similarity.
    pub verified_pairs: usize,
    /// Wall-clock time for the run.
    pub processing_time_secs: f64,
}

impl DedupStats {
    /// Derive counts from an analysis of `total_documents` documents.
    #[must_use]
    pub fn from_analysis(total_documents: usize, analysis: &FuzzyAnalysis) -> Self {
        let duplicate_count: usize = analysis.clusters.iter().map(|c| c.len() - 1).sum();
        let duplicate_ratio = if total_documents == 0 {
            0.0
        } else {
            duplicate_count as f64 / total_documents as f64
        };

        Self {
            total_documents,
            unique_documents: total_documents - duplicate_count,
            duplicate_count,
            duplicate_ratio,
            cluster_count: analysis.clusters.len(),
            candidate_pairs: analysis.candidate_pairs,
            verified_pairs: analysis.edges.len(),
            processing_time_secs: 0.0,
        }
    }
}

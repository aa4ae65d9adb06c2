//! Near-duplicate document removal with MinHash, LSH and Jaccard confirmation.
//!
//! A run is two passes over an in-memory [`Corpus`]:
//! 1. fingerprint every document, bucket signatures by band, confirm
//!    candidate pairs by exact Jaccard similarity and cluster the edges;
//! 2. write one survivor per cluster plus every unclustered document.

use crate::cluster::{build_clusters, DuplicateCluster};
use crate::config::DedupConfig;
use crate::corpus::{Corpus, DocId};
use crate::io::{self, ensure_output_dir, write_document, FileFailure, OutputNames};
use crate::jaccard::{confirm_pairs, Edge};
use crate::lsh::LshIndex;
use crate::minhash::MinHasher;
use crate::{DedupError, DedupStats};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use sift_core::Result;
use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// How the surviving member of a cluster is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurvivorPolicy {
    /// Keep the member that came first in the input.
    #[default]
    Lowest,
    /// Keep a uniformly random member, reproducible for a given seed.
    Random { seed: u64 },
}

impl SurvivorPolicy {
    /// Pick exactly one survivor for each cluster, in cluster order.
    #[must_use]
    pub fn select(&self, clusters: &[DuplicateCluster]) -> Vec<DocId> {
        match *self {
            Self::Lowest => clusters.iter().map(|c| c.members[0]).collect(),
            Self::Random { seed } => {
                let mut rng = StdRng::seed_from_u64(seed);
                clusters
                    .iter()
                    .map(|c| c.members[rng.gen_range(0..c.members.len())])
                    .collect()
            }
        }
    }
}

/// Result of the analysis pass.
#[derive(Debug, Clone, Serialize)]
pub struct FuzzyAnalysis {
    /// Confirmed duplicate edges, sorted by `(a, b)`.
    pub edges: Vec<Edge>,
    /// Disjoint duplicate clusters.
    pub clusters: Vec<DuplicateCluster>,
    /// Distinct candidate pairs produced by LSH.
    pub candidate_pairs: usize,
    /// LSH buckets holding two or more documents.
    pub collision_buckets: usize,
}

/// Outcome of a rewrite.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FuzzyReport {
    pub stats: DedupStats,
    /// Inputs skipped because they could not be read or decoded.
    pub input_failures: Vec<FileFailure>,
    /// Outputs that could not be written.
    pub output_failures: Vec<FileFailure>,
}

/// MinHash/LSH deduplicator.
#[derive(Debug, Clone)]
pub struct FuzzyDeduplicator {
    config: DedupConfig,
    hasher: MinHasher,
    survivor: SurvivorPolicy,
}

impl FuzzyDeduplicator {
    /// Create a deduplicator, rejecting invalid configurations up front.
    pub fn new(config: DedupConfig) -> Result<Self> {
        config.validate()?;
        let hasher = MinHasher::new(config.num_hashes, config.seed);
        Ok(Self {
            config,
            hasher,
            survivor: SurvivorPolicy::default(),
        })
    }

    /// Set the survivor policy.
    #[must_use]
    pub fn with_survivor(mut self, survivor: SurvivorPolicy) -> Self {
        self.survivor = survivor;
        self
    }

    /// The validated configuration.
    #[must_use]
    pub fn config(&self) -> &DedupConfig {
        &self.config
    }

    /// Read and fingerprint documents; unreadable inputs are reported.
    pub fn load<P: AsRef<Path> + Sync>(&self, paths: &[P]) -> (Corpus, Vec<FileFailure>) {
        Corpus::load(paths, self.config.ngram_size, &self.hasher)
    }

    /// Find duplicate clusters in a loaded corpus.
    pub fn analyze(&self, corpus: &Corpus) -> Result<FuzzyAnalysis> {
        let mut index = LshIndex::new(self.config.num_hashes, self.config.num_bands)?;
        for (id, signature) in corpus.signatures() {
            index.insert(id, signature);
        }

        let candidates: Vec<(DocId, DocId)> = index.candidate_pairs().collect();
        let collision_buckets = index.num_collision_buckets();
        debug!(
            "LSH produced {} candidate pairs from {} shared buckets",
            candidates.len(),
            collision_buckets
        );

        let candidate_pairs = candidates.len();
        let edges = confirm_pairs(candidates, corpus, self.config.jaccard_threshold);
        let clusters = build_clusters(&edges, corpus.len());
        debug!(
            "Confirmed {} edges forming {} clusters",
            edges.len(),
            clusters.len()
        );

        Ok(FuzzyAnalysis {
            edges,
            clusters,
            candidate_pairs,
            collision_buckets,
        })
    }

    /// Documents to drop: every cluster member except its survivor.
    #[must_use]
    pub fn removals(&self, clusters: &[DuplicateCluster]) -> HashSet<DocId> {
        let survivors = self.survivor.select(clusters);
        clusters
            .iter()
            .zip(survivors)
            .flat_map(|(cluster, keep)| cluster.members.iter().copied().filter(move |&m| m != keep))
            .collect()
    }

    /// Write survivors and unclustered documents verbatim into `output_dir`.
    ///
    /// Returns the per-file write failures; only a failure to create the
    /// directory aborts.
    pub fn rewrite(
        &self,
        corpus: &Corpus,
        clusters: &[DuplicateCluster],
        output_dir: &Path,
    ) -> io::Result<(usize, Vec<FileFailure>)> {
        ensure_output_dir(output_dir)?;
        let removed = self.removals(clusters);

        let mut names = OutputNames::new(output_dir);
        let mut failures = Vec::new();
        let mut written = 0;
        for doc in corpus.iter().filter(|d| !removed.contains(&d.id)) {
            let result = names
                .claim(&doc.path)
                .and_then(|out| write_document(out, doc.raw.as_bytes()));
            match result {
                Ok(()) => written += 1,
                Err(e) => {
                    warn!("Failed to write output for {}: {}", doc.path.display(), e);
                    failures.push(FileFailure::new(&doc.path, &e));
                }
            }
        }

        Ok((written, failures))
    }

    /// Full run: validate, load, analyze and rewrite.
    pub fn run<P: AsRef<Path> + Sync>(
        &self,
        paths: &[P],
        output_dir: &Path,
    ) -> std::result::Result<FuzzyReport, DedupError> {
        let start = Instant::now();

        info!("Fingerprinting {} documents", paths.len());
        let (corpus, input_failures) = self.load(paths);

        let analysis = self.analyze(&corpus)?;
        let mut stats = DedupStats::from_analysis(corpus.len(), &analysis);

        info!(
            "Writing {} of {} documents",
            stats.unique_documents, stats.total_documents
        );
        let (_, output_failures) = self.rewrite(&corpus, &analysis.clusters, output_dir)?;

        stats.processing_time_secs = start.elapsed().as_secs_f64();
        info!(
            "Removed {} duplicate documents in {} clusters",
            stats.duplicate_count, stats.cluster_count
        );

        Ok(FuzzyReport {
            stats,
            input_failures,
            output_failures,
        })
    }
}

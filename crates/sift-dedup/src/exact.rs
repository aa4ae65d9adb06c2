//! Exact line deduplication across a corpus.
//!
//! Pass 1 counts a digest of every raw line (terminator included) over all
//! files. Pass 2 rewrites each file keeping only lines whose digest occurs
//! exactly once corpus-wide, in their original order. A line repeated
//! anywhere, even inside one file, is dropped everywhere.

use crate::io::{self, ensure_output_dir, write_document, FileFailure, OutputNames};
use rayon::prelude::*;
use serde::Serialize;
use sift_core::hashing::{Blake3Hasher, HashFunction};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Corpus-wide line digest frequencies.
///
/// Lines are keyed by their raw bytes, terminator included. Line endings are
/// not translated, so `"x\r\n"` and `"x\n"` are distinct lines; convert CRLF
/// corpora to LF first if they should match.
#[derive(Debug, Default)]
pub struct LineCounts {
    counts: HashMap<Vec<u8>, u32>,
    total: usize,
}

impl LineCounts {
    fn add(&mut self, digest: Vec<u8>) {
        let count = self.counts.entry(digest).or_insert(0);
        *count = count.saturating_add(1);
        self.total += 1;
    }

    /// Occurrences of `digest` (saturating).
    #[must_use]
    pub fn count(&self, digest: &[u8]) -> u32 {
        self.counts.get(digest).copied().unwrap_or(0)
    }

    /// Whether `digest` occurs exactly once.
    #[must_use]
    pub fn is_unique(&self, digest: &[u8]) -> bool {
        self.count(digest) == 1
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// Total lines counted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }
}

/// Statistics from an exact dedup run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExactStats {
    pub files_read: usize,
    pub files_written: usize,
    pub lines_total: usize,
    pub lines_kept: usize,
    pub lines_dropped: usize,
    pub distinct_lines: usize,
    pub processing_time_secs: f64,
}

/// Outcome of [`ExactDeduplicator::rewrite`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExactReport {
    pub stats: ExactStats,
    /// Inputs skipped because they could not be read or decoded.
    pub input_failures: Vec<FileFailure>,
    /// Outputs that could not be written.
    pub output_failures: Vec<FileFailure>,
}

/// Line-level deduplicator, generic over the line digest.
#[derive(Debug, Clone, Default)]
pub struct ExactDeduplicator<H: HashFunction = Blake3Hasher> {
    hasher: H,
}

impl ExactDeduplicator<Blake3Hasher> {
    /// Deduplicator using blake3 line digests.
    #[must_use]
    pub fn new() -> Self {
        Self::with_hasher(Blake3Hasher::new())
    }
}

impl<H: HashFunction> ExactDeduplicator<H> {
    /// Deduplicator using a custom digest.
    #[must_use]
    pub fn with_hasher(hasher: H) -> Self {
        Self { hasher }
    }

    /// Digest of every line of `text`, terminators included.
    ///
    /// Only `\n` ends a line; a `\r` before it stays part of the line.
    fn line_digests(&self, text: &str) -> Vec<Vec<u8>> {
        text.split_inclusive('\n')
            .map(|line| self.hasher.hash(line.as_bytes()))
            .collect()
    }

    /// Pass 1: count line digests over all readable inputs.
    ///
    /// Returns the counts and the inputs that were skipped.
    pub fn count_lines<P: AsRef<Path> + Sync>(
        &self,
        paths: &[P],
    ) -> (LineCounts, Vec<FileFailure>) {
        let per_file: Vec<_> = paths
            .par_iter()
            .map(|path| io::read_document(path).map(|text| self.line_digests(&text)))
            .collect();

        let mut counts = LineCounts::default();
        let mut failures = Vec::new();
        for (path, result) in paths.iter().zip(per_file) {
            match result {
                Ok(digests) => digests.into_iter().for_each(|d| counts.add(d)),
                Err(e) => {
                    warn!("Skipping {}: {}", path.as_ref().display(), e);
                    failures.push(FileFailure::new(path.as_ref(), &e));
                }
            }
        }

        (counts, failures)
    }

    /// Keep only the corpus-unique lines of `text`.
    #[must_use]
    pub fn filter_text(&self, text: &str, counts: &LineCounts) -> (String, usize) {
        let mut kept = String::with_capacity(text.len());
        let mut dropped = 0;
        for line in text.split_inclusive('\n') {
            if counts.is_unique(&self.hasher.hash(line.as_bytes())) {
                kept.push_str(line);
            } else {
                dropped += 1;
            }
        }
        (kept, dropped)
    }

    /// Rewrite every input into `output_dir` with duplicated lines removed.
    ///
    /// Each readable input produces one output file with the same base name.
    /// Per-file read and write failures are reported and skipped; only a
    /// failure to create `output_dir` aborts the run.
    pub fn rewrite<P: AsRef<Path> + Sync>(
        &self,
        paths: &[P],
        output_dir: &Path,
    ) -> io::Result<ExactReport> {
        let start = Instant::now();
        ensure_output_dir(output_dir)?;

        info!("Counting lines across {} files", paths.len());
        let (counts, mut input_failures) = self.count_lines(paths);
        debug!(
            "Counted {} lines ({} distinct)",
            counts.total(),
            counts.distinct()
        );

        let skipped: HashSet<&Path> = input_failures.iter().map(|f| f.path.as_path()).collect();
        let mut names = OutputNames::new(output_dir);
        let mut output_failures = Vec::new();
        let mut jobs: Vec<(&Path, PathBuf)> = Vec::new();
        for path in paths.iter().map(AsRef::as_ref) {
            if skipped.contains(path) {
                continue;
            }
            match names.claim(path) {
                Ok(out) => jobs.push((path, out)),
                Err(e) => {
                    warn!("Not writing {}: {}", path.display(), e);
                    output_failures.push(FileFailure::new(path, &e));
                }
            }
        }

        let files_read = paths.len() - input_failures.len();
        let results: Vec<_> = jobs
            .par_iter()
            .map(|(input, out)| self.rewrite_one(input, out, &counts))
            .collect();

        let mut stats = ExactStats {
            files_read,
            lines_total: counts.total(),
            distinct_lines: counts.distinct(),
            ..ExactStats::default()
        };
        for ((input, _), result) in jobs.iter().zip(results) {
            match result {
                Ok((kept, dropped)) => {
                    stats.files_written += 1;
                    stats.lines_kept += kept;
                    stats.lines_dropped += dropped;
                }
                Err(RewriteFailure::Input(e)) => {
                    warn!("Skipping {}: {}", input.display(), e);
                    input_failures.push(FileFailure::new(*input, &e));
                }
                Err(RewriteFailure::Output(e)) => {
                    warn!("Failed to write output for {}: {}", input.display(), e);
                    output_failures.push(FileFailure::new(*input, &e));
                }
            }
        }
        stats.processing_time_secs = start.elapsed().as_secs_f64();

        info!(
            "Exact dedup kept {} of {} lines across {} files",
            stats.lines_kept, stats.lines_total, stats.files_written
        );

        Ok(ExactReport {
            stats,
            input_failures,
            output_failures,
        })
    }

    fn rewrite_one(
        &self,
        input: &Path,
        out: &Path,
        counts: &LineCounts,
    ) -> std::result::Result<(usize, usize), RewriteFailure> {
        let text = io::read_document(input).map_err(RewriteFailure::Input)?;
        let (kept, dropped) = self.filter_text(&text, counts);
        let kept_lines = kept.split_inclusive('\n').count();
        write_document(out, kept.as_bytes()).map_err(RewriteFailure::Output)?;
        Ok((kept_lines, dropped))
    }
}

enum RewriteFailure {
    Input(io::IoError),
    Output(io::IoError),
}

//! In-memory document arena for one dedup run.
//!
//! Documents are addressed by [`DocId`], an index assigned in input order to
//! every document that loaded successfully. Paths are attributes only.

use crate::io::{read_document, FileFailure};
use crate::minhash::{MinHashSignature, MinHasher};
use crate::normalize::normalize;
use crate::shingle::{shingles, ShingleSet};
use rayon::prelude::*;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Opaque document handle (index into a [`Corpus`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct DocId(usize);

impl DocId {
    /// Create an id from an arena index.
    #[must_use]
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Arena index of this document.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A loaded document and its derived fuzzy-matching artifacts.
#[derive(Debug, Clone)]
pub struct Document {
    /// Arena id.
    pub id: DocId,
    /// Source path.
    pub path: PathBuf,
    /// Original text, written back verbatim.
    pub raw: String,
    /// Normalized text used for shingling.
    pub normalized: String,
    /// Word n-gram set.
    pub shingles: ShingleSet,
    /// MinHash signature of `shingles`.
    pub signature: MinHashSignature,
}

/// All documents of one run.
#[derive(Debug, Default)]
pub struct Corpus {
    documents: Vec<Document>,
}

impl Corpus {
    /// Load and fingerprint every readable document.
    ///
    /// Unreadable or non-UTF-8 files are reported once each and left out;
    /// the rest of the corpus still loads.
    pub fn load<P: AsRef<Path> + Sync>(
        paths: &[P],
        ngram_size: usize,
        hasher: &MinHasher,
    ) -> (Self, Vec<FileFailure>) {
        let loaded: Vec<_> = paths
            .par_iter()
            .map(|path| {
                let path = path.as_ref();
                read_document(path).map(|raw| (path.to_path_buf(), raw))
            })
            .collect();

        let mut texts = Vec::with_capacity(loaded.len());
        let mut failures = Vec::new();
        for (path, result) in paths.iter().zip(loaded) {
            match result {
                Ok(pair) => texts.push(pair),
                Err(e) => {
                    warn!("Skipping {}: {}", path.as_ref().display(), e);
                    failures.push(FileFailure::new(path.as_ref(), &e));
                }
            }
        }

        let corpus = Self::from_texts(texts, ngram_size, hasher);
        debug!(
            "Loaded {} documents ({} skipped)",
            corpus.len(),
            failures.len()
        );
        (corpus, failures)
    }

    /// Build a corpus from already-read `(path, text)` pairs.
    ///
    /// # Panics
    ///
    /// Panics if `ngram_size == 0`.
    #[must_use]
    pub fn from_texts(
        texts: Vec<(PathBuf, String)>,
        ngram_size: usize,
        hasher: &MinHasher,
    ) -> Self {
        let documents = texts
            .into_par_iter()
            .enumerate()
            .map(|(index, (path, raw))| {
                let normalized = normalize(&raw);
                let shingles = shingles(&normalized, ngram_size);
                let signature = hasher.signature(&shingles);
                Document {
                    id: DocId::new(index),
                    path,
                    raw,
                    normalized,
                    shingles,
                    signature,
                }
            })
            .collect();

        Self { documents }
    }

    /// Number of documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the corpus is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Look up a document.
    #[must_use]
    pub fn get(&self, id: DocId) -> Option<&Document> {
        self.documents.get(id.index())
    }

    /// Documents in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Document> + '_ {
        self.documents.iter()
    }

    /// All ids in order.
    pub fn ids(&self) -> impl Iterator<Item = DocId> + '_ {
        self.documents.iter().map(|d| d.id)
    }

    /// `(id, signature)` pairs for bucketing.
    pub fn signatures(&self) -> impl Iterator<Item = (DocId, &MinHashSignature)> + '_ {
        self.documents.iter().map(|d| (d.id, &d.signature))
    }
}

impl std::ops::Index<DocId> for Corpus {
    type Output = Document;

    fn index(&self, id: DocId) -> &Document {
        &self.documents[id.index()]
    }
}

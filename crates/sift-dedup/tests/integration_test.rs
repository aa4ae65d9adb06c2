//! Integration tests for sift-dedup.
//!
//! Tests end-to-end workflows with real file I/O.

use sift_dedup::{
    bucket, build_clusters, confirm_pairs, normalize, shingles, Corpus, DedupConfig, DocId,
    ExactDeduplicator, FuzzyDeduplicator, LshIndex, MinHasher, SurvivorPolicy,
};
use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_files(dir: &Path, files: &[(&str, &str)]) -> Vec<PathBuf> {
    files
        .iter()
        .map(|(name, contents)| {
            let path = dir.join(name);
            fs::write(&path, contents).unwrap();
            path
        })
        .collect()
}

fn output_names(dir: &Path) -> BTreeSet<String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect()
}

/// A ~60 word paragraph that is unique per `topic`.
fn paragraph(topic: &str, variant: usize) -> String {
    let mut words: Vec<String> = (0..60).map(|i| format!("{topic}{i}")).collect();
    // Small edits keep variants well above a 0.7 Jaccard threshold.
    if variant > 0 {
        words[59] = format!("edit{variant}");
    }
    words.join(" ")
}

// ============================================================================
// Exact line deduplication
// ============================================================================

#[test]
fn test_exact_dedup_example() {
    let temp = TempDir::new().unwrap();
    let inputs = write_files(temp.path(), &[("A.txt", "x\ny\nx\n"), ("B.txt", "y\nz\n")]);
    let out = temp.path().join("out");

    let report = ExactDeduplicator::new().rewrite(&inputs, &out).unwrap();

    assert_eq!(fs::read_to_string(out.join("A.txt")).unwrap(), "");
    assert_eq!(fs::read_to_string(out.join("B.txt")).unwrap(), "z\n");
    assert_eq!(report.stats.files_written, 2);
    assert_eq!(report.stats.lines_total, 5);
    assert_eq!(report.stats.lines_kept, 1);
    assert_eq!(report.stats.lines_dropped, 4);
    assert!(report.input_failures.is_empty());
    assert!(report.output_failures.is_empty());
}

#[test]
fn test_exact_dedup_preserves_order() {
    let temp = TempDir::new().unwrap();
    let inputs = write_files(
        temp.path(),
        &[
            ("one.txt", "header\nalpha\nbeta\ngamma\n"),
            ("two.txt", "header\ndelta\nepsilon\n"),
        ],
    );
    let out = temp.path().join("out");

    ExactDeduplicator::new().rewrite(&inputs, &out).unwrap();

    assert_eq!(
        fs::read_to_string(out.join("one.txt")).unwrap(),
        "alpha\nbeta\ngamma\n"
    );
    assert_eq!(
        fs::read_to_string(out.join("two.txt")).unwrap(),
        "delta\nepsilon\n"
    );
}

#[test]
fn test_exact_dedup_idempotent() {
    let temp = TempDir::new().unwrap();
    let inputs = write_files(
        temp.path(),
        &[
            ("a.txt", "same\nonly a\nsame\nshared\nlast line no newline"),
            ("b.txt", "shared\nonly b\n\n\n"),
            ("c.txt", "only c\nlast line no newline\n"),
        ],
    );
    let first = temp.path().join("first");
    let second = temp.path().join("second");

    ExactDeduplicator::new().rewrite(&inputs, &first).unwrap();
    let first_outputs: Vec<PathBuf> = ["a.txt", "b.txt", "c.txt"]
        .iter()
        .map(|n| first.join(n))
        .collect();
    let report = ExactDeduplicator::new()
        .rewrite(&first_outputs, &second)
        .unwrap();

    assert_eq!(report.stats.lines_dropped, 0);
    for name in ["a.txt", "b.txt", "c.txt"] {
        assert_eq!(
            fs::read_to_string(first.join(name)).unwrap(),
            fs::read_to_string(second.join(name)).unwrap(),
        );
    }
    assert_eq!(
        fs::read_to_string(first.join("a.txt")).unwrap(),
        "only a\nlast line no newline"
    );
}

#[test]
fn test_exact_dedup_skips_unreadable_input() {
    let temp = TempDir::new().unwrap();
    let mut inputs = write_files(temp.path(), &[("good.txt", "keep\ndup\ndup\n")]);
    let bad = temp.path().join("bad.txt");
    fs::write(&bad, [b'k', b'e', b'e', b'p', b'\n', 0xff, b'\n']).unwrap();
    inputs.push(bad.clone());
    inputs.push(temp.path().join("missing.txt"));
    let out = temp.path().join("out");

    let report = ExactDeduplicator::new().rewrite(&inputs, &out).unwrap();

    // Lines of skipped files do not count toward duplication.
    assert_eq!(fs::read_to_string(out.join("good.txt")).unwrap(), "keep\n");
    assert_eq!(output_names(&out), BTreeSet::from(["good.txt".to_string()]));
    assert_eq!(report.input_failures.len(), 2);
    assert_eq!(report.input_failures[0].path, bad);
    assert_eq!(report.stats.files_read, 1);
}

#[test]
fn test_exact_dedup_name_collision_reported() {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join("x")).unwrap();
    fs::create_dir(temp.path().join("y")).unwrap();
    let first = temp.path().join("x").join("doc.txt");
    let second = temp.path().join("y").join("doc.txt");
    fs::write(&first, "from x\n").unwrap();
    fs::write(&second, "from y\n").unwrap();
    let out = temp.path().join("out");

    let report = ExactDeduplicator::new()
        .rewrite(&[&first, &second], &out)
        .unwrap();

    assert_eq!(fs::read_to_string(out.join("doc.txt")).unwrap(), "from x\n");
    assert_eq!(report.output_failures.len(), 1);
    assert_eq!(report.output_failures[0].path, second);
}

// ============================================================================
// Fuzzy document deduplication
// ============================================================================

fn fuzzy(threshold: f64) -> FuzzyDeduplicator {
    FuzzyDeduplicator::new(DedupConfig::new(128, 32, 3, threshold, 42)).unwrap()
}

#[test]
fn test_fuzzy_removes_near_duplicates() {
    let temp = TempDir::new().unwrap();
    let p0 = paragraph("apple", 0);
    let p1 = paragraph("apple", 1);
    let p2 = paragraph("apple", 2);
    let unique = paragraph("zebra", 0);
    let inputs = write_files(
        temp.path(),
        &[
            ("a.txt", p0.as_str()),
            ("b.txt", p1.as_str()),
            ("c.txt", p2.as_str()),
            ("u.txt", unique.as_str()),
        ],
    );
    let out = temp.path().join("out");

    let report = fuzzy(0.8).run(&inputs, &out).unwrap();

    assert_eq!(report.stats.total_documents, 4);
    assert_eq!(report.stats.cluster_count, 1);
    assert_eq!(report.stats.duplicate_count, 2);
    assert_eq!(
        output_names(&out),
        BTreeSet::from(["a.txt".to_string(), "u.txt".to_string()])
    );
    assert_eq!(fs::read_to_string(out.join("a.txt")).unwrap(), p0);
}

#[test]
fn test_fuzzy_output_is_verbatim() {
    let temp = TempDir::new().unwrap();
    let original = "  Héllo, WORLD!!\r\nThis   is *raw* text.\n";
    let inputs = write_files(temp.path(), &[("raw.txt", original)]);
    let out = temp.path().join("out");

    fuzzy(0.8).run(&inputs, &out).unwrap();

    assert_eq!(fs::read_to_string(out.join("raw.txt")).unwrap(), original);
}

#[test]
fn test_survivor_invariant_with_random_policy() {
    let temp = TempDir::new().unwrap();
    let mut files = Vec::new();
    for topic in ["red", "green", "blue"] {
        for variant in 0..4 {
            files.push((format!("{topic}{variant}.txt"), paragraph(topic, variant)));
        }
    }
    files.push(("lonely.txt".to_string(), paragraph("lonely", 0)));
    let refs: Vec<(&str, &str)> = files.iter().map(|(n, c)| (n.as_str(), c.as_str())).collect();
    let inputs = write_files(temp.path(), &refs);
    let out = temp.path().join("out");

    let dedup = fuzzy(0.8).with_survivor(SurvivorPolicy::Random { seed: 5 });
    let (corpus, failures) = dedup.load(&inputs);
    assert!(failures.is_empty());
    let analysis = dedup.analyze(&corpus).unwrap();
    assert_eq!(analysis.clusters.len(), 3);

    let (written, write_failures) = dedup.rewrite(&corpus, &analysis.clusters, &out).unwrap();
    assert!(write_failures.is_empty());
    assert_eq!(written, 4);

    let present = output_names(&out);
    for cluster in &analysis.clusters {
        assert_eq!(cluster.len(), 4);
        let kept = cluster
            .members
            .iter()
            .filter(|id| {
                let name = corpus[**id].path.file_name().unwrap().to_string_lossy();
                present.contains(&*name)
            })
            .count();
        assert_eq!(kept, 1, "exactly one survivor per cluster");
    }
    assert!(present.contains("lonely.txt"));
}

#[test]
fn test_unclustered_documents_pass_through() {
    let temp = TempDir::new().unwrap();
    let files: Vec<(String, String)> = (0..20)
        .map(|i| (format!("doc{i}.txt"), paragraph(&format!("topic{i}x"), 0)))
        .collect();
    let refs: Vec<(&str, &str)> = files.iter().map(|(n, c)| (n.as_str(), c.as_str())).collect();
    let inputs = write_files(temp.path(), &refs);
    let out = temp.path().join("out");

    let report = fuzzy(0.5).run(&inputs, &out).unwrap();

    assert_eq!(report.stats.duplicate_count, 0);
    assert_eq!(output_names(&out).len(), 20);
    for (name, contents) in &files {
        assert_eq!(&fs::read_to_string(out.join(name)).unwrap(), contents);
    }
}

#[test]
fn test_clustering_is_transitive() {
    // A ~ B and B ~ C at 0.5, but A and C share only 1/3 of their shingles.
    let a: Vec<String> = (0..30).map(|i| format!("w{i}")).collect();
    let b: Vec<String> = (10..40).map(|i| format!("w{i}")).collect();
    let c: Vec<String> = (20..50).map(|i| format!("w{i}")).collect();
    let texts = vec![
        (PathBuf::from("a.txt"), a.join(" ")),
        (PathBuf::from("b.txt"), b.join(" ")),
        (PathBuf::from("c.txt"), c.join(" ")),
    ];
    // Bands of one row make every pair with any shared slot a candidate.
    let config = DedupConfig::new(64, 64, 1, 0.45, 7);
    let dedup = FuzzyDeduplicator::new(config.clone()).unwrap();
    let corpus = Corpus::from_texts(texts, config.ngram_size, &MinHasher::new(64, 7));

    let analysis = dedup.analyze(&corpus).unwrap();

    let edge_pairs: HashSet<(usize, usize)> = analysis
        .edges
        .iter()
        .map(|e| (e.a.index(), e.b.index()))
        .collect();
    assert!(edge_pairs.contains(&(0, 1)));
    assert!(edge_pairs.contains(&(1, 2)));
    assert!(!edge_pairs.contains(&(0, 2)), "A and C are below threshold");

    assert_eq!(analysis.clusters.len(), 1);
    assert_eq!(
        analysis.clusters[0].members,
        vec![DocId::new(0), DocId::new(1), DocId::new(2)]
    );
}

#[test]
fn test_clustering_links_pairs_never_compared() {
    // A and C share no shingle, so they share no bucket and are never compared.
    let words = |range: std::ops::Range<usize>| {
        range.map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
    };
    let texts = vec![
        (PathBuf::from("a.txt"), words(0..20)),
        (PathBuf::from("b.txt"), words(10..30)),
        (PathBuf::from("c.txt"), words(20..40)),
    ];
    let hasher = MinHasher::new(64, 3);
    let corpus = Corpus::from_texts(texts, 1, &hasher);

    let mut index = LshIndex::new(64, 64).unwrap();
    for (id, signature) in corpus.signatures() {
        index.insert(id, signature);
    }
    let candidates: Vec<(DocId, DocId)> = index.candidate_pairs().collect();
    let (a, b, c) = (DocId::new(0), DocId::new(1), DocId::new(2));
    assert!(candidates.contains(&(a, b)));
    assert!(candidates.contains(&(b, c)));
    assert!(!candidates.contains(&(a, c)), "A and C must not be candidates");

    let edges = confirm_pairs(candidates, &corpus, 0.3);
    assert_eq!(edges.len(), 2);

    let clusters = build_clusters(&edges, corpus.len());
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].members, vec![a, b, c]);
}

#[test]
fn test_fuzzy_partition_is_deterministic() {
    let texts: Vec<(PathBuf, String)> = (0..30)
        .map(|i| {
            let topic = format!("t{}", i % 6);
            (PathBuf::from(format!("{i}.txt")), paragraph(&topic, i / 6))
        })
        .collect();
    let config = DedupConfig::new(128, 16, 3, 0.7, 11);
    let dedup = FuzzyDeduplicator::new(config.clone()).unwrap();
    let hasher = MinHasher::new(config.num_hashes, config.seed);

    let first = dedup
        .analyze(&Corpus::from_texts(texts.clone(), 3, &hasher))
        .unwrap();
    let second = dedup
        .analyze(&Corpus::from_texts(texts, 3, &hasher))
        .unwrap();

    assert_eq!(first.clusters, second.clusters);
    assert_eq!(first.clusters.len(), 6);
}

#[test]
fn test_empty_documents_cluster_together() {
    let temp = TempDir::new().unwrap();
    let body = paragraph("body", 0);
    let inputs = write_files(
        temp.path(),
        &[("e1.txt", ""), ("e2.txt", "!!!"), ("full.txt", body.as_str())],
    );
    let out = temp.path().join("out");

    let report = fuzzy(0.9).run(&inputs, &out).unwrap();

    // Both normalize to nothing: identical empty shingle sets.
    assert_eq!(report.stats.cluster_count, 1);
    assert_eq!(
        output_names(&out),
        BTreeSet::from(["e1.txt".to_string(), "full.txt".to_string()])
    );
}

#[test]
fn test_fuzzy_skips_unreadable_documents() {
    let temp = TempDir::new().unwrap();
    let body = paragraph("ok", 0);
    let mut inputs = write_files(temp.path(), &[("ok.txt", body.as_str())]);
    let bad = temp.path().join("bad.txt");
    fs::write(&bad, [0xfe, 0xff, 0x00]).unwrap();
    inputs.push(bad.clone());
    let out = temp.path().join("out");

    let report = fuzzy(0.8).run(&inputs, &out).unwrap();

    assert_eq!(report.stats.total_documents, 1);
    assert_eq!(report.input_failures.len(), 1);
    assert_eq!(report.input_failures[0].path, bad);
    assert_eq!(output_names(&out), BTreeSet::from(["ok.txt".to_string()]));
}

#[test]
fn test_invalid_config_fails_before_io() {
    let temp = TempDir::new().unwrap();
    let out = temp.path().join("never");

    let err = FuzzyDeduplicator::new(DedupConfig::new(100, 7, 5, 0.8, 0)).unwrap_err();
    assert!(err.is_config());
    assert!(FuzzyDeduplicator::new(DedupConfig::new(128, 16, 0, 0.8, 0)).is_err());
    assert!(FuzzyDeduplicator::new(DedupConfig::new(128, 16, 5, 1.5, 0)).is_err());
    assert!(!out.exists());
}

#[test]
fn test_bucket_membership_per_band() {
    let hasher = MinHasher::new(60, 3);
    let sigs: Vec<_> = ["one two three four", "five six seven eight", "one two three four"]
        .iter()
        .map(|t| hasher.signature(&shingles(&normalize(t), 2)))
        .collect();

    let buckets = bucket(
        sigs.iter().enumerate().map(|(i, s)| (DocId::new(i), s)),
        10,
    )
    .unwrap();

    for doc in 0..3 {
        let memberships = buckets
            .values()
            .filter(|docs| docs.contains(&DocId::new(doc)))
            .count();
        assert_eq!(memberships, 10, "document {doc} must sit in one bucket per band");
    }
    assert!(bucket(sigs.iter().map(|s| (DocId::new(0), s)), 7).is_err());
}

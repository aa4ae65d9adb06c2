use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sift_dedup::{
    normalize, shingles, Corpus, DedupConfig, DocId, ExactDeduplicator, FuzzyDeduplicator,
    LshIndex, MinHasher,
};
use std::fs;
use std::path::PathBuf;

fn generate_documents(count: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            format!(
                "Document number {} contains information about topic {} with various keywords and text content for testing deduplication algorithms effectively",
                i,
                i % 10
            )
        })
        .collect()
}

fn generate_corpus(count: usize, dup_ratio: f64) -> Vec<(PathBuf, String)> {
    let unique_count = (((1.0 - dup_ratio) * count as f64) as usize).max(1);
    let mut docs = generate_documents(unique_count);

    // Near duplicates: same text with a trailing edit
    for i in 0..count - unique_count {
        let edited = format!("{} (revised)", docs[i % unique_count]);
        docs.push(edited);
    }

    docs.into_iter()
        .enumerate()
        .map(|(i, text)| (PathBuf::from(format!("doc{i}.txt")), text))
        .collect()
}

fn bench_fingerprint(c: &mut Criterion) {
    let mut group = c.benchmark_group("fingerprint");

    let text = "The quick brown fox jumps over the lazy dog and this is some additional text to make it longer for realistic benchmarking purposes";

    group.bench_function("normalize", |b| b.iter(|| normalize(black_box(text))));

    let normalized = normalize(text);
    group.bench_function("shingles_5", |b| {
        b.iter(|| shingles(black_box(&normalized), 5))
    });

    let set = shingles(&normalized, 5);
    for num_hashes in [128, 256] {
        let hasher = MinHasher::new(num_hashes, 42);
        group.bench_with_input(
            BenchmarkId::new("signature", num_hashes),
            &set,
            |b, set| b.iter(|| hasher.signature(black_box(set))),
        );
    }

    let hasher = MinHasher::new(128, 42);
    let sig1 = hasher.signature(&set);
    let sig2 = hasher.signature(&shingles(
        &normalize("Different text with some overlap jumps over the lazy dog"),
        5,
    ));
    group.bench_function("similarity", |b| {
        b.iter(|| MinHasher::similarity(black_box(&sig1), black_box(&sig2)))
    });

    group.finish();
}

fn bench_lsh(c: &mut Criterion) {
    let mut group = c.benchmark_group("lsh");

    let hasher = MinHasher::new(128, 42);
    let signatures: Vec<_> = generate_documents(1000)
        .iter()
        .map(|d| hasher.signature(&shingles(&normalize(d), 3)))
        .collect();

    group.bench_function("insert_1000", |b| {
        b.iter(|| {
            let mut index = LshIndex::new(128, 16).unwrap();
            for (i, sig) in signatures.iter().enumerate() {
                index.insert(DocId::new(i), sig);
            }
            index
        })
    });

    let mut index = LshIndex::new(128, 16).unwrap();
    for (i, sig) in signatures.iter().enumerate() {
        index.insert(DocId::new(i), sig);
    }
    group.bench_function("candidate_pairs_1000", |b| {
        b.iter(|| index.candidate_pairs().count())
    });

    group.finish();
}

fn bench_analyze(c: &mut Criterion) {
    let mut group = c.benchmark_group("analyze");
    group.sample_size(10);

    let config = DedupConfig::new(128, 16, 3, 0.8, 42);
    let dedup = FuzzyDeduplicator::new(config).unwrap();
    let hasher = MinHasher::new(128, 42);

    for size in [100, 1000, 10000] {
        let corpus = Corpus::from_texts(generate_corpus(size, 0.3), 3, &hasher);

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &corpus, |b, corpus| {
            b.iter(|| dedup.analyze(black_box(corpus)).unwrap())
        });
    }

    group.finish();
}

fn bench_exact(c: &mut Criterion) {
    let mut group = c.benchmark_group("exact");
    group.sample_size(10);

    let dir = tempfile::tempdir().unwrap();
    let paths: Vec<PathBuf> = (0..50)
        .map(|f| {
            let path = dir.path().join(format!("part{f}.txt"));
            let text: String = (0..1000)
                .map(|l| format!("line {} of shared boilerplate {}\n", l, (f * l) % 97))
                .collect();
            fs::write(&path, text).unwrap();
            path
        })
        .collect();

    let dedup = ExactDeduplicator::new();
    group.throughput(Throughput::Elements(50_000));
    group.bench_function("count_lines_50k", |b| {
        b.iter(|| dedup.count_lines(black_box(&paths)))
    });

    let out = dir.path().join("out");
    group.bench_function("rewrite_50k", |b| {
        b.iter(|| dedup.rewrite(black_box(&paths), &out).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_fingerprint, bench_lsh, bench_analyze, bench_exact);
criterion_main!(benches);

//! sift-dedup CLI - Duplicate removal for plain-text corpora.

use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use sift_dedup::{
    DedupConfig, DedupStats, ExactDeduplicator, ExactStats, FileFailure, FuzzyDeduplicator,
    SurvivorPolicy,
};
use std::io;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

const DEFAULT_NUM_HASHES: usize = 128;
const DEFAULT_NUM_BANDS: usize = 16;
const DEFAULT_NGRAM: usize = 5;
const DEFAULT_THRESHOLD: f64 = 0.8;
const DEFAULT_SEED: u64 = 42;

/// Exit code when some outputs could not be written.
const EXIT_OUTPUT_FAILURES: i32 = 2;

/// JSON output for exact dedup.
#[derive(Serialize)]
struct ExactJsonOutput<'a> {
    mode: &'static str,
    output: String,
    #[serde(flatten)]
    stats: &'a ExactStats,
    input_failures: &'a [FileFailure],
    output_failures: &'a [FileFailure],
}

/// JSON output for fuzzy dedup.
#[derive(Serialize)]
struct FuzzyJsonOutput<'a> {
    mode: &'static str,
    output: Option<String>,
    num_hashes: usize,
    num_bands: usize,
    ngram_size: usize,
    jaccard_threshold: f64,
    seed: u64,
    #[serde(flatten)]
    stats: &'a DedupStats,
    input_failures: &'a [FileFailure],
    output_failures: &'a [FileFailure],
}

/// Survivor selection for each duplicate cluster.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum Survivor {
    /// Keep the cluster member listed first on the command line
    Lowest,
    /// Keep a random member (seeded by --seed)
    Random,
}

/// Duplicate removal for plain-text corpora.
///
/// Removes corpus-wide repeated lines, or near-duplicate documents using
/// MinHash signatures, LSH banding and exact Jaccard confirmation.
#[derive(Parser, Debug)]
#[command(name = "sift-dedup")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output results as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Show progress spinner.
    #[arg(long, global = true)]
    progress: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Drop every line that occurs more than once across all inputs
    Exact(ExactArgs),
    /// Drop near-duplicate documents, keeping one per cluster
    Fuzzy(FuzzyArgs),
    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct ExactArgs {
    /// Input text files.
    #[arg(value_name = "INPUT", required = true)]
    inputs: Vec<PathBuf>,

    /// Output directory.
    #[arg(short, long, value_name = "DIR")]
    output: PathBuf,
}

#[derive(Args, Debug)]
struct FuzzyArgs {
    /// Input text files, one document each.
    #[arg(value_name = "INPUT", required = true)]
    inputs: Vec<PathBuf>,

    /// Output directory.
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// JSON file with num_hashes, num_bands, ngram_size, jaccard_threshold and seed.
    /// Flags given on the command line override its values.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of MinHash functions [default: 128].
    #[arg(short = 'p', long)]
    num_hashes: Option<usize>,

    /// Number of LSH bands; must divide --num-hashes [default: 16].
    #[arg(short = 'b', long)]
    num_bands: Option<usize>,

    /// Word n-gram size for shingling [default: 5].
    #[arg(short = 'n', long)]
    ngram: Option<usize>,

    /// Jaccard threshold (0.0-1.0) for confirming duplicates [default: 0.8].
    #[arg(short, long, allow_negative_numbers = true)]
    threshold: Option<f64>,

    /// Seed for the MinHash family [default: 42].
    #[arg(long)]
    seed: Option<u64>,

    /// Which member of each cluster to keep.
    #[arg(long, value_enum, default_value = "lowest")]
    survivor: Survivor,

    /// Print statistics only, don't write output.
    #[arg(long)]
    stats_only: bool,
}

impl FuzzyArgs {
    /// Resolve the config: defaults, then the config file, then flags.
    fn resolve_config(&self) -> sift_core::Result<DedupConfig> {
        let base = match &self.config {
            Some(path) => DedupConfig::from_json_file(path)?,
            None => DedupConfig::new(
                DEFAULT_NUM_HASHES,
                DEFAULT_NUM_BANDS,
                DEFAULT_NGRAM,
                DEFAULT_THRESHOLD,
                DEFAULT_SEED,
            ),
        };

        Ok(DedupConfig {
            num_hashes: self.num_hashes.unwrap_or(base.num_hashes),
            num_bands: self.num_bands.unwrap_or(base.num_bands),
            ngram_size: self.ngram.unwrap_or(base.ngram_size),
            jaccard_threshold: self.threshold.unwrap_or(base.jaccard_threshold),
            seed: self.seed.unwrap_or(base.seed),
        })
    }
}

/// Create a spinner for indeterminate progress.
fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn init_logging(verbose: bool) {
    let default = if verbose { "sift_dedup=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Per-path failures are already logged by the library; only count them here.
fn print_failures(failures: &[FileFailure], label: &str) {
    if !failures.is_empty() {
        eprintln!("  {label}{}", failures.len());
    }
}

fn run_exact(cli: &Cli, args: &ExactArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let start = Instant::now();

    if cli.verbose && !cli.json {
        eprintln!("Configuration:");
        eprintln!("  Inputs: {} files", args.inputs.len());
        eprintln!("  Output: {}", args.output.display());
        eprintln!();
    }

    let pb = (cli.progress && !cli.json)
        .then(|| create_spinner("Running exact line deduplication..."));

    let report = ExactDeduplicator::new().rewrite(&args.inputs, &args.output)?;

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    let stats = &report.stats;
    if cli.json {
        let output = ExactJsonOutput {
            mode: "exact",
            output: args.output.display().to_string(),
            stats,
            input_failures: &report.input_failures,
            output_failures: &report.output_failures,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        eprintln!();
        eprintln!("Exact Line Deduplication Results:");
        eprintln!("  Files read:        {}", stats.files_read);
        eprintln!("  Files written:     {}", stats.files_written);
        eprintln!("  Total lines:       {}", stats.lines_total);
        eprintln!("  Distinct lines:    {}", stats.distinct_lines);
        eprintln!("  Lines kept:        {}", stats.lines_kept);
        eprintln!("  Lines dropped:     {}", stats.lines_dropped);
        print_failures(&report.input_failures, "Inputs skipped:    ");
        print_failures(&report.output_failures, "Outputs failed:    ");
        eprintln!();
        eprintln!("Total time: {:.3}s", start.elapsed().as_secs_f64());
    }

    Ok(if report.output_failures.is_empty() {
        0
    } else {
        EXIT_OUTPUT_FAILURES
    })
}

fn run_fuzzy(cli: &Cli, args: &FuzzyArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let start = Instant::now();

    let config = match args.resolve_config().and_then(|c| c.validate().map(|()| c)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let output_dir = match (&args.output, args.stats_only) {
        (Some(dir), false) => Some(dir.clone()),
        (_, true) => None,
        (None, false) => {
            eprintln!("Error: output directory required (use -o/--output or --stats-only)");
            std::process::exit(1);
        }
    };

    let survivor = match args.survivor {
        Survivor::Lowest => SurvivorPolicy::Lowest,
        Survivor::Random => SurvivorPolicy::Random { seed: config.seed },
    };
    let dedup = FuzzyDeduplicator::new(config.clone())?.with_survivor(survivor);

    if cli.verbose && !cli.json {
        eprintln!("Configuration:");
        eprintln!("  Inputs: {} files", args.inputs.len());
        if let Some(ref dir) = output_dir {
            eprintln!("  Output: {}", dir.display());
        }
        eprintln!("  Hash functions: {}", config.num_hashes);
        eprintln!(
            "  Bands: {} x {} rows (LSH threshold ~{:.2})",
            config.num_bands,
            config.rows_per_band(),
            config.lsh_threshold()
        );
        eprintln!("  N-gram size: {}", config.ngram_size);
        eprintln!("  Jaccard threshold: {}", config.jaccard_threshold);
        eprintln!("  Seed: {}", config.seed);
        eprintln!("  Survivor: {:?}", args.survivor);
        eprintln!();
    }

    let pb = (cli.progress && !cli.json).then(|| create_spinner("Reading documents..."));

    let (corpus, input_failures) = dedup.load(&args.inputs);
    if let Some(ref pb) = pb {
        pb.set_message(format!("Finding duplicates among {} documents...", corpus.len()));
    }

    let analysis = dedup.analyze(&corpus)?;
    let mut stats = DedupStats::from_analysis(corpus.len(), &analysis);

    let mut output_failures = Vec::new();
    if let Some(ref dir) = output_dir {
        if let Some(ref pb) = pb {
            pb.set_message("Writing output...");
        }
        let (_, failures) = dedup.rewrite(&corpus, &analysis.clusters, dir)?;
        output_failures = failures;
    }
    stats.processing_time_secs = start.elapsed().as_secs_f64();

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    if cli.json {
        let output = FuzzyJsonOutput {
            mode: "fuzzy",
            output: output_dir.as_ref().map(|p| p.display().to_string()),
            num_hashes: config.num_hashes,
            num_bands: config.num_bands,
            ngram_size: config.ngram_size,
            jaccard_threshold: config.jaccard_threshold,
            seed: config.seed,
            stats: &stats,
            input_failures: &input_failures,
            output_failures: &output_failures,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        eprintln!();
        eprintln!("Fuzzy Deduplication Results:");
        eprintln!("  Total documents:    {}", stats.total_documents);
        eprintln!("  Unique documents:   {}", stats.unique_documents);
        eprintln!("  Duplicates found:   {}", stats.duplicate_count);
        eprintln!("  Duplicate ratio:    {:.2}%", stats.duplicate_ratio * 100.0);
        eprintln!("  Duplicate clusters: {}", stats.cluster_count);
        eprintln!();
        eprintln!("Performance:");
        eprintln!("  Candidate pairs:   {}", stats.candidate_pairs);
        eprintln!("  Verified pairs:    {}", stats.verified_pairs);
        eprintln!("  Processing time:   {:.3}s", stats.processing_time_secs);
        print_failures(&input_failures, "Inputs skipped:    ");
        print_failures(&output_failures, "Outputs failed:    ");

        if args.stats_only {
            eprintln!();
            eprintln!("(Output not written: --stats-only mode)");
        }
    }

    Ok(if output_failures.is_empty() {
        0
    } else {
        EXIT_OUTPUT_FAILURES
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let code = match &cli.command {
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(*shell, &mut cmd, "sift-dedup", &mut io::stdout());
            return Ok(());
        }
        Commands::Exact(args) => {
            init_logging(cli.verbose);
            run_exact(&cli, args)?
        }
        Commands::Fuzzy(args) => {
            init_logging(cli.verbose);
            run_fuzzy(&cli, args)?
        }
    };

    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

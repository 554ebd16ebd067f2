//! svmtune command line interface
//!
//! Covers the data preparation surface: inspecting feature files, building
//! standardized class-balanced train/test splits, and applying previously
//! saved statistics to new files. The C search and final training run
//! through the library API against an external trainer.

use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use log::{error, info};
use std::path::PathBuf;
use std::process;
use svmtune::core::{NormStats, Result, TuneError};
use svmtune::data::{self, FeatureFileReader, TrainTestRatio, DEFAULT_SEED};
use svmtune::pipeline::PreparedData;

#[derive(Parser)]
#[command(name = "svmtune")]
#[command(about = "Data preparation for binary linear classifiers")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a feature file
    Inspect(InspectArgs),
    /// Split and standardize a feature file
    Prepare(PrepareArgs),
    /// Standardize a feature file with previously saved statistics
    Apply(ApplyArgs),
}

#[derive(Args)]
struct InspectArgs {
    /// Feature file to read
    data: PathBuf,
}

#[derive(Args)]
struct PrepareArgs {
    /// Feature file to read
    data: PathBuf,

    /// Output directory for train/test files and statistics
    #[arg(short, long)]
    output: PathBuf,

    /// Training samples per class
    #[arg(long, conflicts_with = "train_fraction")]
    train_count: Option<usize>,

    /// Training fraction of the smaller class (0.0-1.0)
    #[arg(long)]
    train_fraction: Option<f64>,

    /// Shuffle seed
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
}

#[derive(Args)]
struct ApplyArgs {
    /// Feature file to standardize
    data: PathBuf,

    /// Statistics file written by `prepare`
    #[arg(short, long)]
    stats: PathBuf,

    /// Output feature file
    #[arg(short, long)]
    output: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::Inspect(args) => inspect_command(args),
        Commands::Prepare(args) => prepare_command(args),
        Commands::Apply(args) => apply_command(args),
    };

    if let Err(e) = result {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn inspect_command(args: InspectArgs) -> Result<()> {
    let set = FeatureFileReader::from_file(&args.data)?;
    let min_class = set.num_pos().min(set.num_neg());

    println!("File:     {}", args.data.display());
    println!("Samples:  {}", set.len());
    println!("Features: {}", set.num_feat());
    println!("Positive: {}", set.num_pos());
    println!("Negative: {}", set.num_neg());
    println!("Max balanced training samples per class: {min_class}");
    Ok(())
}

fn prepare_command(args: PrepareArgs) -> Result<()> {
    let ratio = match (args.train_count, args.train_fraction) {
        (Some(n), _) => TrainTestRatio::Count(n),
        (None, Some(r)) => TrainTestRatio::Fraction(r),
        (None, None) => {
            return Err(TuneError::InvalidSplit(
                "Specify --train-count or --train-fraction".to_string(),
            ))
        }
    };

    info!("Preparing {} with seed {}", args.data.display(), args.seed);
    let prepared = PreparedData::from_file_seeded(&args.data, ratio, args.seed)?;

    std::fs::create_dir_all(&args.output).map_err(TuneError::IoError)?;
    let train_path = args.output.join("train.txt");
    let test_path = args.output.join("test.txt");
    let stats_path = args.output.join("stats.json");

    data::write_file(&prepared.train, &train_path)?;
    data::write_file(&prepared.test, &test_path)?;
    prepared.stats.save_to_file(&stats_path)?;

    println!(
        "Wrote {} training and {} test samples (effective ratio {:.3})",
        prepared.train.len(),
        prepared.test.len(),
        prepared.ratio
    );
    println!("Training file:   {}", train_path.display());
    println!("Test file:       {}", test_path.display());
    println!("Statistics file: {}", stats_path.display());
    Ok(())
}

fn apply_command(args: ApplyArgs) -> Result<()> {
    let stats = NormStats::load_from_file(&args.stats)?;
    info!(
        "Applying statistics from {} to {}",
        args.stats.display(),
        args.data.display()
    );

    let prepared = PreparedData::from_file_with_stats(&args.data, stats)?;
    data::write_file(&prepared.test, &args.output)?;

    println!(
        "Wrote {} standardized samples to {}",
        prepared.test.len(),
        args.output.display()
    );
    Ok(())
}

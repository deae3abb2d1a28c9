//! fedsplit command-line interface
//!
//! Partitions a labeled dataset into per-client train/test shards.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use fedsplit::dataset::synthetic::gaussian_blobs;
use fedsplit::partition::DEFAULT_MAX_ATTEMPTS;
use fedsplit::{generate, GenerateConfig, SampleSet, ShardFormat, Strategy, StrategyKind};

#[derive(Parser, Debug)]
#[command(name = "fedsplit")]
#[command(version)]
#[command(
    about = "Split a labeled dataset into non-IID federated client shards",
    long_about = None
)]
struct Cli {
    /// Output directory for config.json, train/ and test/
    #[arg(long = "dir_path", value_name = "DIR")]
    dir_path: PathBuf,

    /// Number of clients
    #[arg(long = "n_clients")]
    n_clients: usize,

    /// label: each client holds 'n_class_per_client' classes.
    /// dirichlet: each class is spread over clients by Dirichlet(alpha).
    /// dirichlet_quantity: client sizes follow Dirichlet(alpha).
    /// uniform: IID split
    #[arg(long, value_enum)]
    strategy: StrategyKind,

    /// Fraction of each client's samples held out for testing, in (0, 1)
    #[arg(long = "test_ratio")]
    test_ratio: f64,

    /// Dirichlet concentration, required by 'dirichlet' and 'dirichlet_quantity'
    #[arg(long)]
    alpha: Option<f64>,

    /// Minimum samples per client for the Dirichlet strategies
    #[arg(long = "min_size", default_value_t = 1)]
    min_size: usize,

    /// Classes per client, required by 'label'
    #[arg(long = "n_class_per_client")]
    n_class_per_client: Option<usize>,

    /// Dataset file (.json or .bin) holding {"x": features, "y": labels}
    #[arg(
        long,
        value_name = "FILE",
        required_unless_present = "synthetic_samples",
        conflicts_with = "synthetic_samples"
    )]
    input: Option<PathBuf>,

    /// Generate a Gaussian-blob dataset with this many samples instead of reading --input
    #[arg(long = "synthetic_samples")]
    synthetic_samples: Option<usize>,

    /// Feature width of the synthetic dataset
    #[arg(long = "synthetic_features", default_value_t = 16)]
    synthetic_features: usize,

    /// Number of classes of the synthetic dataset
    #[arg(long = "synthetic_classes", default_value_t = 10)]
    synthetic_classes: usize,

    /// Seed for every random draw
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Sampling attempts before a Dirichlet strategy gives up
    #[arg(long = "max_attempts", default_value_t = DEFAULT_MAX_ATTEMPTS)]
    max_attempts: usize,

    /// Shard encoding
    #[arg(long, value_enum, default_value_t = ShardFormat::Bin)]
    format: ShardFormat,

    /// Regenerate even if an up-to-date output already exists
    #[arg(long)]
    force: bool,
}

fn main() {
    init_tracing();

    if let Err(err) = run(Cli::parse()) {
        tracing::error!("{:#}", err);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = build_config(&cli).context("invalid configuration")?;
    let set = load_dataset(&cli)?;

    let report = generate(&set, &config).context("failed to generate client shards")?;
    if !report.skipped {
        tracing::info!(config = %report.config_path.display(), "done");
    }
    Ok(())
}

fn build_config(cli: &Cli) -> anyhow::Result<GenerateConfig> {
    let strategy = Strategy::from_parts(cli.strategy, cli.alpha, cli.n_class_per_client)?;

    let config = GenerateConfig::new(&cli.dir_path, cli.n_clients, strategy, cli.test_ratio)
        .with_min_size(cli.min_size)
        .with_max_attempts(cli.max_attempts)
        .with_seed(cli.seed)
        .with_format(cli.format)
        .with_force(cli.force);
    config.validate()?;
    Ok(config)
}

fn load_dataset(cli: &Cli) -> anyhow::Result<SampleSet> {
    match (&cli.input, cli.synthetic_samples) {
        (Some(path), _) => {
            tracing::info!(input = %path.display(), "loading dataset");
            SampleSet::load(path).with_context(|| format!("failed to load {}", path.display()))
        }
        (None, Some(n_samples)) => {
            let mut rng = StdRng::seed_from_u64(cli.seed);
            Ok(gaussian_blobs(
                &mut rng,
                n_samples,
                cli.synthetic_features,
                cli.synthetic_classes,
            )?)
        }
        (None, None) => anyhow::bail!("either --input or --synthetic_samples is required"),
    }
}

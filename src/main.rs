//! sigmoid-mlp CLI
//!
//! Trains a sigmoid multilayer perceptron on MNIST IDX files.
//!
//! Run with:
//!   cargo run --release -- train --data-dir dataset --hidden 300
//!   cargo run --release -- overfit --data-dir dataset --steps 20

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use sigmoid_mlp::config::{load_config, RunConfig};
use sigmoid_mlp::data::load_mnist;
use sigmoid_mlp::train::{evaluate, overfit_single, train_loop};
use sigmoid_mlp::{DatasetConfig, Network, NetworkSpec, NumericPolicy, TrainConfig};

#[derive(Parser)]
#[command(name = "sigmoid-mlp")]
#[command(about = "Online-SGD sigmoid MLP trainer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Train on the training partition, validating after every epoch
    Train {
        /// Directory holding the four MNIST IDX files
        #[arg(short, long, default_value = "dataset")]
        data_dir: PathBuf,

        /// JSON run configuration; flags below override it
        #[arg(short, long)]
        config: Option<String>,

        /// Hidden layer widths, input to output [default: 300]
        #[arg(long, value_delimiter = ',')]
        hidden: Option<Vec<usize>>,

        /// Number of epochs
        #[arg(short, long)]
        epochs: Option<usize>,

        /// Learning rate of the first epoch
        #[arg(long)]
        learning_rate: Option<f64>,

        /// Cap on examples per epoch
        #[arg(long)]
        max_steps: Option<usize>,

        /// Sigmoid overflow policy [default: clamp]
        #[arg(long, value_enum)]
        numeric_policy: Option<NumericPolicy>,

        /// Seed for weight initialization and shuffling
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Repeat the first training example and print the squared error per step
    Overfit {
        /// Directory holding the four MNIST IDX files
        #[arg(short, long, default_value = "dataset")]
        data_dir: PathBuf,

        /// Hidden layer widths, input to output
        #[arg(long, value_delimiter = ',', default_value = "300")]
        hidden: Vec<usize>,

        /// Number of updates
        #[arg(long, default_value = "20")]
        steps: usize,

        /// Learning rate
        #[arg(long, default_value = "0.5")]
        learning_rate: f64,

        /// Seed for weight initialization and shuffling
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Train {
            data_dir,
            config,
            hidden,
            epochs,
            learning_rate,
            max_steps,
            numeric_policy,
            seed,
        } => {
            let mut run = match config {
                Some(path) => load_config(&path)
                    .with_context(|| format!("failed to load run configuration {}", path))?,
                None => RunConfig {
                    network: None,
                    train: TrainConfig::new(1, 0.5),
                    dataset: DatasetConfig::mnist(),
                },
            };
            if let Some(epochs) = epochs {
                run.train.epochs = epochs;
            }
            if let Some(lr) = learning_rate {
                run.train.learning_rate = lr;
            }
            if max_steps.is_some() {
                run.train.max_steps_per_epoch = max_steps;
            }

            let spec = resolve_spec(
                run.network.take(),
                &run.dataset,
                hidden,
                numeric_policy,
                seed,
            )?;
            run.network = Some(spec.clone());
            run.validate()?;

            let mut rng = make_rng(spec.seed);
            let dataset = load_mnist(&data_dir, &run.dataset, &mut rng)
                .with_context(|| format!("failed to load MNIST from {}", data_dir.display()))?;
            let mut network = Network::from_spec(&spec, &mut rng)?;
            info!(policy = ?spec.numeric_policy, "network ready");

            let loss = train_loop(&mut network, &dataset.train, Some(&dataset.valid), &run.train, &mut rng)?;
            let test = evaluate(&mut network, &dataset.test)?;
            info!(
                final_train_loss = loss,
                test_loss = test.loss,
                test_accuracy = test.accuracy,
                "training finished"
            );
        }

        Commands::Overfit {
            data_dir,
            hidden,
            steps,
            learning_rate,
            seed,
        } => {
            let mut rng = make_rng(seed);
            let dataset = load_mnist(&data_dir, &DatasetConfig::mnist(), &mut rng)
                .with_context(|| format!("failed to load MNIST from {}", data_dir.display()))?;
            let mut network = Network::with_widths(
                &widths(dataset.input_width, &hidden, dataset.classes),
                NumericPolicy::Clamp,
                &mut rng,
            )?;

            let (input, target) = dataset
                .train
                .get(0)
                .context("training partition is empty")?;
            let losses = overfit_single(&mut network, input, target, learning_rate, steps)?;
            for (step, loss) in losses.iter().enumerate() {
                println!("{:>4}  {:.6}", step, loss);
            }
        }
    }

    Ok(())
}

fn widths(input_width: usize, hidden: &[usize], classes: usize) -> Vec<usize> {
    std::iter::once(input_width)
        .chain(hidden.iter().copied())
        .chain(std::iter::once(classes))
        .collect()
}

/// Picks the architecture from the config file or `--hidden`, then applies
/// the flags that override either source.
fn resolve_spec(
    configured: Option<NetworkSpec>,
    dataset: &DatasetConfig,
    hidden: Option<Vec<usize>>,
    numeric_policy: Option<NumericPolicy>,
    seed: Option<u64>,
) -> Result<NetworkSpec> {
    let mut spec = match configured {
        Some(spec) => {
            if hidden.is_some() {
                warn!("--hidden ignored: the run configuration defines the network layers");
            }
            spec
        }
        None => {
            let hidden = hidden.unwrap_or_else(|| vec![300]);
            NetworkSpec::from_widths(&widths(dataset.input_width, &hidden, dataset.classes))?
        }
    };
    if let Some(policy) = numeric_policy {
        spec.numeric_policy = policy;
    }
    if seed.is_some() {
        spec.seed = seed;
    }
    Ok(spec)
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

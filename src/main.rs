//! Command-line front end: initialize, train, query and inspect a digit
//! network stored as `weights.json` / `biases.json`.
//!
//! Run with:
//!   cargo run --release -- train --data data/data_1000.json --model model --init

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use digit_nn::network::INPUT_SIZE;
use digit_nn::{train_until_accurate, Dataset, Network, Sgd, TrainConfig, DEFAULT_LEARNING_RATE};

#[derive(Parser)]
#[command(name = "digit-nn")]
#[command(about = "Train and query a 784-16-16-10 digit recognizer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbosity level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Write randomly initialized parameters
    Init {
        /// Output directory
        #[arg(short, long, default_value = "model")]
        out: PathBuf,
    },

    /// Train on a JSON dataset until a target rolling accuracy
    Train {
        /// Dataset file ({ "training": [{ "x": [...], "y": [...] }] })
        #[arg(short, long)]
        data: PathBuf,

        /// Parameter directory to load from and save to
        #[arg(short, long, default_value = "model")]
        model: PathBuf,

        /// Start from random parameters instead of loading
        #[arg(long)]
        init: bool,

        /// Target rolling accuracy in [0, 1]
        #[arg(short, long, default_value = "0.9")]
        target: f64,

        /// Full passes over the dataset before giving up
        #[arg(long, default_value = "100")]
        max_epochs: usize,

        /// Learning rate
        #[arg(long, default_value_t = DEFAULT_LEARNING_RATE)]
        lr: f64,

        /// Rolling accuracy window
        #[arg(short, long, default_value = "1000")]
        window: usize,
    },

    /// Classify one drawing
    Guess {
        /// Parameter directory
        #[arg(short, long, default_value = "model")]
        model: PathBuf,

        /// JSON file holding 784 values, flat or as 28 rows of 28
        #[arg(short, long)]
        input: PathBuf,

        /// Also print every layer's activations
        #[arg(long)]
        activations: bool,
    },

    /// Show layer shapes and parameter counts
    Inspect {
        /// Parameter directory
        #[arg(short, long, default_value = "model")]
        model: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = cli.log_level.parse::<Level>().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Init { out } => {
            Network::random()
                .save(&out)
                .with_context(|| format!("saving parameters to {}", out.display()))?;
            info!("Wrote random parameters to {}", out.display());
        }

        Commands::Train {
            data,
            model,
            init,
            target,
            max_epochs,
            lr,
            window,
        } => {
            let dataset = Dataset::load_json(&data)
                .with_context(|| format!("loading dataset {}", data.display()))?;
            let mut network = if init {
                Network::random()
            } else {
                load_network(&model)?
            };
            info!(
                samples = dataset.training.len(),
                target_accuracy = target,
                max_epochs,
                lr,
                "Starting training"
            );

            let config = TrainConfig::new(target)
                .with_max_epochs(max_epochs)
                .with_window_size(window);
            let outcome = train_until_accurate(&mut network, &dataset, &Sgd::new(lr), &config)?;

            network
                .save(&model)
                .with_context(|| format!("saving parameters to {}", model.display()))?;

            println!("converged:      {}", outcome.converged);
            println!("final accuracy: {:.2}%", outcome.final_accuracy * 100.0);
            println!("epochs run:     {}", outcome.epochs_run);
            println!("steps:          {}", outcome.steps);
            println!("mean loss:      {:.6}", outcome.mean_loss);
        }

        Commands::Guess {
            model,
            input,
            activations,
        } => {
            let network = load_network(&model)?;
            let x = read_drawing(&input)?;
            let guess = network.guess(&x)?;

            println!("{}", guess.digit);
            if activations {
                for (layer, values) in guess.activations.iter().enumerate().skip(1) {
                    let shown: Vec<String> = values.iter().map(|a| format!("{a:.3}")).collect();
                    println!("layer {layer}: [{}]", shown.join(", "));
                }
            }
        }

        Commands::Inspect { model } => {
            let network = load_network(&model)?;
            let topology = network.topology();
            println!("layers: {:?}", topology.sizes());
            for l in 1..topology.depth() {
                let (rows, cols) = topology.weight_shape(l);
                println!("  layer {l}: weights {rows}x{cols}, biases {rows}");
            }
            println!("parameters: {}", topology.parameter_count());
        }
    }

    Ok(())
}

fn load_network(dir: &Path) -> Result<Network> {
    Network::load(dir).with_context(|| format!("loading parameters from {}", dir.display()))
}

/// Accepts a flat array of 784 values or 28 rows of 28, flattened row-major.
fn read_drawing(path: &Path) -> Result<Vec<f64>> {
    #[derive(serde::Deserialize)]
    #[serde(untagged)]
    enum Drawing {
        Flat(Vec<f64>),
        Grid(Vec<Vec<f64>>),
    }

    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let x = match serde_json::from_str(&text).context("parsing drawing")? {
        Drawing::Flat(x) => x,
        Drawing::Grid(rows) => rows.into_iter().flatten().collect(),
    };
    anyhow::ensure!(
        x.len() == INPUT_SIZE,
        "drawing has {} values, expected {}",
        x.len(),
        INPUT_SIZE
    );
    Ok(x)
}

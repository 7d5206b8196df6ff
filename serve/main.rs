/// digit-nn inference server
///
/// Serves the trained network to a drawing front end over HTTP. The front end
/// flattens its 28×28 canvas into 784 intensities and renders the returned
/// per-layer activations.
///
/// Run with:
///   cargo run --bin serve --release -- --model-dir model
///
/// Routes:
///   POST /guess     { "input": [784 floats] } → { "digit", "activations" }
///   GET  /topology  layer sizes
///   GET  /health    "ok"

mod handlers;
mod routes;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tiny_http::Server;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use digit_nn::Network;

#[derive(Parser)]
#[command(name = "serve")]
#[command(about = "HTTP inference endpoint for the digit network", long_about = None)]
struct Cli {
    /// Address to bind
    #[arg(short, long, default_value = "127.0.0.1:7878")]
    addr: String,

    /// Directory holding weights.json and biases.json
    #[arg(short, long, default_value = "model")]
    model_dir: PathBuf,

    /// Serve a randomly initialized network instead of loading one
    #[arg(long)]
    random: bool,

    /// Verbosity level
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = cli.log_level.parse::<Level>().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let network = if cli.random {
        Network::random()
    } else {
        Network::load(&cli.model_dir)
            .with_context(|| format!("loading parameters from {}", cli.model_dir.display()))?
    };
    info!(layers = ?network.topology().sizes(), "network ready");

    let server = Server::http(&cli.addr)
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", cli.addr, e))?;
    info!("listening on http://{}", cli.addr);

    // Inference only reads the network, so requests share it without a lock.
    let network = Arc::new(network);
    for request in server.incoming_requests() {
        let network = Arc::clone(&network);
        std::thread::spawn(move || {
            routes::dispatch(request, &network);
        });
    }

    Ok(())
}

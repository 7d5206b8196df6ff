//! Trains the 784-16-16-10 digit network on ten synthetic "drawings", each a
//! horizontal band of lit pixels, and prints what it guesses afterwards.
//!
//! Run with:
//!   cargo run --example separable --release
use digit_nn::network::{INPUT_SIZE, OUTPUT_SIZE};
use digit_nn::{train_until_accurate, Network, Sample, Sgd, Topology, TrainConfig};

fn main() -> digit_nn::Result<()> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

    let rows_per_band = 28 / OUTPUT_SIZE;
    let samples: Vec<Sample> = (0..OUTPUT_SIZE)
        .map(|digit| {
            let x = (0..INPUT_SIZE)
                .map(|p| if (p / 28) / rows_per_band == digit { 1.0 } else { 0.0 })
                .collect();
            Sample::labeled(x, digit, OUTPUT_SIZE)
        })
        .collect();

    let mut network = Network::uniform_with_rng(Topology::digits(), -0.3, 0.3, &mut rand::thread_rng());
    let config = TrainConfig::new(1.0).with_max_epochs(1000).with_window_size(100);
    let outcome = train_until_accurate(&mut network, &samples, &Sgd::new(0.5), &config)?;

    println!(
        "converged: {} after {} epochs ({} steps), rolling accuracy {:.1}%",
        outcome.converged,
        outcome.epochs_run,
        outcome.steps,
        outcome.final_accuracy * 100.0
    );

    for sample in &samples {
        let guess = network.guess(&sample.x)?;
        let confidence = guess.activations[3][guess.digit];
        println!("band {} -> guess {} ({:.3})", sample.label(), guess.digit, confidence);
    }
    Ok(())
}

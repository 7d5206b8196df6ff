use std::sync::atomic::Ordering;
use std::time::Instant;

use tracing::{info, warn};

use crate::error::{NetworkError, Result};
use crate::loss::squared_error::SquaredErrorLoss;
use crate::math::argmax;
use crate::network::network::Network;
use crate::optim::sgd::Sgd;
use crate::train::accuracy::RollingAccuracy;
use crate::train::dataset::SampleSource;
use crate::train::train_config::TrainConfig;
use crate::train::window_stats::WindowStats;

/// How a training run ended.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainOutcome {
    /// Rolling accuracy reached the target at a window boundary.
    pub converged: bool,
    /// Stopped by the stop flag or a dropped progress receiver.
    pub interrupted: bool,
    /// Rolling accuracy when the loop ended.
    pub final_accuracy: f64,
    /// Epochs started, including a partial last one.
    pub epochs_run: usize,
    /// Samples processed.
    pub steps: usize,
    /// Mean squared error over the most recent window (or the partial window
    /// if none completed).
    pub mean_loss: f64,
}

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Online training: one forward pass, one backward pass and one SGD step per
/// sample, cycling through `samples` until the rolling accuracy reaches
/// `config.target_accuracy` or `config.max_epochs` passes are used up.
///
/// Correctness of each sample is judged on the guess made *before* that
/// sample's update and recorded at `step % window_size`. Accuracy is only
/// checked when the window has just filled, i.e. every `window_size` steps.
///
/// Every sample is validated against the network's topology up front, so a
/// bad sample fails the run before any parameter changes.
///
/// # Early termination
/// Besides convergence, the loop stops at a window boundary if:
/// - the `progress_tx` receiver has been dropped, **or**
/// - `config.stop_flag` is set to `true`.
pub fn train_until_accurate<S: SampleSource + ?Sized>(
    network: &mut Network,
    samples: &S,
    optimizer: &Sgd,
    config: &TrainConfig,
) -> Result<TrainOutcome> {
    let n = samples.len();
    if n == 0 {
        return Err(NetworkError::EmptyDataset);
    }
    let input_size = network.topology().input_size();
    let output_size = network.topology().output_size();
    for i in 0..n {
        samples.sample(i).validate(i, input_size, output_size)?;
    }

    let window_size = config.window_size.max(1);
    let budget = config.max_epochs.saturating_mul(n);
    if !budget_fills_window(budget, window_size) {
        warn!(
            budget,
            window_size,
            "step budget is smaller than one accuracy window; the run cannot converge"
        );
    }
    let mut window = RollingAccuracy::new(window_size);

    let mut step = 0;
    let mut converged = false;
    let mut interrupted = false;
    let mut window_loss = 0.0;
    let mut window_steps = 0;
    let mut mean_loss = 0.0;
    let mut window_start = Instant::now();

    while step < budget {
        let sample = samples.sample(step % n);

        // ── Guess, then learn from the true label ─────────────────────────
        let pass = network.propagate_forward(&sample.x)?;
        let correct = argmax(pass.output()) == argmax(&sample.y);
        window_loss += SquaredErrorLoss::loss(pass.output(), &sample.y);
        window_steps += 1;

        let gradients = network.propagate_back(&pass, &sample.y)?;
        optimizer.step(network, &gradients)?;

        window.record(step, correct);
        step += 1;

        if step % window_size != 0 {
            continue;
        }

        // ── Window boundary ───────────────────────────────────────────────
        let accuracy = window.accuracy();
        mean_loss = window_loss / window_steps as f64;
        let stats = WindowStats {
            window: step / window_size,
            step,
            epoch: (step - 1) / n + 1,
            accuracy,
            mean_loss,
            elapsed_ms: window_start.elapsed().as_millis() as u64,
        };
        info!(
            window = stats.window,
            epoch = stats.epoch,
            accuracy = format_args!("{:.2}%", accuracy * 100.0),
            mean_loss = format_args!("{:.5}", mean_loss),
            "accuracy window complete"
        );
        window_loss = 0.0;
        window_steps = 0;
        window_start = Instant::now();

        if let Some(ref tx) = config.progress_tx {
            // If the receiver has been dropped, stop training.
            if tx.send(stats).is_err() {
                interrupted = true;
                break;
            }
        }

        if accuracy >= config.target_accuracy {
            converged = true;
            break;
        }

        if let Some(ref flag) = config.stop_flag {
            if flag.load(Ordering::Relaxed) {
                interrupted = true;
                break;
            }
        }
    }

    if window_steps > 0 && step < window_size {
        mean_loss = window_loss / window_steps as f64;
    }

    let outcome = TrainOutcome {
        converged,
        interrupted,
        final_accuracy: window.accuracy(),
        epochs_run: (step + n - 1) / n,
        steps: step,
        mean_loss,
    };

    if converged {
        info!(steps = outcome.steps, epochs = outcome.epochs_run, "target accuracy reached");
    } else {
        warn!(
            steps = outcome.steps,
            epochs = outcome.epochs_run,
            accuracy = outcome.final_accuracy,
            target_accuracy = config.target_accuracy,
            interrupted,
            "training ended before reaching target accuracy"
        );
    }

    Ok(outcome)
}

/// Accuracy is only checked when a window fills, so a budget shorter than
/// one window never gets a convergence check.
fn budget_fills_window(budget: usize, window_size: usize) -> bool {
    budget >= window_size
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::topology::Topology;
    use crate::train::dataset::Sample;
    use std::sync::atomic::AtomicBool;
    use std::sync::{mpsc, Arc};

    fn tiny_net() -> Network {
        Network::with_topology(Topology::new(vec![2, 3, 2]).unwrap())
    }

    fn tiny_set() -> Vec<Sample> {
        vec![
            Sample::labeled(vec![1.0, 0.0], 0, 2),
            Sample::labeled(vec![0.0, 1.0], 1, 2),
        ]
    }

    #[test]
    fn budget_bounds_non_convergence() {
        let mut net = tiny_net();
        let config = TrainConfig::new(1.1).with_max_epochs(3).with_window_size(4);
        let outcome = train_until_accurate(&mut net, &tiny_set(), &Sgd::default(), &config).unwrap();

        assert!(!outcome.converged);
        assert!(!outcome.interrupted);
        assert_eq!(outcome.steps, 6);
        assert_eq!(outcome.epochs_run, 3);
    }

    #[test]
    fn short_budget_never_reaches_a_window() {
        assert!(!budget_fills_window(500, 1000));
        assert!(budget_fills_window(1000, 1000));

        // 2 samples x 3 epochs = 6 steps against a window of 10: every guess
        // may be right, but no boundary is reached to check it.
        let mut net = tiny_net();
        let config = TrainConfig::new(0.0).with_max_epochs(3).with_window_size(10);
        let outcome = train_until_accurate(&mut net, &tiny_set(), &Sgd::default(), &config).unwrap();

        assert!(!outcome.converged);
        assert_eq!(outcome.steps, 6);
        assert!(outcome.final_accuracy <= 0.6);
    }

    #[test]
    fn zero_target_converges_at_first_window() {
        let mut net = tiny_net();
        let config = TrainConfig::new(0.0).with_window_size(3);
        let outcome = train_until_accurate(&mut net, &tiny_set(), &Sgd::default(), &config).unwrap();

        assert!(outcome.converged);
        assert_eq!(outcome.steps, 3);
        assert_eq!(outcome.epochs_run, 2);
    }

    #[test]
    fn stats_are_sent_per_window() {
        let (tx, rx) = mpsc::channel();
        let mut net = tiny_net();
        let config = TrainConfig::new(1.1)
            .with_max_epochs(5)
            .with_window_size(2)
            .with_progress(tx);
        train_until_accurate(&mut net, &tiny_set(), &Sgd::default(), &config).unwrap();

        let stats: Vec<WindowStats> = rx.try_iter().collect();
        assert_eq!(stats.len(), 5);
        assert_eq!(stats[4].window, 5);
        assert_eq!(stats[4].step, 10);
        assert_eq!(stats[4].epoch, 5);
    }

    #[test]
    fn dropped_receiver_interrupts() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let mut net = tiny_net();
        let config = TrainConfig::new(1.1).with_window_size(2).with_progress(tx);
        let outcome = train_until_accurate(&mut net, &tiny_set(), &Sgd::default(), &config).unwrap();

        assert!(outcome.interrupted);
        assert_eq!(outcome.steps, 2);
    }

    #[test]
    fn stop_flag_interrupts_at_boundary() {
        let flag = Arc::new(AtomicBool::new(true));
        let mut net = tiny_net();
        let config = TrainConfig::new(1.1).with_window_size(2).with_stop_flag(flag);
        let outcome = train_until_accurate(&mut net, &tiny_set(), &Sgd::default(), &config).unwrap();

        assert!(outcome.interrupted);
        assert!(!outcome.converged);
        assert_eq!(outcome.steps, 2);
    }

    #[test]
    fn bad_samples_fail_before_training() {
        let mut net = tiny_net();
        let before = net.clone();
        let mut samples = tiny_set();
        samples.push(Sample::labeled(vec![1.0, 0.0, 0.0], 0, 2));
        let err = train_until_accurate(&mut net, &samples, &Sgd::default(), &TrainConfig::new(0.9)).unwrap_err();

        assert!(matches!(err, NetworkError::InvalidSampleShape { index: 2, .. }));
        assert_eq!(net, before);

        let empty: Vec<Sample> = Vec::new();
        assert!(matches!(
            train_until_accurate(&mut net, &empty, &Sgd::default(), &TrainConfig::new(0.9)),
            Err(NetworkError::EmptyDataset)
        ));
    }
}

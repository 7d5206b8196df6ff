use std::sync::mpsc;
use std::sync::{atomic::AtomicBool, Arc};

use crate::train::accuracy::DEFAULT_WINDOW;
use crate::train::window_stats::WindowStats;

pub const DEFAULT_MAX_EPOCHS: usize = 100;

/// Configuration for a `train_until_accurate` run.
///
/// # Fields
/// - `target_accuracy` — rolling accuracy in [0, 1] at which training stops
/// - `max_epochs`      — full passes over the dataset before giving up
/// - `window_size`     — correctness flags kept for the rolling accuracy
/// - `progress_tx`     — optional channel; one `WindowStats` is sent per
///                       completed window. If the receiver is dropped the
///                       loop stops early.
/// - `stop_flag`       — optional atomic flag; when set from another thread
///                       the loop stops at the next window boundary.
#[derive(Debug, Clone)]
pub struct TrainConfig {
    pub target_accuracy: f64,
    pub max_epochs: usize,
    pub window_size: usize,
    pub progress_tx: Option<mpsc::Sender<WindowStats>>,
    pub stop_flag: Option<Arc<AtomicBool>>,
}

impl TrainConfig {
    /// Defaults: 100 epochs, a 1000-sample window, no channel, no stop flag.
    pub fn new(target_accuracy: f64) -> Self {
        TrainConfig {
            target_accuracy,
            max_epochs: DEFAULT_MAX_EPOCHS,
            window_size: DEFAULT_WINDOW,
            progress_tx: None,
            stop_flag: None,
        }
    }

    pub fn with_max_epochs(mut self, max_epochs: usize) -> Self {
        self.max_epochs = max_epochs;
        self
    }

    /// Zero is bumped to one.
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size.max(1);
        self
    }

    pub fn with_progress(mut self, tx: mpsc::Sender<WindowStats>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    pub fn with_stop_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.stop_flag = Some(flag);
        self
    }
}

use serde::{Deserialize, Serialize};

/// Progress record emitted each time the accuracy window fills up.
///
/// When a `progress_tx` channel is configured in `TrainConfig`, the training
/// loop sends one `WindowStats` value per completed window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowStats {
    /// 1-based window number.
    pub window: usize,
    /// Samples processed so far.
    pub step: usize,
    /// 1-based epoch the window ended in.
    pub epoch: usize,
    /// Rolling accuracy in [0, 1].
    pub accuracy: f64,
    /// Mean squared error over the samples of this window.
    pub mean_loss: f64,
    /// Wall-clock duration of this window in milliseconds.
    pub elapsed_ms: u64,
}

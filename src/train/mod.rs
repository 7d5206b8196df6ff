pub mod accuracy;
pub mod dataset;
pub mod loop_fn;
pub mod train_config;
pub mod window_stats;

pub use accuracy::{RollingAccuracy, DEFAULT_WINDOW};
pub use dataset::{one_hot, Dataset, Sample, SampleSource};
pub use loop_fn::{train_until_accurate, TrainOutcome};
pub use train_config::TrainConfig;
pub use window_stats::WindowStats;

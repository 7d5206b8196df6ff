pub mod error;
pub mod math;
pub mod activation;
pub mod layers;
pub mod network;
pub mod loss;
pub mod optim;
pub mod train;

// Convenience re-exports
pub use error::{NetworkError, Result};
pub use math::matrix::Matrix;
pub use activation::sigmoid::{sigmoid, sigmoid_prime};
pub use layers::dense::DenseLayer;
pub use network::{ForwardPass, Gradients, Guess, Network, OutputDerivative, Parameters, Topology};
pub use loss::squared_error::SquaredErrorLoss;
pub use optim::sgd::{Sgd, DEFAULT_LEARNING_RATE};
pub use train::{train_until_accurate, Dataset, Sample, SampleSource, TrainConfig, TrainOutcome, WindowStats};

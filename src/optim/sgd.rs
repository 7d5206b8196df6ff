use crate::{error::Result, network::gradients::Gradients, network::network::Network};

/// Step size the digit network is trained with.
pub const DEFAULT_LEARNING_RATE: f64 = 0.2;

/// Plain stochastic gradient descent: no momentum, no decay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sgd {
    pub learning_rate: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Sgd {
        Sgd { learning_rate }
    }

    /// Applies one update to every layer. Each call subtracts again, so a
    /// bundle must not be applied twice.
    pub fn step(&self, network: &mut Network, gradients: &Gradients) -> Result<()> {
        network.apply_gradient(gradients, self.learning_rate)
    }
}

impl Default for Sgd {
    fn default() -> Self {
        Sgd::new(DEFAULT_LEARNING_RATE)
    }
}

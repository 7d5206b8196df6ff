use serde::{Deserialize, Serialize};

use crate::error::{NetworkError, Result};

/// Pixels in a flattened 28×28 drawing.
pub const INPUT_SIZE: usize = 28 * 28;
/// One output neuron per digit.
pub const OUTPUT_SIZE: usize = 10;
/// Neurons in each of the two hidden layers.
pub const HIDDEN_SIZE: usize = 16;

/// Ordered layer sizes, input first.
///
/// Layer 0 is the input and owns no parameters; every later layer `l` owns a
/// `[sizes[l]][sizes[l - 1]]` weight matrix and a `sizes[l]` bias vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct Topology {
    sizes: Vec<usize>,
}

impl Topology {
    pub fn new(sizes: Vec<usize>) -> Result<Topology> {
        if sizes.len() < 2 {
            return Err(NetworkError::InvalidTopology(format!(
                "need an input and an output layer, got {} layer(s)",
                sizes.len()
            )));
        }
        if let Some(layer) = sizes.iter().position(|&s| s == 0) {
            return Err(NetworkError::InvalidTopology(format!("layer {layer} has no neurons")));
        }
        Ok(Topology { sizes })
    }

    /// The digit recognizer: 784 → 16 → 16 → 10.
    pub fn digits() -> Topology {
        Topology {
            sizes: vec![INPUT_SIZE, HIDDEN_SIZE, HIDDEN_SIZE, OUTPUT_SIZE],
        }
    }

    pub fn sizes(&self) -> &[usize] {
        &self.sizes
    }

    /// Number of layers including the input layer.
    pub fn depth(&self) -> usize {
        self.sizes.len()
    }

    pub fn size(&self, layer: usize) -> usize {
        self.sizes[layer]
    }

    pub fn input_size(&self) -> usize {
        self.sizes[0]
    }

    pub fn output_size(&self) -> usize {
        self.sizes[self.sizes.len() - 1]
    }

    /// Index of the terminal (normalized) layer.
    pub fn output_layer(&self) -> usize {
        self.sizes.len() - 1
    }

    /// `(rows, cols)` of the weight matrix feeding `layer`; `layer >= 1`.
    pub fn weight_shape(&self, layer: usize) -> (usize, usize) {
        (self.sizes[layer], self.sizes[layer - 1])
    }

    /// Total weights plus biases.
    pub fn parameter_count(&self) -> usize {
        self.sizes.windows(2).map(|w| w[1] * w[0] + w[1]).sum()
    }
}

impl Default for Topology {
    fn default() -> Self {
        Topology::digits()
    }
}

impl TryFrom<Vec<usize>> for Topology {
    type Error = NetworkError;

    fn try_from(sizes: Vec<usize>) -> Result<Self> {
        Topology::new(sizes)
    }
}

impl From<Topology> for Vec<usize> {
    fn from(t: Topology) -> Self {
        t.sizes
    }
}

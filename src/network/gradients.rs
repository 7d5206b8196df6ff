use crate::math::matrix::Matrix;

/// Derivatives of the loss produced by one backward pass.
///
/// All three vectors are indexed by layer; entry 0 (the input layer) is
/// empty. `biases[l][i]` is ∂L/∂z for neuron `i` of layer `l`.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradients {
    pub activations: Vec<Vec<f64>>,
    pub biases: Vec<Vec<f64>>,
    pub weights: Vec<Matrix>,
}

impl Gradients {
    pub(crate) fn empty(depth: usize) -> Gradients {
        Gradients {
            activations: vec![Vec::new(); depth],
            biases: vec![Vec::new(); depth],
            weights: vec![Matrix::default(); depth],
        }
    }

    pub fn depth(&self) -> usize {
        self.biases.len()
    }
}

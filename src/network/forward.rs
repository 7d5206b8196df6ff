use serde::Serialize;

/// Everything a forward pass computed, layer by layer.
///
/// Index 0 is the input layer: `activations[0]` is the input vector and
/// `z[0]` is empty. Backpropagation reads this instead of state hidden in
/// the network, so a pass can only be differentiated against the network
/// that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForwardPass {
    pub z: Vec<Vec<f64>>,
    pub activations: Vec<Vec<f64>>,
}

impl ForwardPass {
    pub(crate) fn from_input(input: Vec<f64>, depth: usize) -> ForwardPass {
        let mut z = Vec::with_capacity(depth);
        let mut activations = Vec::with_capacity(depth);
        z.push(Vec::new());
        activations.push(input);
        ForwardPass { z, activations }
    }

    pub(crate) fn push_layer(&mut self, z: Vec<f64>, activation: Vec<f64>) {
        self.z.push(z);
        self.activations.push(activation);
    }

    /// Number of layers recorded, input included.
    pub fn depth(&self) -> usize {
        self.activations.len()
    }

    pub fn input(&self) -> &[f64] {
        &self.activations[0]
    }

    /// Activations of the terminal layer.
    pub fn output(&self) -> &[f64] {
        self.activations.last().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn into_activations(self) -> Vec<Vec<f64>> {
        self.activations
    }
}

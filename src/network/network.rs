use std::path::Path;

use rand::Rng;
use serde::Serialize;
use tracing::debug;

use crate::activation::sigmoid::{sigmoid, sigmoid_prime};
use crate::error::{NetworkError, Result};
use crate::layers::dense::{DenseLayer, INIT_SCALE};
use crate::loss::squared_error::SquaredErrorLoss;
use crate::math::{argmax, matrix::Matrix};
use crate::network::forward::ForwardPass;
use crate::network::gradients::Gradients;
use crate::network::params::Parameters;
use crate::network::topology::Topology;

/// How the output layer's ∂L/∂z is derived from ∂L/∂a.
///
/// The output layer divides its sigmoid activations by their sum, so the
/// exact derivative has to go through that normalization as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputDerivative {
    /// Chain rule through the sum normalization and the sigmoid.
    /// Agrees with finite differences of the squared error.
    #[default]
    ThroughNormalization,
    /// `∂L/∂a · σ'(z)`, treating the normalization as the identity.
    /// This is the rule the digit demo was originally trained with.
    SigmoidOnly,
}

/// Result of a single inference: the predicted class plus every layer's
/// activations, input layer first, for visualization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Guess {
    pub digit: usize,
    pub activations: Vec<Vec<f64>>,
}

/// Fully-connected sigmoid network whose output layer is normalized to sum
/// to one.
///
/// `layers[l - 1]` holds the parameters feeding layer `l`; the input layer
/// has none. Parameters only change through [`Network::apply_gradient`].
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    topology: Topology,
    layers: Vec<DenseLayer>,
    output_derivative: OutputDerivative,
}

impl Network {
    /// Builds the digit network, drawing whichever of `weights` / `biases`
    /// is missing uniformly from `[0, 0.1)`.
    ///
    /// Both tensors are indexed by destination layer with entry 0 unused.
    pub fn new(
        weights: Option<Vec<Option<Matrix>>>,
        biases: Option<Vec<Option<Vec<f64>>>>,
    ) -> Result<Network> {
        let topology = Topology::digits();
        let random = Network::random_with_rng(topology.clone(), &mut rand::thread_rng());
        let mut fallback = random.to_parameters();

        if let Some(weights) = weights {
            fallback.weights = weights;
        }
        if let Some(biases) = biases {
            fallback.biases = biases;
        }
        Network::from_parameters(topology, fallback)
    }

    /// Randomly initialized digit network.
    pub fn random() -> Network {
        Network::with_topology(Topology::digits())
    }

    pub fn with_topology(topology: Topology) -> Network {
        Network::random_with_rng(topology, &mut rand::thread_rng())
    }

    pub fn random_with_rng<R: Rng + ?Sized>(topology: Topology, rng: &mut R) -> Network {
        Network::uniform_with_rng(topology, 0.0, INIT_SCALE, rng)
    }

    /// Every weight and bias drawn uniformly from `[low, high)`.
    ///
    /// The all-positive default range starts every hidden neuron near the
    /// same activation; small datasets train much faster from a range
    /// centered on zero.
    pub fn uniform_with_rng<R: Rng + ?Sized>(
        topology: Topology,
        low: f64,
        high: f64,
        rng: &mut R,
    ) -> Network {
        let layers = (1..topology.depth())
            .map(|l| {
                let (size, input_size) = topology.weight_shape(l);
                DenseLayer::uniform(size, input_size, low, high, rng)
            })
            .collect();
        debug!(sizes = ?topology.sizes(), low, high, "initialized network with random parameters");
        Network {
            topology,
            layers,
            output_derivative: OutputDerivative::default(),
        }
    }

    /// Builds a network from explicit tensors, checking every shape against
    /// `topology`. Entry 0 of both tensors is ignored.
    pub fn from_parameters(topology: Topology, params: Parameters) -> Result<Network> {
        let depth = topology.depth();
        if params.weights.len() != depth {
            return Err(NetworkError::mismatch("weight tensor layers", depth, params.weights.len()));
        }
        if params.biases.len() != depth {
            return Err(NetworkError::mismatch("bias tensor layers", depth, params.biases.len()));
        }

        let mut layers = Vec::with_capacity(depth - 1);
        let pairs = params.weights.into_iter().zip(params.biases).enumerate().skip(1);
        for (l, (weights, biases)) in pairs {
            let (rows, cols) = topology.weight_shape(l);
            let weights = weights.unwrap_or_default();
            let biases = biases.unwrap_or_default();
            if weights.rows != rows {
                return Err(NetworkError::mismatch(format!("layer {l} weight rows"), rows, weights.rows));
            }
            if weights.cols != cols {
                return Err(NetworkError::mismatch(format!("layer {l} weight columns"), cols, weights.cols));
            }
            if biases.len() != rows {
                return Err(NetworkError::mismatch(format!("layer {l} biases"), rows, biases.len()));
            }
            layers.push(DenseLayer { weights, biases });
        }

        debug!(sizes = ?topology.sizes(), "built network from supplied parameters");
        Ok(Network {
            topology,
            layers,
            output_derivative: OutputDerivative::default(),
        })
    }

    pub fn with_output_derivative(mut self, mode: OutputDerivative) -> Network {
        self.output_derivative = mode;
        self
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn output_derivative(&self) -> OutputDerivative {
        self.output_derivative
    }

    /// Parameters feeding `layer`; `layer` must be in `1..depth`.
    pub fn layer(&self, layer: usize) -> &DenseLayer {
        &self.layers[layer - 1]
    }

    /// Computes `z` and the activations of `layer` from the previous layer's
    /// activations already recorded in `pass`.
    fn activate_layer(&self, layer: usize, pass: &mut ForwardPass) {
        let z = self.layer(layer).pre_activation(&pass.activations[layer - 1]);
        let mut activation: Vec<f64> = z.iter().map(|&z| sigmoid(z)).collect();

        if layer == self.topology.output_layer() {
            let sum: f64 = activation.iter().sum();
            for a in activation.iter_mut() {
                *a /= sum;
            }
        }
        pass.push_layer(z, activation);
    }

    /// Runs `x` through every layer. Values are expected in `[0, 1]` but are
    /// not clamped.
    pub fn propagate_forward(&self, x: &[f64]) -> Result<ForwardPass> {
        let expected = self.topology.input_size();
        if x.len() != expected {
            return Err(NetworkError::mismatch("input vector", expected, x.len()));
        }

        let mut pass = ForwardPass::from_input(x.to_vec(), self.topology.depth());
        for layer in 1..self.topology.depth() {
            self.activate_layer(layer, &mut pass);
        }
        Ok(pass)
    }

    /// Predicted class (lowest index among tied maxima) and all activations.
    pub fn guess(&self, x: &[f64]) -> Result<Guess> {
        let pass = self.propagate_forward(x)?;
        let digit = argmax(pass.output());
        Ok(Guess {
            digit,
            activations: pass.into_activations(),
        })
    }

    /// Derivatives of the squared error between the output of `pass` and the
    /// one-hot target `y`, walking from the output layer down to layer 1.
    ///
    /// Hidden layers read the bias derivatives of the layer above, which the
    /// descending loop has already finalized.
    pub fn propagate_back(&self, pass: &ForwardPass, y: &[f64]) -> Result<Gradients> {
        self.check_pass(pass)?;
        let expected = self.topology.output_size();
        if y.len() != expected {
            return Err(NetworkError::mismatch("target vector", expected, y.len()));
        }

        let depth = self.topology.depth();
        let output_layer = self.topology.output_layer();
        let mut grads = Gradients::empty(depth);

        for layer in (1..depth).rev() {
            let z = &pass.z[layer];

            let activation_grad = if layer == output_layer {
                SquaredErrorLoss::derivative(&pass.activations[layer], y)
            } else {
                self.layer(layer + 1)
                    .weights
                    .transpose_mul_vec(&grads.biases[layer + 1])
            };

            let bias_grad = if layer == output_layer {
                self.output_bias_gradient(&activation_grad, z, &pass.activations[layer])
            } else {
                activation_grad
                    .iter()
                    .zip(z)
                    .map(|(d, &z)| d * sigmoid_prime(z))
                    .collect()
            };

            grads.weights[layer] = Matrix::outer(&bias_grad, &pass.activations[layer - 1]);
            grads.activations[layer] = activation_grad;
            grads.biases[layer] = bias_grad;
        }

        Ok(grads)
    }

    /// ∂L/∂z for the normalized output layer.
    ///
    /// With `s = σ(z)`, `S = Σ s` and `a = s / S`:
    /// `∂L/∂z_i = σ'(z_i) / S · (g_i - Σ_j g_j a_j)` where `g = ∂L/∂a`.
    fn output_bias_gradient(&self, activation_grad: &[f64], z: &[f64], output: &[f64]) -> Vec<f64> {
        match self.output_derivative {
            OutputDerivative::SigmoidOnly => activation_grad
                .iter()
                .zip(z)
                .map(|(d, &z)| d * sigmoid_prime(z))
                .collect(),
            OutputDerivative::ThroughNormalization => {
                let sum: f64 = z.iter().map(|&z| sigmoid(z)).sum();
                let projected: f64 = activation_grad.iter().zip(output).map(|(g, a)| g * a).sum();
                activation_grad
                    .iter()
                    .zip(z)
                    .map(|(g, &z)| sigmoid_prime(z) / sum * (g - projected))
                    .collect()
            }
        }
    }

    /// In-place gradient-descent step: every weight and bias moves by
    /// `-derivative * learning_rate`.
    pub fn apply_gradient(&mut self, gradients: &Gradients, learning_rate: f64) -> Result<()> {
        let depth = self.topology.depth();
        if gradients.depth() != depth {
            return Err(NetworkError::mismatch("gradient layers", depth, gradients.depth()));
        }
        for l in 1..depth {
            let (rows, cols) = self.topology.weight_shape(l);
            let w = &gradients.weights[l];
            if w.rows != rows || w.cols != cols {
                return Err(NetworkError::mismatch(format!("layer {l} weight gradient"), rows * cols, w.rows * w.cols));
            }
            if gradients.biases[l].len() != rows {
                return Err(NetworkError::mismatch(format!("layer {l} bias gradient"), rows, gradients.biases[l].len()));
            }
        }

        for (i, layer) in self.layers.iter_mut().enumerate() {
            layer.apply_gradients(&gradients.weights[i + 1], &gradients.biases[i + 1], learning_rate);
        }
        Ok(())
    }

    fn check_pass(&self, pass: &ForwardPass) -> Result<()> {
        let depth = self.topology.depth();
        if pass.depth() != depth || pass.z.len() != depth {
            return Err(NetworkError::mismatch("forward pass layers", depth, pass.depth()));
        }
        for (l, &size) in self.topology.sizes().iter().enumerate() {
            if pass.activations[l].len() != size {
                return Err(NetworkError::mismatch(format!("forward pass layer {l} activations"), size, pass.activations[l].len()));
            }
            if l > 0 && pass.z[l].len() != size {
                return Err(NetworkError::mismatch(format!("forward pass layer {l} z"), size, pass.z[l].len()));
            }
        }
        Ok(())
    }

    /// Copies weights and biases into the persisted layout.
    pub fn to_parameters(&self) -> Parameters {
        let weights = std::iter::once(None)
            .chain(self.layers.iter().map(|l| Some(l.weights.clone())))
            .collect();
        let biases = std::iter::once(None)
            .chain(self.layers.iter().map(|l| Some(l.biases.clone())))
            .collect();
        Parameters { weights, biases }
    }

    /// Writes `weights.json` and `biases.json` into `dir`.
    pub fn save(&self, dir: impl AsRef<Path>) -> Result<()> {
        self.to_parameters().save(dir)
    }

    /// Loads parameters saved by [`Network::save`]; the topology is read off
    /// the tensor shapes.
    pub fn load(dir: impl AsRef<Path>) -> Result<Network> {
        let params = Parameters::load(dir)?;
        let topology = params.topology()?;
        Network::from_parameters(topology, params)
    }
}

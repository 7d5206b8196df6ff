use rand::Rng;

use crate::math::matrix::Matrix;

/// Upper bound (exclusive) of freshly initialized weights and biases.
pub const INIT_SCALE: f64 = 0.1;

/// Parameters of one computed (non-input) layer.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseLayer {
    /// `[size][input_size]`, indexed `[to][from]`.
    pub weights: Matrix,
    pub biases: Vec<f64>,
}

impl DenseLayer {
    /// Weights and biases drawn uniformly from `[low, high)`.
    pub fn uniform<R: Rng + ?Sized>(
        size: usize,
        input_size: usize,
        low: f64,
        high: f64,
        rng: &mut R,
    ) -> DenseLayer {
        let weights = Matrix::uniform(size, input_size, low, high, rng);
        let biases = (0..size).map(|_| low + rng.gen::<f64>() * (high - low)).collect();
        DenseLayer { weights, biases }
    }

    /// z = W·a_prev + b
    pub fn pre_activation(&self, input: &[f64]) -> Vec<f64> {
        self.weights
            .mul_vec(input)
            .into_iter()
            .zip(&self.biases)
            .map(|(wx, b)| wx + b)
            .collect()
    }

    /// Subtracts `grad * lr` from every weight and bias.
    pub fn apply_gradients(&mut self, weights_grad: &Matrix, biases_grad: &[f64], lr: f64) {
        self.weights.sub_scaled_assign(weights_grad, lr);
        for (b, d) in self.biases.iter_mut().zip(biases_grad) {
            *b -= d * lr;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pre_activation_adds_bias() {
        let layer = DenseLayer {
            weights: Matrix::from_data(vec![vec![0.5, 0.5], vec![1.0, -1.0]]).unwrap(),
            biases: vec![0.1, 0.2],
        };
        let z = layer.pre_activation(&[2.0, 4.0]);
        assert!((z[0] - 3.1).abs() < 1e-12);
        assert!((z[1] + 1.8).abs() < 1e-12);
    }

    #[test]
    fn apply_gradients_steps_against_gradient() {
        let mut layer = DenseLayer {
            weights: Matrix::filled(1, 2, 1.0),
            biases: vec![1.0],
        };
        layer.apply_gradients(&Matrix::filled(1, 2, 0.5), &[2.0], 0.2);
        assert_eq!(layer.weights.data, vec![vec![0.9, 0.9]]);
        assert!((layer.biases[0] - 0.6).abs() < 1e-12);
    }
}

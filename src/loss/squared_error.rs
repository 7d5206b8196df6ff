pub struct SquaredErrorLoss;

impl SquaredErrorLoss {
    /// Σ(predicted - expected)²
    pub fn loss(predicted: &[f64], expected: &[f64]) -> f64 {
        predicted.iter().zip(expected.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum()
    }

    /// Per-output gradient: 2(predicted - expected)
    pub fn derivative(predicted: &[f64], expected: &[f64]) -> Vec<f64> {
        predicted.iter().zip(expected.iter())
            .map(|(a, b)| 2.0 * (a - b))
            .collect()
    }
}

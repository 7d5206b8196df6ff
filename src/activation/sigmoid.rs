/// Logistic function `1 / (1 + e^-z)`, range (0, 1).
pub fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

/// Derivative of [`sigmoid`] evaluated at the pre-activation `z`.
pub fn sigmoid_prime(z: f64) -> f64 {
    let s = sigmoid(z);
    s * (1.0 - s)
}

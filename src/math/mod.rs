pub mod matrix;

pub use matrix::Matrix;

/// Builds a vector of `size` elements, calling `value(i)` for each index.
pub fn vector<T, F>(size: usize, value: F) -> Vec<T>
where
    F: FnMut(usize) -> T,
{
    (0..size).map(value).collect()
}

/// Index of the maximum element; ties resolve to the lowest index.
/// Returns 0 for an empty slice.
pub fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}

use thiserror::Error;

/// Errors raised at the inference, training and persistence boundaries.
///
/// The numeric core never produces these on its own; they come from the
/// shape checks performed before any arithmetic starts.
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    #[error("invalid sample #{index}: input has {input_len} values, label has {label_len} values ({reason})")]
    InvalidSampleShape {
        index: usize,
        input_len: usize,
        label_len: usize,
        reason: String,
    },

    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    #[error("dataset contains no samples")]
    EmptyDataset,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NetworkError {
    pub(crate) fn mismatch(context: impl Into<String>, expected: usize, actual: usize) -> Self {
        NetworkError::DimensionMismatch {
            context: context.into(),
            expected,
            actual,
        }
    }
}

pub type Result<T> = std::result::Result<T, NetworkError>;

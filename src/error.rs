//! Error types for the network, its layers and the dataset loader.

use thiserror::Error;

use crate::layers::dense::Phase;

/// Result type alias for this crate
pub type Result<T> = std::result::Result<T, NnError>;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum NnError {
    /// A vector or layer width does not match what the receiver expects
    #[error("dimension mismatch in {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    /// Invalid configuration value
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A layer operation was requested before its prerequisite ran
    #[error("layer {layer}: cannot {operation} while {phase:?}")]
    OutOfOrder {
        layer: usize,
        operation: &'static str,
        phase: Phase,
    },

    /// Gradient requested for an input other than the one last forwarded
    #[error("layer {layer}: gradient input differs from the input of the last forward pass")]
    StaleInput { layer: usize },

    /// Sigmoid argument rejected by the numeric policy
    #[error("numeric error: sigmoid argument {value} is out of range")]
    Numeric { value: f64 },

    /// Dataset file is malformed or inconsistent with the configuration
    #[error("dataset error: {0}")]
    Dataset(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl NnError {
    pub(crate) fn dimension(context: impl Into<String>, expected: usize, actual: usize) -> Self {
        NnError::DimensionMismatch {
            context: context.into(),
            expected,
            actual,
        }
    }
}

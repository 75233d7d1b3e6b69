//! Error types shared by the input collector and the model layer

use thiserror::Error;

/// Rejected sidebar input. No evaluation runs for a rejected record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("{field} is not a number: {value:?}")]
    NotANumber { field: &'static str, value: String },

    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    #[error("{field} must be at least {min}, got {value}")]
    BelowMinimum {
        field: &'static str,
        min: f64,
        value: f64,
    },
}

/// Failure inside the predictor, its preprocessing step or the explainer.
///
/// Aborts the evaluation of the current trigger.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid label {0}, expected 0 or 1")]
    InvalidLabel(i64),

    #[error("feature dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("malformed model output: {0}")]
    MalformedOutput(String),

    #[error("inference backend error: {0}")]
    Backend(String),
}

//! Error taxonomy for field construction and regression queries.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    /// Invalid model or dataset input, or an attempt to rebind a dataset.
    #[error("construction error: {0}")]
    Construction(String),

    /// Coefficient vector length does not match the model.
    #[error("dimension mismatch: expected {expected} coefficients, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("dataset has no samples")]
    EmptyDataset,

    /// A monomial or integral evaluated to a non-finite value.
    #[error("numeric overflow: {0}")]
    NumericOverflow(String),
}

pub type Result<T> = std::result::Result<T, FieldError>;

pub(crate) fn construction(message: impl Into<String>) -> FieldError {
    FieldError::Construction(message.into())
}

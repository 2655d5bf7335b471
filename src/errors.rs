//! Errors returned by the classifier and its collaborators.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BRkNNError {
    /// Invalid configuration or training data.
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("query has {found} features, expected {expected}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("k must be at least 1, got {0}")]
    InvalidK(usize),

    #[error("example index {index} out of bounds for {len} training examples")]
    IndexOutOfBounds { index: usize, len: usize },

    /// The cardinality policy was asked for more tied labels than exist.
    #[error("numeric degeneracy: {0}")]
    NumericDegeneracy(String),

    /// Selecting k by leave-one-out failed; no k was published.
    #[error("couldn't optimize k by cross-validation: {0}")]
    CrossValidation(#[source] Box<BRkNNError>),
}

pub type Result<T> = std::result::Result<T, BRkNNError>;

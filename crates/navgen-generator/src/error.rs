//! Error types for benchmark generation.

use std::num::ParseIntError;

use navgen_core::{FormulaError, ModelError};
use thiserror::Error;

/// Result type alias for generator operations.
pub type GeneratorResult<T> = Result<T, GeneratorError>;

/// Errors that can occur while generating a model.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// A parameter is structurally invalid.
    #[error("invalid parameter: {message}")]
    InvalidParameter { message: String },

    /// A grid token is neither a letter sentinel nor an integer.
    #[error("i_list token '{token}' is not an integer: {source}")]
    ParseError {
        token: String,
        #[source]
        source: ParseIntError,
    },

    /// A generated formula was rejected by the expression parser.
    #[error("formula error: {0}")]
    Formula(#[from] FormulaError),

    /// The automaton library rejected an operation.
    #[error("model error: {0}")]
    Model(#[from] ModelError),

    /// Configuration (de)serialization error.
    #[error("config serialization error: {0}")]
    ConfigSerialization(#[from] serde_json::Error),
}

impl GeneratorError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        GeneratorError::InvalidParameter {
            message: message.into(),
        }
    }
}

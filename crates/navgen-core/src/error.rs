//! Error types for the hybrid automaton model.

use thiserror::Error;

use crate::component::ModeId;

/// Result type alias for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Result type alias for formula parsing.
pub type FormulaResult<T> = Result<T, FormulaError>;

/// Errors that can occur while building or checking an automaton.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// A mode with this name already exists in the component.
    #[error("duplicate mode name: {name}")]
    DuplicateMode { name: String },

    /// A mode referenced by name was not found.
    #[error("unknown mode: {name}")]
    UnknownMode { name: String },

    /// A mode referenced by id was not found.
    #[error("mode id out of range: {id:?}")]
    ModeOutOfRange { id: ModeId },

    /// Interval bounds are reversed or not finite.
    #[error("invalid interval [{min}, {max}]")]
    InvalidInterval { min: f64, max: f64 },

    /// An expression refers to a variable the component never declared.
    #[error("undeclared variable '{variable}' in {context}")]
    UndeclaredVariable { variable: String, context: String },

    /// A mode has no flow for a declared variable.
    #[error("mode {mode} has no flow for variable '{variable}'")]
    MissingFlow { mode: String, variable: String },

    /// The configuration has no initial states.
    #[error("configuration has no initial states")]
    NoInitialStates,

    /// Expression evaluation failed.
    #[error("cannot evaluate expression: {message}")]
    Evaluation { message: String },
}

/// Error raised by the infix formula parser.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("formula parse error at offset {offset} in '{input}': {message}")]
pub struct FormulaError {
    /// The text being parsed.
    pub input: String,
    /// Byte offset of the offending token.
    pub offset: usize,
    /// What went wrong.
    pub message: String,
}

impl FormulaError {
    pub(crate) fn new(input: &str, offset: usize, message: impl Into<String>) -> Self {
        Self {
            input: input.to_string(),
            offset,
            message: message.into(),
        }
    }
}

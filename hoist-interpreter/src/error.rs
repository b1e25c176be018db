//! Error types for the interpreter

use thiserror::Error;

/// Result type for interpreter operations
pub type InterpreterResult<T> = Result<T, InterpreterError>;

/// Errors that can occur during interpretation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterpreterError {
    /// Variable not declared in the current function or globally
    #[error("Name error: {0}")]
    NameError(String),

    /// Operand or condition of the wrong kind
    #[error("Type error: {0}")]
    TypeError(String),

    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("Arity error: '{function}' expects {expected} arguments, got {actual}")]
    ArityError {
        function: String,
        expected: usize,
        actual: usize,
    },

    #[error("Stack overflow: maximum call depth of {0} exceeded")]
    StackOverflow(usize),

    /// The configured statement budget ran out
    #[error("Step limit of {0} statements exceeded")]
    StepLimitExceeded(u64),

    /// The evaluation thread could not be started
    #[error("Failed to start interpreter thread: {0}")]
    ThreadSpawn(String),
}

//! Hoist reference interpreter
//!
//! A direct tree-walking evaluator for [`hoist_core::Program`]. It records
//! every printed value and the entry function's return value, which is what
//! two programs must agree on to be considered equivalent.

pub mod environment;
pub mod error;
pub mod interpreter;
pub mod value;

pub use environment::{Environment, Frame};
pub use error::{InterpreterError, InterpreterResult};
pub use interpreter::{Execution, Interpreter, InterpreterOptions};
pub use value::Value;

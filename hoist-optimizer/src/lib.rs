//! Hoist optimization framework
//!
//! This crate moves recomputation of invariant subexpressions out of the
//! places where it repeats. The main pass is the [`Hoister`], which walks
//! every function body, extracts expressions whose inputs are not modified
//! into fresh temporaries, and moves the ones found inside `while` bodies in
//! front of the loop.

#![warn(missing_docs)]

pub mod passes;
pub mod pipeline;
pub mod scope;
pub mod stats;

pub use passes::hoisting::Hoister;
pub use passes::OptimizationPass;
pub use pipeline::{OptimizationConfig, OptimizationLevel, OptimizationPipeline};
pub use scope::{Extraction, ExtractionKind};
pub use stats::OptimizationStats;

use hoist_core::Program;

/// Optimize `program` in place with the standard configuration
///
/// The program is validated first; a malformed tree is reported as
/// [`hoist_core::Error::Shape`] and left untouched.
pub fn optimize(program: &mut Program) -> hoist_core::Result<&mut Program> {
    Hoister::new().optimize(program)
}

//! Individual optimization passes

pub mod hoisting;

use crate::stats::OptimizationStats;
use anyhow::Result;
use hoist_core::Program;

/// Trait for optimization passes
pub trait OptimizationPass: Send + Sync {
    /// Name of the optimization pass
    fn name(&self) -> &str;

    /// Run the optimization pass, rewriting the program in place
    fn run(&mut self, program: &mut Program) -> Result<()>;

    /// Check if the pass is applicable
    fn is_applicable(&self, program: &Program) -> bool {
        !program.functions.is_empty()
    }

    /// Get statistics about the pass
    fn stats(&self) -> String {
        format!("{} pass completed", self.name())
    }

    /// Add the counters of the last run to `stats`
    fn merge_stats(&self, _stats: &mut OptimizationStats) {}
}

#[cfg(test)]
#[path = "passes_tests.rs"]
mod passes_tests;

//! Optimization statistics

use serde::Serialize;
use std::fmt;

/// Counters collected while optimizing one program
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OptimizationStats {
    /// Bodies walked, nested ones included
    pub bodies_visited: usize,
    /// Whole statement expressions replaced by a temporary
    pub full_extractions: usize,
    /// Invariant operands replaced inside a non-invariant expression
    pub partial_extractions: usize,
    /// Extractions moved in front of a `while`
    pub loop_hoists: usize,
    /// Statement count before optimization, nested statements included
    pub statements_before: usize,
    /// Statement count after optimization
    pub statements_after: usize,
    /// Wall-clock time of the whole pipeline
    pub optimization_time_us: u64,
}

impl OptimizationStats {
    /// Create empty statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the pass counters of `other`; sizes and timing are left alone
    /// since the pipeline measures those itself.
    pub fn merge(&mut self, other: &OptimizationStats) {
        self.bodies_visited += other.bodies_visited;
        self.full_extractions += other.full_extractions;
        self.partial_extractions += other.partial_extractions;
        self.loop_hoists += other.loop_hoists;
    }

    /// Number of temporaries introduced
    pub fn total_extractions(&self) -> usize {
        self.full_extractions + self.partial_extractions
    }
}

impl fmt::Display for OptimizationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Optimization Statistics:")?;
        writeln!(f, "  Bodies visited: {}", self.bodies_visited)?;
        writeln!(
            f,
            "  Extractions: {} full, {} partial",
            self.full_extractions, self.partial_extractions
        )?;
        writeln!(f, "  Hoisted out of loops: {}", self.loop_hoists)?;
        writeln!(
            f,
            "  Statements: {} -> {}",
            self.statements_before, self.statements_after
        )?;
        write!(f, "  Time: {}us", self.optimization_time_us)
    }
}

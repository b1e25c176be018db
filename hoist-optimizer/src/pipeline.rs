//! Optimization pipeline management

use crate::passes::hoisting::Hoister;
use crate::passes::OptimizationPass;
use crate::stats::OptimizationStats;
use anyhow::Result;
use hoist_core::Program;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

/// Default prefix of temporaries holding a whole statement expression
pub const DEFAULT_HOISTED_PREFIX: &str = "__hoisted_";
/// Default prefix of temporaries holding an invariant operand
pub const DEFAULT_PARTIAL_PREFIX: &str = "__partial_";

/// Optimization level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationLevel {
    /// No optimizations
    None,
    /// Whole invariant statement expressions only (O1)
    Basic,
    /// Whole and partial extraction (O2)
    Standard,
}

/// Optimization configuration
///
/// Missing fields fall back to the [`Default`] configuration when loaded
/// through serde.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizationConfig {
    /// Optimization level
    pub level: OptimizationLevel,
    /// Replace fully invariant statement expressions with temporaries
    pub statement_extraction: bool,
    /// Replace invariant compound operands of varying expressions
    pub partial_extraction: bool,
    /// Move extractions found in a `while` body in front of the loop.
    /// When off they stay at the top of the loop body.
    pub loop_hoisting: bool,
    /// Prefix of full-extraction temporaries
    pub hoisted_prefix: String,
    /// Prefix of partial-extraction temporaries
    pub partial_prefix: String,
}

impl OptimizationConfig {
    /// Create config for optimization level
    pub fn for_level(level: OptimizationLevel) -> Self {
        let (statement_extraction, partial_extraction, loop_hoisting) = match level {
            OptimizationLevel::None => (false, false, false),
            OptimizationLevel::Basic => (true, false, true),
            OptimizationLevel::Standard => (true, true, true),
        };
        Self {
            level,
            statement_extraction,
            partial_extraction,
            loop_hoisting,
            hoisted_prefix: DEFAULT_HOISTED_PREFIX.to_string(),
            partial_prefix: DEFAULT_PARTIAL_PREFIX.to_string(),
        }
    }

    /// Whether any pass would change a program under this config
    pub fn is_enabled(&self) -> bool {
        self.level != OptimizationLevel::None
            && (self.statement_extraction || self.partial_extraction)
    }
}

impl Default for OptimizationConfig {
    fn default() -> Self {
        Self::for_level(OptimizationLevel::Standard)
    }
}

/// Optimization pipeline
pub struct OptimizationPipeline {
    config: OptimizationConfig,
    stats: OptimizationStats,
    passes: Vec<Box<dyn OptimizationPass>>,
}

impl OptimizationPipeline {
    /// Create new optimization pipeline
    pub fn new(config: OptimizationConfig) -> Self {
        let mut pipeline = Self {
            config,
            stats: OptimizationStats::new(),
            passes: Vec::new(),
        };
        pipeline.configure_passes();
        pipeline
    }

    /// Configure passes based on config
    fn configure_passes(&mut self) {
        self.passes.clear();

        if self.config.is_enabled() {
            self.passes
                .push(Box::new(Hoister::with_config(self.config.clone())));
        }
    }

    /// Run every applicable pass over a copy of `program`
    pub fn optimize(&mut self, program: &Program) -> Result<Program> {
        let start = Instant::now();
        self.stats = OptimizationStats::new();

        program.validate()?;
        self.stats.statements_before = count_statements(program);

        let mut optimized = program.clone();
        for pass in &mut self.passes {
            if !pass.is_applicable(&optimized) {
                debug!(pass = pass.name(), "skipping pass");
                continue;
            }
            pass.run(&mut optimized)?;
            pass.merge_stats(&mut self.stats);
            debug!(pass = pass.name(), summary = %pass.stats(), "pass finished");
        }

        self.stats.statements_after = count_statements(&optimized);
        self.stats.optimization_time_us = start.elapsed().as_micros() as u64;

        Ok(optimized)
    }

    /// Get optimization statistics
    pub fn stats(&self) -> &OptimizationStats {
        &self.stats
    }

    /// Names of the configured passes, in run order
    pub fn pass_names(&self) -> Vec<&str> {
        self.passes.iter().map(|pass| pass.name()).collect()
    }

    /// Add custom pass
    pub fn add_pass(&mut self, pass: Box<dyn OptimizationPass>) {
        self.passes.push(pass);
    }

    /// Remove all passes
    pub fn clear_passes(&mut self) {
        self.passes.clear();
    }
}

impl Default for OptimizationPipeline {
    fn default() -> Self {
        Self::new(OptimizationConfig::default())
    }
}

fn count_statements(program: &Program) -> usize {
    program
        .functions
        .iter()
        .map(|function| function.body.statement_count())
        .sum()
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod pipeline_tests;

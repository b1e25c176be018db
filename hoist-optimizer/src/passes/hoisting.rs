//! Invariant expression extraction and loop hoisting
//!
//! Every function body is walked statement by statement while a modified-set
//! records the names assigned so far. An expression that reads only
//! unmodified names is invariant: it yields the same value wherever it is
//! evaluated between the top of its body and its statement, so it can be
//! computed once into a temporary at the top of that body.
//!
//! A `while` body starts with every name it assigns already marked modified,
//! since any assignment inside the loop is visible on the next iteration.
//! What stays invariant under that set is loop-invariant and is moved in
//! front of the loop. `if` branches keep their extractions at their own top.
//!
//! Conditions are never rewritten, and comparisons are never stored in a
//! temporary; where a whole comparison would be extracted its compound
//! operands are extracted instead.

use crate::passes::OptimizationPass;
use crate::pipeline::OptimizationConfig;
use crate::scope::{Extraction, ExtractionKind, HoistScope, NameGenerator};
use crate::stats::OptimizationStats;
use anyhow::Result;
use hoist_core::{Body, Expr, Program, Statement, Unparser};
use rustc_hash::FxHashSet;
use tracing::{debug, trace};

/// What owns a body, which decides where its extractions end up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Function,
    Branch,
    Loop,
}

/// Invariant expression extraction pass
pub struct Hoister {
    config: OptimizationConfig,
    scope: HoistScope,
    enclosing: Vec<HoistScope>,
    names: NameGenerator,
    stats: OptimizationStats,
}

impl Hoister {
    /// Create a hoister with the standard configuration
    pub fn new() -> Self {
        Self::with_config(OptimizationConfig::default())
    }

    /// Create a hoister with an explicit configuration
    pub fn with_config(config: OptimizationConfig) -> Self {
        Self {
            config,
            scope: HoistScope::default(),
            enclosing: Vec::new(),
            names: NameGenerator::default(),
            stats: OptimizationStats::new(),
        }
    }

    /// Optimize every function body of `program` in place
    ///
    /// Fails only when the program does not pass [`Program::validate`].
    pub fn optimize<'p>(&mut self, program: &'p mut Program) -> hoist_core::Result<&'p mut Program> {
        program.validate()?;

        self.stats = OptimizationStats::new();
        self.names = NameGenerator::new(
            program.identifiers(),
            &self.config.hoisted_prefix,
            &self.config.partial_prefix,
        );

        for function in &mut program.functions {
            debug!(function = %function.name, "hoisting function body");
            self.optimize_body(&mut function.body, BodyKind::Function);
        }

        debug!(
            full = self.stats.full_extractions,
            partial = self.stats.partial_extractions,
            hoisted = self.stats.loop_hoists,
            "hoisting finished"
        );
        Ok(program)
    }

    /// Counters of the last run
    pub fn stats(&self) -> &OptimizationStats {
        &self.stats
    }

    /// Walk one body in a fresh scope. Returns the extractions that must be
    /// placed in front of the owning loop; everything else is installed at
    /// the top of `body` itself.
    fn optimize_body(&mut self, body: &mut Body, kind: BodyKind) -> Vec<Extraction> {
        let seed = match kind {
            BodyKind::Loop => body.assigned_names(),
            BodyKind::Function | BodyKind::Branch => FxHashSet::default(),
        };
        self.enter_scope(HoistScope::new(seed));
        self.stats.bodies_visited += 1;

        let statements = std::mem::take(&mut body.statements);
        let mut rebuilt = Vec::with_capacity(statements.len());

        for mut statement in statements {
            match &mut statement {
                Statement::Assign { target, expr } => {
                    self.reduce_argument(expr);
                    self.scope.mark_modified(target.as_str());
                }
                Statement::Print(expr) | Statement::Return(Some(expr)) => {
                    self.reduce_argument(expr);
                }
                Statement::Return(None) => {}
                Statement::If {
                    then_body,
                    else_body,
                    ..
                } => {
                    self.optimize_body(then_body, BodyKind::Branch);
                    self.scope.mark_all_modified(then_body.assigned_names());
                    if let Some(else_body) = else_body {
                        self.optimize_body(else_body, BodyKind::Branch);
                        self.scope.mark_all_modified(else_body.assigned_names());
                    }
                }
                Statement::While {
                    body: loop_body, ..
                } => {
                    let hoisted = self.optimize_body(loop_body, BodyKind::Loop);
                    self.scope.mark_all_modified(loop_body.assigned_names());
                    self.stats.loop_hoists += hoisted.len();
                    for extraction in hoisted {
                        let (decl, assign) = extraction.into_parts();
                        body.declarations.push(decl);
                        rebuilt.push(assign);
                    }
                }
            }
            rebuilt.push(statement);
        }
        body.statements = rebuilt;

        let extractions = self.exit_scope().into_extractions();
        if kind == BodyKind::Loop && self.config.loop_hoisting {
            return extractions;
        }
        install_at_top(body, extractions);
        Vec::new()
    }

    fn enter_scope(&mut self, scope: HoistScope) {
        let outer = std::mem::replace(&mut self.scope, scope);
        self.enclosing.push(outer);
    }

    fn exit_scope(&mut self) -> HoistScope {
        let outer = self.enclosing.pop().unwrap_or_default();
        std::mem::replace(&mut self.scope, outer)
    }

    /// Reduce the argument of an assignment, `print` or `return`, and
    /// extract it whole when nothing it reads has been modified
    fn reduce_argument(&mut self, expr: &mut Expr) {
        let invariant = self.reduce(expr);
        if invariant && self.config.statement_extraction && expr.is_compound() {
            self.extract(expr, ExtractionKind::Full);
        }
    }

    /// Report whether `expr` is invariant, extracting invariant compound
    /// operands of nodes that are not
    fn reduce(&mut self, expr: &mut Expr) -> bool {
        match expr {
            Expr::Int(_) | Expr::Bool(_) => true,
            Expr::Variable(name) => !self.scope.is_modified(name),
            Expr::Binary { left, right, .. } => {
                let left_invariant = self.reduce(left);
                let right_invariant = self.reduce(right);
                match (left_invariant, right_invariant) {
                    (true, true) => true,
                    (true, false) => {
                        self.extract_partial(left);
                        false
                    }
                    (false, true) => {
                        self.extract_partial(right);
                        false
                    }
                    (false, false) => false,
                }
            }
            Expr::Call { args, .. } => {
                let invariant: Vec<bool> = args.iter_mut().map(|arg| self.reduce(arg)).collect();
                if invariant.iter().all(|&flag| flag) {
                    return true;
                }
                for (arg, arg_invariant) in args.iter_mut().zip(invariant) {
                    if arg_invariant {
                        self.extract_partial(arg);
                    }
                }
                false
            }
        }
    }

    fn extract_partial(&mut self, expr: &mut Expr) {
        if self.config.partial_extraction && expr.is_compound() {
            self.extract(expr, ExtractionKind::Partial);
        }
    }

    /// Replace `expr` with a fresh temporary and record the original
    fn extract(&mut self, expr: &mut Expr, kind: ExtractionKind) {
        if expr.is_comparison() {
            if let Expr::Binary { left, right, .. } = expr {
                for operand in [left, right] {
                    if operand.is_compound() {
                        self.extract(operand, kind);
                    }
                }
            }
            return;
        }

        let name = self.names.fresh(kind);
        let original = std::mem::replace(expr, Expr::Variable(name.clone()));
        trace!(
            temp = %name,
            expr = %Unparser::render_expr(&original),
            ?kind,
            "extracted invariant expression"
        );
        match kind {
            ExtractionKind::Full => self.stats.full_extractions += 1,
            ExtractionKind::Partial => self.stats.partial_extractions += 1,
        }
        self.scope.push(Extraction {
            name,
            expr: original,
            kind,
        });
    }
}

impl Default for Hoister {
    fn default() -> Self {
        Self::new()
    }
}

/// Prepend the declarations and assignments of `extractions` to `body`,
/// keeping their discovery order
fn install_at_top(body: &mut Body, extractions: Vec<Extraction>) {
    if extractions.is_empty() {
        return;
    }
    let (mut declarations, mut statements): (Vec<_>, Vec<_>) = extractions
        .into_iter()
        .map(Extraction::into_parts)
        .unzip();
    declarations.append(&mut body.declarations);
    statements.append(&mut body.statements);
    body.declarations = declarations;
    body.statements = statements;
}

impl OptimizationPass for Hoister {
    fn name(&self) -> &str {
        "Invariant Hoisting"
    }

    fn run(&mut self, program: &mut Program) -> Result<()> {
        self.optimize(program)?;
        Ok(())
    }

    fn is_applicable(&self, program: &Program) -> bool {
        program
            .functions
            .iter()
            .any(|function| !function.body.statements.is_empty())
    }

    fn stats(&self) -> String {
        format!(
            "{} pass: {} full and {} partial extractions, {} hoisted out of loops",
            self.name(),
            self.stats.full_extractions,
            self.stats.partial_extractions,
            self.stats.loop_hoists
        )
    }

    fn merge_stats(&self, stats: &mut OptimizationStats) {
        stats.merge(&self.stats);
    }
}

#[cfg(test)]
#[path = "hoisting_tests.rs"]
mod tests;

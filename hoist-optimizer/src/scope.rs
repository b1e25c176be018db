//! Per-body bookkeeping for the hoister
//!
//! A [`HoistScope`] lives for the walk of exactly one body. It records which
//! names have been assigned so far (the modified-set) and which expressions
//! were pulled out into temporaries. Temporary names come from a
//! [`NameGenerator`] shared by the whole run.

use hoist_core::{Expr, Statement, VarDecl};
use rustc_hash::FxHashSet;

/// Which rule produced an extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractionKind {
    /// The whole argument of a statement was invariant
    Full,
    /// An invariant operand of an otherwise varying expression
    Partial,
}

/// An expression moved out into a fresh temporary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Name of the temporary now referenced where the expression was
    pub name: String,
    /// The original expression
    pub expr: Expr,
    /// Rule that produced it
    pub kind: ExtractionKind,
}

impl Extraction {
    /// The `int` declaration and the assignment that materialize this
    /// temporary
    pub fn into_parts(self) -> (VarDecl, Statement) {
        (VarDecl::int(self.name.clone()), Statement::assign(self.name, self.expr))
    }
}

/// State of one body being optimized
#[derive(Debug, Clone, Default)]
pub(crate) struct HoistScope {
    modified: FxHashSet<String>,
    extractions: Vec<Extraction>,
}

impl HoistScope {
    /// Open a scope whose modified-set starts as `modified`
    pub(crate) fn new(modified: FxHashSet<String>) -> Self {
        Self {
            modified,
            extractions: Vec::new(),
        }
    }

    pub(crate) fn is_modified(&self, name: &str) -> bool {
        self.modified.contains(name)
    }

    pub(crate) fn mark_modified(&mut self, name: impl Into<String>) {
        self.modified.insert(name.into());
    }

    pub(crate) fn mark_all_modified(&mut self, names: impl IntoIterator<Item = String>) {
        self.modified.extend(names);
    }

    pub(crate) fn push(&mut self, extraction: Extraction) {
        self.extractions.push(extraction);
    }

    /// Extractions in discovery order
    pub(crate) fn into_extractions(self) -> Vec<Extraction> {
        self.extractions
    }
}

/// Hands out temporary names that clash with nothing in the program
#[derive(Debug, Clone, Default)]
pub(crate) struct NameGenerator {
    taken: FxHashSet<String>,
    full_prefix: String,
    partial_prefix: String,
    next_full: usize,
    next_partial: usize,
}

impl NameGenerator {
    /// `taken` holds every identifier already in use
    pub(crate) fn new(taken: FxHashSet<String>, full_prefix: &str, partial_prefix: &str) -> Self {
        Self {
            taken,
            full_prefix: full_prefix.to_string(),
            partial_prefix: partial_prefix.to_string(),
            next_full: 0,
            next_partial: 0,
        }
    }

    pub(crate) fn fresh(&mut self, kind: ExtractionKind) -> String {
        loop {
            let candidate = match kind {
                ExtractionKind::Full => {
                    self.next_full += 1;
                    format!("{}{}", self.full_prefix, self.next_full - 1)
                }
                ExtractionKind::Partial => {
                    self.next_partial += 1;
                    format!("{}{}", self.partial_prefix, self.next_partial - 1)
                }
            };
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_names_use_separate_counters() {
        let mut names = NameGenerator::new(FxHashSet::default(), "__hoisted_", "__partial_");
        assert_eq!(names.fresh(ExtractionKind::Full), "__hoisted_0");
        assert_eq!(names.fresh(ExtractionKind::Partial), "__partial_0");
        assert_eq!(names.fresh(ExtractionKind::Full), "__hoisted_1");
        assert_eq!(names.fresh(ExtractionKind::Partial), "__partial_1");
    }

    #[test]
    fn test_fresh_names_skip_existing_identifiers() {
        let taken = ["t0", "t2"].iter().map(|s| s.to_string()).collect();
        let mut names = NameGenerator::new(taken, "t", "t");
        assert_eq!(names.fresh(ExtractionKind::Full), "t1");
        assert_eq!(names.fresh(ExtractionKind::Full), "t3");
        // Same prefix for both kinds still never repeats a name
        assert_eq!(names.fresh(ExtractionKind::Partial), "t4");
    }

    #[test]
    fn test_scope_modified_set() {
        let seed = ["x".to_string()].into_iter().collect();
        let mut scope = HoistScope::new(seed);
        assert!(scope.is_modified("x"));
        assert!(!scope.is_modified("y"));
        scope.mark_modified("y");
        scope.mark_all_modified(vec!["z".to_string()]);
        assert!(scope.is_modified("y"));
        assert!(scope.is_modified("z"));
    }

    #[test]
    fn test_extraction_into_parts() {
        let extraction = Extraction {
            name: "__hoisted_0".to_string(),
            expr: Expr::binary(hoist_core::BinOp::Add, Expr::var("a"), Expr::var("b")),
            kind: ExtractionKind::Full,
        };
        let (decl, assign) = extraction.into_parts();
        assert_eq!(decl, VarDecl::int("__hoisted_0"));
        assert_eq!(
            assign,
            Statement::assign(
                "__hoisted_0",
                Expr::binary(hoist_core::BinOp::Add, Expr::var("a"), Expr::var("b"))
            )
        );
    }
}

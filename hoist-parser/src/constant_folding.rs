//! Build-time folding of literal-only arithmetic

use hoist_core::ast::{BinOp, Expr};
use tracing::trace;

/// Combine two operands, evaluating the operation when both are integer
/// literals and the result is exact.
///
/// Overflow leaves the node unfolded. Division folds only when the divisor
/// is non-zero and divides exactly; other quotients are real-valued and stay
/// in the tree for the evaluator. Comparisons are never folded.
pub fn fold_binary(op: BinOp, left: Expr, right: Expr) -> Expr {
    if let (Expr::Int(a), Expr::Int(b)) = (&left, &right) {
        if let Some(value) = evaluate(op, *a, *b) {
            trace!("folded {} {} {} to {}", a, op, b, value);
            return Expr::Int(value);
        }
    }
    Expr::binary(op, left, right)
}

fn evaluate(op: BinOp, a: i64, b: i64) -> Option<i64> {
    match op {
        BinOp::Add => a.checked_add(b),
        BinOp::Sub => a.checked_sub(b),
        BinOp::Mul => a.checked_mul(b),
        BinOp::Div => match a.checked_rem(b) {
            Some(0) => a.checked_div(b),
            _ => None,
        },
        BinOp::Less => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folds_integer_arithmetic() {
        assert_eq!(fold_binary(BinOp::Add, Expr::int(2), Expr::int(3)), Expr::int(5));
        assert_eq!(fold_binary(BinOp::Sub, Expr::int(2), Expr::int(3)), Expr::int(-1));
        assert_eq!(fold_binary(BinOp::Mul, Expr::int(4), Expr::int(3)), Expr::int(12));
        assert_eq!(fold_binary(BinOp::Div, Expr::int(12), Expr::int(4)), Expr::int(3));
    }

    #[test]
    fn test_inexact_division_is_kept() {
        assert_eq!(
            fold_binary(BinOp::Div, Expr::int(7), Expr::int(2)),
            Expr::binary(BinOp::Div, Expr::int(7), Expr::int(2))
        );
        assert_eq!(
            fold_binary(BinOp::Div, Expr::int(7), Expr::int(0)),
            Expr::binary(BinOp::Div, Expr::int(7), Expr::int(0))
        );
    }

    #[test]
    fn test_overflow_is_kept() {
        let folded = fold_binary(BinOp::Add, Expr::int(i64::MAX), Expr::int(1));
        assert!(matches!(folded, Expr::Binary { op: BinOp::Add, .. }));
        let folded = fold_binary(BinOp::Div, Expr::int(i64::MIN), Expr::int(-1));
        assert!(matches!(folded, Expr::Binary { op: BinOp::Div, .. }));
    }

    #[test]
    fn test_non_literals_are_not_folded() {
        let folded = fold_binary(BinOp::Add, Expr::var("a"), Expr::int(1));
        assert_eq!(folded, Expr::binary(BinOp::Add, Expr::var("a"), Expr::int(1)));
        let folded = fold_binary(BinOp::Add, Expr::Bool(true), Expr::int(1));
        assert!(matches!(folded, Expr::Binary { .. }));
        let folded = fold_binary(BinOp::Less, Expr::int(1), Expr::int(2));
        assert!(matches!(folded, Expr::Binary { op: BinOp::Less, .. }));
    }
}

//! Cell invariants.

use navgen_core::{Expression, Operator};

use crate::dynamics::{X, Y};

/// Invariant confining a mode to unit cell `(x, y)` of a `width` x `height`
/// grid.
///
/// Sides on the outer grid boundary are left open, so the leftmost column
/// has no lower bound on `x`, the top row no upper bound on `y`, and so on.
pub fn cell_invariant(x: usize, y: usize, width: usize, height: usize) -> Expression {
    let (fx, fy) = (x as f64, y as f64);
    let mut inv = Expression::TRUE;

    if x != 0 {
        inv = Expression::and(inv, Expression::compare(X, Operator::GreaterEqual, fx));
    }
    if x != width - 1 {
        inv = Expression::and(inv, Expression::compare(X, Operator::LessEqual, fx + 1.0));
    }
    if y != 0 {
        inv = Expression::and(inv, Expression::compare(Y, Operator::GreaterEqual, fy));
    }
    if y != height - 1 {
        inv = Expression::and(inv, Expression::compare(Y, Operator::LessEqual, fy + 1.0));
    }

    inv
}

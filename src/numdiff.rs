//! Numerical differentiation over manifold retractions.
//!
//! The Jacobian of a vector-valued function of one manifold variable is built
//! column by column: each local degree of freedom is perturbed through the
//! variable's retraction and the function re-evaluated on both sides of the
//! operating point (central difference). Pose variables therefore get
//! 6 columns via the SE(3) exponential map, vector-valued variables get raw
//! coordinate columns.
//!
//! The function under differentiation is expected to be pure; any fallback
//! values it produces (such as a factor's degenerate-projection residual) are
//! consumed as data by the differencing formula.

use crate::manifold::Manifold;
use nalgebra::{DMatrix, DVector};

/// Default perturbation step for central differences.
pub const DEFAULT_STEP: f64 = 1e-5;

/// Central-difference Jacobian of `f` at `x` with the default step.
///
/// Returns a matrix with one row per residual component and one column per
/// local degree of freedom of `x`. Costs `2 * x.dof() + 1` evaluations of
/// `f` (one at the operating point to size the result).
pub fn jacobian<M, F>(f: F, x: &M) -> DMatrix<f64>
where
    M: Manifold,
    F: Fn(&M) -> DVector<f64>,
{
    jacobian_with_step(f, x, DEFAULT_STEP)
}

/// Central-difference Jacobian of `f` at `x` with an explicit step size.
pub fn jacobian_with_step<M, F>(f: F, x: &M, step: f64) -> DMatrix<f64>
where
    M: Manifold,
    F: Fn(&M) -> DVector<f64>,
{
    let dof = x.dof();
    let rows = f(x).len();
    let mut result = DMatrix::zeros(rows, dof);
    let mut delta = DVector::zeros(dof);
    for col in 0..dof {
        delta[col] = step;
        let plus = f(&x.retract(&delta));
        delta[col] = -step;
        let minus = f(&x.retract(&delta));
        delta[col] = 0.0;
        result.set_column(col, &((plus - minus) / (2.0 * step)));
    }
    result
}

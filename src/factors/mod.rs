//! Factor types for the factor graph.
//!
//! A factor binds variable identifiers, a measurement, and fixed parameters
//! together and exposes residual/Jacobian evaluation to an external
//! optimizer. The [`Factor`] trait is the graph-facing interface: values
//! arrive as flat dynamic vectors keyed by position, and the linearization
//! comes back as a residual vector plus one optional Jacobian per variable
//! (rows = residual dimension, columns = the variable's local degrees of
//! freedom).

use crate::error::Result;
use nalgebra::{DMatrix, DVector};
use std::any::Any;
use std::fmt;

mod invdepth;

pub use invdepth::{InverseDepthFactor, TwoViewInverseDepthFactor};

/// Opaque variable identifier used by the graph framework.
pub type Key = usize;

/// Residual and per-variable Jacobians at a linearization point.
#[derive(Debug, Clone)]
pub struct Linearization {
    /// Residual vector at the operating point
    pub residual: DVector<f64>,
    /// One entry per connected variable, `Some` only where requested
    pub jacobians: Vec<Option<DMatrix<f64>>>,
}

/// Graph-facing interface for factors.
///
/// Implementations are immutable value objects: evaluation is a pure function
/// of the supplied variable values, and factors are safe to evaluate from
/// multiple threads concurrently.
pub trait Factor: fmt::Debug + Send + Sync {
    /// The keys of the variables this factor connects, in parameter order.
    fn keys(&self) -> &[Key];

    /// Dimension of the residual vector.
    fn dim(&self) -> usize;

    /// Evaluate the residual and the requested Jacobians.
    ///
    /// `params` supplies one flat value per key (poses as 7-vectors
    /// `[qx, qy, qz, qw, tx, ty, tz]`, landmarks as `[theta, phi, rho]`);
    /// `requested` flags, per variable, whether its Jacobian is wanted.
    /// Unrequested Jacobians are skipped entirely.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidInput`] when `params` or `requested`
    /// do not match the factor's variable count or dimensions.
    fn linearize(&self, params: &[DVector<f64>], requested: &[bool]) -> Result<Linearization>;

    /// Human-readable description for graph introspection.
    fn describe(&self, name: &str) -> String;

    /// Structural comparison within a numeric tolerance.
    ///
    /// Two factors compare equal when they are the same variant and their
    /// keys, measurement, and calibration agree within `tolerance`.
    fn equals(&self, other: &dyn Factor, tolerance: f64) -> bool;

    /// Downcast support for [`Factor::equals`].
    fn as_any(&self) -> &dyn Any;
}

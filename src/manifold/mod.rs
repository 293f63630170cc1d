//! Manifold representations for tangent-space perturbations.
//!
//! This module provides the rotation and rigid-body transform types used by
//! the factors:
//! - **SO(3)**: rotations, stored as a unit quaternion
//! - **SE(3)**: rigid body transformations (rotation + translation)
//!
//! Both follow the conventions of the [manif](https://github.com/artivis/manif)
//! C++ library: tangent vectors are ordered `[rho (translation), theta
//! (rotation)]` and perturbations use the right-plus convention
//! `g ⊞ δ = g ∘ exp(δ^∧)`.
//!
//! The [`Manifold`] trait is the minimal capability numerical differentiation
//! needs: the local degree-of-freedom count and a retraction applying a small
//! tangent-space perturbation. It is implemented by [`se3::SE3`] (6 DOF,
//! exponential-map retraction) and by the inverse-depth landmark triple
//! (3 DOF, raw coordinate retraction).

use nalgebra::{DVector, Matrix3, Vector3};

pub mod se3;
pub mod so3;

/// Minimal perturbation capability used by numerical differentiation.
///
/// `retract` maps a tangent-space delta (length [`Manifold::dof`]) to a
/// perturbed element. For vector-valued variables the retraction is plain
/// addition; for Lie groups it is the exponential map composed on the right.
pub trait Manifold: Clone {
    /// Dimension of the local tangent space.
    fn dof(&self) -> usize;

    /// Apply a tangent-space perturbation: `self ⊞ delta`.
    ///
    /// # Panics
    ///
    /// Panics if `delta.len() != self.dof()`.
    fn retract(&self, delta: &DVector<f64>) -> Self;
}

/// Compute the skew-symmetric matrix of a 3D vector.
///
/// For `v = [x, y, z]`:
/// ```text
/// [  0  -z   y ]
/// [  z   0  -x ]
/// [ -y   x   0 ]
/// ```
#[inline]
pub fn skew_symmetric(v: &Vector3<f64>) -> Matrix3<f64> {
    Matrix3::new(0.0, -v.z, v.y, v.z, 0.0, -v.x, -v.y, v.x, 0.0)
}

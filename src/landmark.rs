//! Inverse-depth landmark parameterization.
//!
//! A landmark is stored as `(theta, phi, rho)`: azimuth, elevation, and
//! inverse range, expressed relative to a designated reference pose. The
//! parameterization improves numerical conditioning for distant points
//! (Civera et al., "Inverse Depth Parametrization for Monocular SLAM").

use crate::manifold::se3::SE3;
use crate::manifold::Manifold;
use nalgebra::{DVector, Vector3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A landmark in inverse-depth form, relative to a reference pose.
///
/// `rho` must be nonzero; `rho → 0` places the point at infinity and
/// produces unbounded coordinates. Guarding against it is the caller's
/// responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InvDepthLandmark {
    /// Azimuth angle (radians) in the reference frame
    pub theta: f64,
    /// Elevation angle (radians) in the reference frame
    pub phi: f64,
    /// Inverse range (1/meters) along the bearing direction
    pub rho: f64,
}

impl InvDepthLandmark {
    /// Create a new inverse-depth landmark.
    #[must_use]
    pub const fn new(theta: f64, phi: f64, rho: f64) -> Self {
        Self { theta, phi, rho }
    }

    /// The 3D point in the reference pose's local frame.
    ///
    /// A unit bearing vector for direction `(theta, phi)` in an
    /// elevation/azimuth convention, scaled by the range `1/rho`:
    /// ```text
    /// ( cos(phi)·sin(theta)/rho , sin(phi)/rho , cos(phi)·cos(theta)/rho )
    /// ```
    pub fn point_in_frame(&self) -> Vector3<f64> {
        let inv_rho = 1.0 / self.rho;
        Vector3::new(
            self.phi.cos() * self.theta.sin() * inv_rho,
            self.phi.sin() * inv_rho,
            self.phi.cos() * self.theta.cos() * inv_rho,
        )
    }

    /// The 3D point in world coordinates, given the reference pose.
    pub fn world_point(&self, reference: &SE3) -> Vector3<f64> {
        reference.act(&self.point_in_frame())
    }

    /// The coordinates as a `(theta, phi, rho)` vector.
    pub fn as_vector(&self) -> Vector3<f64> {
        Vector3::new(self.theta, self.phi, self.rho)
    }
}

impl From<Vector3<f64>> for InvDepthLandmark {
    fn from(v: Vector3<f64>) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl Manifold for InvDepthLandmark {
    fn dof(&self) -> usize {
        3
    }

    // Raw coordinate perturbation: the parameterization is already minimal.
    fn retract(&self, delta: &DVector<f64>) -> Self {
        assert_eq!(delta.len(), 3, "inverse-depth landmark has 3 coordinates");
        Self::new(
            self.theta + delta[0],
            self.phi + delta[1],
            self.rho + delta[2],
        )
    }
}

impl fmt::Display for InvDepthLandmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "InvDepthLandmark(theta: {:.4}, phi: {:.4}, rho: {:.4})",
            self.theta, self.phi, self.rho
        )
    }
}

//! SO(3) - rotations in 3D, stored as a unit quaternion.

use nalgebra::{Matrix3, Quaternion, Unit, UnitQuaternion, Vector3};
use std::fmt;

/// SO(3) group element representing a rotation in 3D.
#[derive(Clone, Debug, PartialEq)]
pub struct SO3 {
    quaternion: UnitQuaternion<f64>,
}

impl SO3 {
    /// Create a new SO3 element from a unit quaternion.
    pub fn new(quaternion: UnitQuaternion<f64>) -> Self {
        SO3 { quaternion }
    }

    /// Identity rotation.
    pub fn identity() -> Self {
        SO3 {
            quaternion: UnitQuaternion::identity(),
        }
    }

    /// Create SO(3) from quaternion coefficients [x, y, z, w].
    ///
    /// The quaternion is normalized before use.
    pub fn from_quaternion_coeffs(x: f64, y: f64, z: f64, w: f64) -> Self {
        let q = Quaternion::new(w, x, y, z);
        SO3::new(UnitQuaternion::from_quaternion(q))
    }

    /// Create SO(3) from Euler angles (roll, pitch, yaw).
    pub fn from_euler_angles(roll: f64, pitch: f64, yaw: f64) -> Self {
        SO3::new(UnitQuaternion::from_euler_angles(roll, pitch, yaw))
    }

    /// Create SO(3) from an axis-angle vector (exponential map).
    ///
    /// The direction of `theta` is the rotation axis, its norm the angle in
    /// radians.
    pub fn exp(theta: &Vector3<f64>) -> Self {
        let angle = theta.norm();
        if angle < f64::EPSILON {
            return SO3::identity();
        }
        let axis = Unit::new_normalize(*theta);
        SO3::new(UnitQuaternion::from_axis_angle(&axis, angle))
    }

    /// Logarithmic map: axis-angle vector of this rotation.
    pub fn log(&self) -> Vector3<f64> {
        self.quaternion.scaled_axis()
    }

    /// Get the underlying unit quaternion.
    pub fn quaternion(&self) -> UnitQuaternion<f64> {
        self.quaternion
    }

    /// Get the rotation matrix (3x3).
    pub fn rotation_matrix(&self) -> Matrix3<f64> {
        self.quaternion.to_rotation_matrix().into_inner()
    }

    /// Inverse rotation: `R⁻¹ = Rᵀ`, for quaternions `q⁻¹ = q*`.
    pub fn inverse(&self) -> Self {
        SO3 {
            quaternion: self.quaternion.inverse(),
        }
    }

    /// Composition of this rotation with another.
    pub fn compose(&self, other: &SO3) -> Self {
        SO3 {
            quaternion: self.quaternion * other.quaternion,
        }
    }

    /// Rotate a vector: `R * v`.
    pub fn act(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        self.quaternion * vector
    }

    /// Generate a random rotation from the thread-local generator.
    pub fn random() -> Self {
        Self::sample(&mut rand::rng())
    }

    /// Draw a random rotation from the given generator.
    ///
    /// Useful with a seeded `StdRng` when tests need reproducible draws.
    pub fn sample<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        let axis = Vector3::new(
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
        );
        let angle = rng.random_range(-std::f64::consts::PI..std::f64::consts::PI);
        if axis.norm() < 1e-9 {
            return SO3::identity();
        }
        SO3::new(UnitQuaternion::from_axis_angle(
            &Unit::new_normalize(axis),
            angle,
        ))
    }
}

impl fmt::Display for SO3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let q = self.quaternion;
        write!(
            f,
            "SO3(w: {:.4}, x: {:.4}, y: {:.4}, z: {:.4})",
            q.w, q.i, q.j, q.k
        )
    }
}

//! SE(3) - rigid body transformations in 3D (rotation + translation).
//!
//! SE(3) elements are represented as an SO(3) rotation plus a Vector3
//! translation. Tangent vectors are ordered `[rho(3), theta(3)]` (translation
//! first), following manif conventions. The retraction used for numerical
//! perturbation is the right-plus `T ⊞ δ = T ∘ exp(δ^∧)` with the full SE(3)
//! exponential map.
//!
//! A pose denotes a camera (or body) frame expressed in world coordinates:
//! [`SE3::act`] maps a point from the local frame into the world frame.

use crate::manifold::so3::SO3;
use crate::manifold::{skew_symmetric, Manifold};
use nalgebra::{DVector, Matrix3, Vector3, Vector6};
use std::fmt;

/// SE(3) group element: a rotation and a translation.
#[derive(Clone, Debug, PartialEq)]
pub struct SE3 {
    rotation: SO3,
    translation: Vector3<f64>,
}

impl SE3 {
    /// Create a new SE3 element from translation and rotation.
    pub fn new(translation: Vector3<f64>, rotation: SO3) -> Self {
        SE3 {
            rotation,
            translation,
        }
    }

    /// Identity transform.
    pub fn identity() -> Self {
        SE3 {
            rotation: SO3::identity(),
            translation: Vector3::zeros(),
        }
    }

    /// Create SE3 from translation components and Euler angles.
    pub fn from_translation_euler(x: f64, y: f64, z: f64, roll: f64, pitch: f64, yaw: f64) -> Self {
        SE3 {
            rotation: SO3::from_euler_angles(roll, pitch, yaw),
            translation: Vector3::new(x, y, z),
        }
    }

    /// Create SE3 from a 7-vector `[qx, qy, qz, qw, tx, ty, tz]`.
    ///
    /// This is the flat representation used at the graph boundary, where
    /// variables arrive as dynamic vectors.
    ///
    /// # Panics
    ///
    /// Panics if `v.len() != 7`.
    pub fn from_vector(v: &DVector<f64>) -> Self {
        assert_eq!(v.len(), 7, "SE3 flat representation has 7 components");
        SE3 {
            rotation: SO3::from_quaternion_coeffs(v[0], v[1], v[2], v[3]),
            translation: Vector3::new(v[4], v[5], v[6]),
        }
    }

    /// Flatten to a 7-vector `[qx, qy, qz, qw, tx, ty, tz]`.
    pub fn to_vector(&self) -> DVector<f64> {
        let q = self.rotation.quaternion();
        let t = self.translation;
        DVector::from_vec(vec![q.i, q.j, q.k, q.w, t.x, t.y, t.z])
    }

    /// Get the translation part.
    pub fn translation(&self) -> Vector3<f64> {
        self.translation
    }

    /// Get the rotation part.
    pub fn rotation(&self) -> SO3 {
        self.rotation.clone()
    }

    /// Inverse transform: `T⁻¹ = (Rᵀ, -Rᵀ t)`.
    pub fn inverse(&self) -> Self {
        let rot_inv = self.rotation.inverse();
        let trans_inv = -rot_inv.act(&self.translation);
        SE3 {
            rotation: rot_inv,
            translation: trans_inv,
        }
    }

    /// Composition: `T_a ∘ T_b = (R_a R_b, R_a t_b + t_a)`.
    pub fn compose(&self, other: &SE3) -> Self {
        SE3 {
            rotation: self.rotation.compose(&other.rotation),
            translation: self.rotation.act(&other.translation) + self.translation,
        }
    }

    /// Transform a point from the local frame into the world frame:
    /// `p_world = R * p_local + t`.
    pub fn act(&self, point: &Vector3<f64>) -> Vector3<f64> {
        self.rotation.act(point) + self.translation
    }

    /// SE(3) exponential map of a tangent vector `[rho, theta]`.
    ///
    /// `exp(τ) = (exp(θ^∧), V(θ) ρ)` with
    /// `V(θ) = I + (1 - cos θ)/θ² [θ]ₓ + (θ - sin θ)/θ³ [θ]ₓ²`.
    pub fn exp(tangent: &Vector6<f64>) -> Self {
        let rho = Vector3::new(tangent[0], tangent[1], tangent[2]);
        let theta = Vector3::new(tangent[3], tangent[4], tangent[5]);
        SE3 {
            rotation: SO3::exp(&theta),
            translation: left_jacobian_so3(&theta) * rho,
        }
    }

    /// Right-plus retraction: `T ⊞ δ = T ∘ exp(δ^∧)`.
    pub fn retract_tangent(&self, tangent: &Vector6<f64>) -> Self {
        self.compose(&SE3::exp(tangent))
    }

    /// Generate a random transform from the thread-local generator.
    pub fn random() -> Self {
        Self::sample(&mut rand::rng())
    }

    /// Draw a random transform from the given generator.
    ///
    /// Useful with a seeded `StdRng` when tests need reproducible draws.
    pub fn sample<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        let translation = Vector3::new(
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
        );
        SE3 {
            rotation: SO3::sample(rng),
            translation,
        }
    }
}

/// Left Jacobian of SO(3), the `V(θ)` matrix coupling rotation and
/// translation in the SE(3) exponential map.
fn left_jacobian_so3(theta: &Vector3<f64>) -> Matrix3<f64> {
    let angle_sq = theta.norm_squared();
    let skew = skew_symmetric(theta);
    if angle_sq < 1e-14 {
        // Second-order Taylor expansion around zero
        return Matrix3::identity() + 0.5 * skew + (skew * skew) / 6.0;
    }
    let angle = angle_sq.sqrt();
    let a = (1.0 - angle.cos()) / angle_sq;
    let b = (angle - angle.sin()) / (angle_sq * angle);
    Matrix3::identity() + a * skew + b * (skew * skew)
}

impl Manifold for SE3 {
    fn dof(&self) -> usize {
        6
    }

    fn retract(&self, delta: &DVector<f64>) -> Self {
        assert_eq!(delta.len(), 6, "SE3 tangent space has 6 degrees of freedom");
        let tangent = Vector6::new(delta[0], delta[1], delta[2], delta[3], delta[4], delta[5]);
        self.retract_tangent(&tangent)
    }
}

impl fmt::Display for SE3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = self.translation;
        let q = self.rotation.quaternion();
        write!(
            f,
            "SE3(translation: [{:.4}, {:.4}, {:.4}], rotation: [w: {:.4}, x: {:.4}, y: {:.4}, z: {:.4}])",
            t.x, t.y, t.z, q.w, q.i, q.j, q.k
        )
    }
}

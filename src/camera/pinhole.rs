//! Pinhole camera: a pose bound to a shared calibration.

use crate::camera::Calibration;
use crate::manifold::se3::SE3;
use nalgebra::{Vector2, Vector3};
use std::sync::Arc;
use thiserror::Error;

/// Minimum camera-frame depth considered in front of the camera.
pub const MIN_DEPTH: f64 = 1e-6;

/// Raised when a point projects to non-positive depth in the camera frame
/// (the point lies behind the camera), making projection geometrically
/// undefined.
#[derive(Debug, Clone, Error)]
#[error("point is behind the camera (camera-frame depth {depth:.6e})")]
pub struct CheiralityError {
    /// The offending camera-frame depth.
    pub depth: f64,
}

/// A calibrated pinhole camera at a pose.
///
/// The pose is the camera frame expressed in world coordinates; projection
/// maps a world point into the camera frame through the pose inverse and
/// applies the calibrated pinhole model.
#[derive(Debug, Clone)]
pub struct PinholeCamera {
    pose: SE3,
    calibration: Arc<Calibration>,
}

impl PinholeCamera {
    /// Create a camera from a pose and a shared calibration.
    pub fn new(pose: SE3, calibration: Arc<Calibration>) -> Self {
        Self { pose, calibration }
    }

    /// The camera pose (camera frame in world coordinates).
    pub fn pose(&self) -> &SE3 {
        &self.pose
    }

    /// The camera calibration.
    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    /// Project a world-frame 3D point to 2D image coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`CheiralityError`] when the point's depth in the camera frame
    /// falls below [`MIN_DEPTH`].
    pub fn project(&self, p_world: &Vector3<f64>) -> Result<Vector2<f64>, CheiralityError> {
        let p_cam = self.pose.inverse().act(p_world);
        if p_cam.z < MIN_DEPTH {
            return Err(CheiralityError { depth: p_cam.z });
        }
        let inv_z = 1.0 / p_cam.z;
        let x = p_cam.x * inv_z;
        let y = p_cam.y * inv_z;
        let k = self.calibration.as_ref();
        Ok(Vector2::new(
            k.fx * x + k.skew * y + k.cx,
            k.fy * y + k.cy,
        ))
    }
}

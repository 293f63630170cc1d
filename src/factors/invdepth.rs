//! Inverse-depth reprojection factors.
//!
//! Two variants of one measurement model, differing only in arity:
//!
//! - [`InverseDepthFactor`] connects one pose and one landmark. The pose is
//!   both the reference frame of the inverse-depth parameterization and the
//!   observing camera (the first observation of the landmark).
//! - [`TwoViewInverseDepthFactor`] connects two poses and one landmark. The
//!   first pose is the reference frame, the second the observing camera.
//!
//! Both compute the reprojection residual `project(world point) - measured`
//! through a calibrated pinhole camera. When the point falls behind the
//! observing camera the factor does not fail: it returns a fixed large
//! residual of `(2·fx, 2·fx)` and logs a diagnostic, keeping the outer
//! optimizer numerically stable near the degenerate region.
//!
//! Jacobians are computed by central differences through each variable's
//! retraction: 6 columns per pose (SE(3) tangent space), 3 columns for the
//! landmark (raw `(theta, phi, rho)` coordinates).

use crate::camera::{Calibration, PinholeCamera};
use crate::error::{Error, Result};
use crate::factors::{Factor, Key, Linearization};
use crate::landmark::InvDepthLandmark;
use crate::manifold::se3::SE3;
use crate::numdiff;
use nalgebra::{DMatrix, DVector, Vector2, Vector3};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::sync::Arc;
use tracing::warn;

/// Residual dimension of a 2D reprojection measurement.
const RESIDUAL_DIM: usize = 2;

/// Flat representation size of an SE(3) pose parameter.
const POSE_PARAM_LEN: usize = 7;

/// Flat representation size of an inverse-depth landmark parameter.
const LANDMARK_PARAM_LEN: usize = 3;

fn to_dynamic(r: Vector2<f64>) -> DVector<f64> {
    DVector::from_vec(vec![r.x, r.y])
}

fn check_param(param: &DVector<f64>, expected: usize, what: &str) -> Result<()> {
    if param.len() != expected {
        return Err(Error::InvalidInput(format!(
            "{what} parameter must have {expected} components, got {}",
            param.len()
        )));
    }
    Ok(())
}

/// Reprojection factor for the first observation of an inverse-depth
/// landmark.
///
/// The single pose serves double duty: it is the reference frame in which
/// `(theta, phi, rho)` is expressed and the camera that captured the stored
/// measurement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InverseDepthFactor {
    keys: [Key; 2],
    measured: Vector2<f64>,
    calibration: Arc<Calibration>,
}

impl InverseDepthFactor {
    /// Create a new factor.
    ///
    /// # Arguments
    ///
    /// * `pose_key` - key of the camera pose variable
    /// * `landmark_key` - key of the inverse-depth landmark variable
    /// * `measured` - 2D pixel location of the observation
    /// * `calibration` - shared camera calibration
    pub fn new(
        pose_key: Key,
        landmark_key: Key,
        measured: Vector2<f64>,
        calibration: Arc<Calibration>,
    ) -> Self {
        Self {
            keys: [pose_key, landmark_key],
            measured,
            calibration,
        }
    }

    /// The stored 2D measurement.
    pub fn measured(&self) -> &Vector2<f64> {
        &self.measured
    }

    /// The shared calibration.
    pub fn calibration(&self) -> &Arc<Calibration> {
        &self.calibration
    }

    /// Compute the reprojection residual.
    ///
    /// Pure in its inputs. The degenerate case (landmark behind the camera)
    /// is absorbed: the returned residual is `(2·fx, 2·fx)` and a diagnostic
    /// is logged naming the involved keys.
    pub fn residual(&self, pose: &SE3, landmark: &InvDepthLandmark) -> Vector2<f64> {
        let world_point = landmark.world_point(pose);
        let camera = PinholeCamera::new(pose.clone(), Arc::clone(&self.calibration));
        match camera.project(&world_point) {
            Ok(uv) => uv - self.measured,
            Err(e) => {
                warn!(
                    "{e}: inverse-depth landmark [{}, {}] moved behind camera [{}]",
                    self.keys[0], self.keys[1], self.keys[0]
                );
                Vector2::repeat(2.0 * self.calibration.fx)
            }
        }
    }

    /// Evaluate the residual and, where requested, the Jacobians.
    ///
    /// `jacobian_pose` receives a 2x6 matrix over the pose's tangent space,
    /// `jacobian_landmark` a 2x3 matrix over `(theta, phi, rho)`. Passing
    /// `None` skips the corresponding differentiation entirely.
    pub fn evaluate(
        &self,
        pose: &SE3,
        landmark: &InvDepthLandmark,
        jacobian_pose: Option<&mut DMatrix<f64>>,
        jacobian_landmark: Option<&mut DMatrix<f64>>,
    ) -> Vector2<f64> {
        if let Some(h) = jacobian_pose {
            *h = numdiff::jacobian(|p: &SE3| to_dynamic(self.residual(p, landmark)), pose);
        }
        if let Some(h) = jacobian_landmark {
            *h = numdiff::jacobian(
                |l: &InvDepthLandmark| to_dynamic(self.residual(pose, l)),
                landmark,
            );
        }
        self.residual(pose, landmark)
    }
}

impl Default for InverseDepthFactor {
    /// Deserialization-default construction with placeholder calibration.
    ///
    /// See [`Calibration::placeholder`]: the result is not configured for
    /// use until real keys, measurement, and calibration are supplied.
    fn default() -> Self {
        Self::new(0, 0, Vector2::zeros(), Arc::new(Calibration::placeholder()))
    }
}

impl Factor for InverseDepthFactor {
    fn keys(&self) -> &[Key] {
        &self.keys
    }

    fn dim(&self) -> usize {
        RESIDUAL_DIM
    }

    fn linearize(&self, params: &[DVector<f64>], requested: &[bool]) -> Result<Linearization> {
        if params.len() != 2 || requested.len() != 2 {
            return Err(Error::InvalidInput(format!(
                "InverseDepthFactor expects 2 parameters and 2 request flags, got {} and {}",
                params.len(),
                requested.len()
            )));
        }
        check_param(&params[0], POSE_PARAM_LEN, "pose")?;
        check_param(&params[1], LANDMARK_PARAM_LEN, "landmark")?;

        let pose = SE3::from_vector(&params[0]);
        let landmark =
            InvDepthLandmark::from(Vector3::new(params[1][0], params[1][1], params[1][2]));

        let mut jac_pose = DMatrix::zeros(0, 0);
        let mut jac_landmark = DMatrix::zeros(0, 0);
        let residual = self.evaluate(
            &pose,
            &landmark,
            requested[0].then_some(&mut jac_pose),
            requested[1].then_some(&mut jac_landmark),
        );

        Ok(Linearization {
            residual: to_dynamic(residual),
            jacobians: vec![
                requested[0].then_some(jac_pose),
                requested[1].then_some(jac_landmark),
            ],
        })
    }

    fn describe(&self, name: &str) -> String {
        format!(
            "{name}: InverseDepthFactor(pose: {}, landmark: {}, measured: [{:.4}, {:.4}])",
            self.keys[0], self.keys[1], self.measured.x, self.measured.y
        )
    }

    fn equals(&self, other: &dyn Factor, tolerance: f64) -> bool {
        let Some(other) = other.as_any().downcast_ref::<Self>() else {
            return false;
        };
        self.keys == other.keys
            && (self.measured - other.measured).amax() < tolerance
            && self
                .calibration
                .equals_with_tolerance(&other.calibration, tolerance)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Reprojection factor for an inverse-depth landmark observed from a second
/// view.
///
/// The first pose defines the frame in which `(theta, phi, rho)` is
/// expressed; the second pose is the camera that captured the stored
/// measurement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwoViewInverseDepthFactor {
    keys: [Key; 3],
    measured: Vector2<f64>,
    calibration: Arc<Calibration>,
}

impl TwoViewInverseDepthFactor {
    /// Create a new factor.
    ///
    /// # Arguments
    ///
    /// * `reference_key` - key of the landmark's reference pose variable
    /// * `observer_key` - key of the observing camera pose variable
    /// * `landmark_key` - key of the inverse-depth landmark variable
    /// * `measured` - 2D pixel location of the observation in the second view
    /// * `calibration` - shared camera calibration
    pub fn new(
        reference_key: Key,
        observer_key: Key,
        landmark_key: Key,
        measured: Vector2<f64>,
        calibration: Arc<Calibration>,
    ) -> Self {
        Self {
            keys: [reference_key, observer_key, landmark_key],
            measured,
            calibration,
        }
    }

    /// The stored 2D measurement.
    pub fn measured(&self) -> &Vector2<f64> {
        &self.measured
    }

    /// The shared calibration.
    pub fn calibration(&self) -> &Arc<Calibration> {
        &self.calibration
    }

    /// Compute the reprojection residual.
    ///
    /// The world point is built from the reference pose, then projected
    /// through the observing pose's camera. The degenerate case is absorbed
    /// exactly as in [`InverseDepthFactor::residual`].
    pub fn residual(
        &self,
        reference: &SE3,
        observer: &SE3,
        landmark: &InvDepthLandmark,
    ) -> Vector2<f64> {
        let world_point = landmark.world_point(reference);
        let camera = PinholeCamera::new(observer.clone(), Arc::clone(&self.calibration));
        match camera.project(&world_point) {
            Ok(uv) => uv - self.measured,
            Err(e) => {
                warn!(
                    "{e}: inverse-depth landmark [{}, {}] moved behind camera [{}]",
                    self.keys[0], self.keys[2], self.keys[1]
                );
                Vector2::repeat(2.0 * self.calibration.fx)
            }
        }
    }

    /// Evaluate the residual and, where requested, the Jacobians.
    ///
    /// Pose Jacobians are 2x6 over the respective tangent spaces, the
    /// landmark Jacobian 2x3. Passing `None` skips that differentiation.
    pub fn evaluate(
        &self,
        reference: &SE3,
        observer: &SE3,
        landmark: &InvDepthLandmark,
        jacobian_reference: Option<&mut DMatrix<f64>>,
        jacobian_observer: Option<&mut DMatrix<f64>>,
        jacobian_landmark: Option<&mut DMatrix<f64>>,
    ) -> Vector2<f64> {
        if let Some(h) = jacobian_reference {
            *h = numdiff::jacobian(
                |p: &SE3| to_dynamic(self.residual(p, observer, landmark)),
                reference,
            );
        }
        if let Some(h) = jacobian_observer {
            *h = numdiff::jacobian(
                |p: &SE3| to_dynamic(self.residual(reference, p, landmark)),
                observer,
            );
        }
        if let Some(h) = jacobian_landmark {
            *h = numdiff::jacobian(
                |l: &InvDepthLandmark| to_dynamic(self.residual(reference, observer, l)),
                landmark,
            );
        }
        self.residual(reference, observer, landmark)
    }
}

impl Default for TwoViewInverseDepthFactor {
    /// Deserialization-default construction with placeholder calibration.
    ///
    /// See [`Calibration::placeholder`]: the result is not configured for
    /// use until real keys, measurement, and calibration are supplied.
    fn default() -> Self {
        Self::new(
            0,
            0,
            0,
            Vector2::zeros(),
            Arc::new(Calibration::placeholder()),
        )
    }
}

impl Factor for TwoViewInverseDepthFactor {
    fn keys(&self) -> &[Key] {
        &self.keys
    }

    fn dim(&self) -> usize {
        RESIDUAL_DIM
    }

    fn linearize(&self, params: &[DVector<f64>], requested: &[bool]) -> Result<Linearization> {
        if params.len() != 3 || requested.len() != 3 {
            return Err(Error::InvalidInput(format!(
                "TwoViewInverseDepthFactor expects 3 parameters and 3 request flags, got {} and {}",
                params.len(),
                requested.len()
            )));
        }
        check_param(&params[0], POSE_PARAM_LEN, "reference pose")?;
        check_param(&params[1], POSE_PARAM_LEN, "observer pose")?;
        check_param(&params[2], LANDMARK_PARAM_LEN, "landmark")?;

        let reference = SE3::from_vector(&params[0]);
        let observer = SE3::from_vector(&params[1]);
        let landmark =
            InvDepthLandmark::from(Vector3::new(params[2][0], params[2][1], params[2][2]));

        let mut jac_reference = DMatrix::zeros(0, 0);
        let mut jac_observer = DMatrix::zeros(0, 0);
        let mut jac_landmark = DMatrix::zeros(0, 0);
        let residual = self.evaluate(
            &reference,
            &observer,
            &landmark,
            requested[0].then_some(&mut jac_reference),
            requested[1].then_some(&mut jac_observer),
            requested[2].then_some(&mut jac_landmark),
        );

        Ok(Linearization {
            residual: to_dynamic(residual),
            jacobians: vec![
                requested[0].then_some(jac_reference),
                requested[1].then_some(jac_observer),
                requested[2].then_some(jac_landmark),
            ],
        })
    }

    fn describe(&self, name: &str) -> String {
        format!(
            "{name}: TwoViewInverseDepthFactor(reference: {}, observer: {}, landmark: {}, measured: [{:.4}, {:.4}])",
            self.keys[0], self.keys[1], self.keys[2], self.measured.x, self.measured.y
        )
    }

    fn equals(&self, other: &dyn Factor, tolerance: f64) -> bool {
        let Some(other) = other.as_any().downcast_ref::<Self>() else {
            return false;
        };
        self.keys == other.keys
            && (self.measured - other.measured).amax() < tolerance
            && self
                .calibration
                .equals_with_tolerance(&other.calibration, tolerance)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

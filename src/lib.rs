//! Inverse-depth reprojection factors for bundle adjustment and SLAM.
//!
//! This crate provides the residual and Jacobian computations for visual
//! landmarks parameterized in inverse-depth form (bearing angles plus inverse
//! range), observed from one or two camera poses. The factors are building
//! blocks for an external nonlinear least-squares optimizer: they compute the
//! reprojection error against a stored 2D measurement and, on request, the
//! numerical Jacobians with respect to each connected variable.
//!
//! # Module Structure
//!
//! - [`manifold`]: SO(3)/SE(3) types and the retraction trait used for
//!   tangent-space perturbations
//! - [`camera`]: pinhole calibration and projection with cheirality detection
//! - [`landmark`]: the inverse-depth landmark triple and its coordinate
//!   transform into a world-frame point
//! - [`numdiff`]: central-difference Jacobians over manifold retractions
//! - [`factors`]: the factor trait and the one-pose / two-pose inverse-depth
//!   factor variants
//!
//! # Example
//!
//! ```
//! use invdepth_factors::camera::Calibration;
//! use invdepth_factors::factors::InverseDepthFactor;
//! use invdepth_factors::landmark::InvDepthLandmark;
//! use invdepth_factors::manifold::se3::SE3;
//! use nalgebra::Vector2;
//! use std::sync::Arc;
//!
//! let calib = Arc::new(Calibration::new(500.0, 500.0, 0.0, 320.0, 240.0));
//! let factor = InverseDepthFactor::new(0, 1, Vector2::new(320.0, 240.0), calib);
//!
//! let pose = SE3::identity();
//! let landmark = InvDepthLandmark::new(0.0, 0.0, 0.5); // 2 m straight ahead
//! let residual = factor.residual(&pose, &landmark);
//! assert!(residual.norm() < 1e-9);
//! ```

pub mod camera;
pub mod error;
pub mod factors;
pub mod landmark;
pub mod logger;
pub mod manifold;
pub mod numdiff;

pub use error::{Error, Result};
pub use logger::{init_logger, init_logger_with_level};

//! Calibrated pinhole camera projection.
//!
//! A [`Calibration`] holds the fixed intrinsic parameters; a [`PinholeCamera`]
//! binds a pose to a shared calibration and projects world-frame points.
//! Points with non-positive depth in the camera frame raise a
//! [`CheiralityError`], which the factors absorb into a fallback residual.

mod calibration;
mod pinhole;

pub use calibration::Calibration;
pub use pinhole::{CheiralityError, PinholeCamera, MIN_DEPTH};

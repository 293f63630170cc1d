//! Pinhole camera intrinsic parameters.

use serde::{Deserialize, Serialize};

/// Pinhole camera intrinsics with 5 parameters.
///
/// # Parameters
///
/// - `fx`, `fy`: focal lengths in pixels
/// - `skew`: axis skew (usually 0)
/// - `cx`, `cy`: principal point coordinates in pixels
///
/// # Projection Model
///
/// For a normalized image point `(x, y)`:
/// ```text
/// u = fx * x + skew * y + cx
/// v = fy * y + cy
/// ```
///
/// A calibration is immutable for the lifetime of the factors referencing it
/// and is shared across them behind an `Arc`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    /// Focal length in x direction (pixels)
    pub fx: f64,
    /// Focal length in y direction (pixels)
    pub fy: f64,
    /// Axis skew
    pub skew: f64,
    /// Principal point x coordinate (pixels)
    pub cx: f64,
    /// Principal point y coordinate (pixels)
    pub cy: f64,
}

impl Calibration {
    /// Create a new calibration.
    #[must_use]
    pub const fn new(fx: f64, fy: f64, skew: f64, cx: f64, cy: f64) -> Self {
        Self {
            fx,
            fy,
            skew,
            cx,
            cy,
        }
    }

    /// Placeholder calibration used by default-constructed factors.
    ///
    /// The values are deliberately nonsensical so that results computed
    /// against them are recognizable as misconfiguration. This construction
    /// mode exists only as a deserialization default; treat a factor carrying
    /// it as not configured for use until a real calibration is supplied.
    #[must_use]
    pub const fn placeholder() -> Self {
        Self::new(444.0, 555.0, 666.0, 777.0, 888.0)
    }

    /// Compare with another calibration within an absolute tolerance.
    pub fn equals_with_tolerance(&self, other: &Calibration, tolerance: f64) -> bool {
        (self.fx - other.fx).abs() < tolerance
            && (self.fy - other.fy).abs() < tolerance
            && (self.skew - other.skew).abs() < tolerance
            && (self.cx - other.cx).abs() < tolerance
            && (self.cy - other.cy).abs() < tolerance
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self::placeholder()
    }
}

//! Per-frame tag measurements fed to the tracker.

use nalgebra::Vector3;

use crate::utils::{all_finite, normalize_angle};
use crate::{Error, Result};

/// Integer identity of a fiducial tag as reported by the detector.
pub type TagId = i64;

/// One detected tag in one frame.
///
/// Position is the tag center in pixels; `angle` is the in-plane orientation
/// in degrees, always kept in `[0, 360)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Measurement {
    /// Tag identity.
    pub id: TagId,
    /// Center x in pixels.
    pub x: f64,
    /// Center y in pixels.
    pub y: f64,
    /// Orientation in degrees, `[0, 360)`.
    pub angle: f64,
}

impl Measurement {
    /// Create a measurement from a center point and an angle in degrees.
    ///
    /// The angle is wrapped into `[0, 360)`. Non-finite components are rejected.
    pub fn new(id: TagId, center: [f64; 2], angle: f64) -> Result<Self> {
        if !all_finite(&[center[0], center[1], angle]) {
            return Err(Error::InvalidMeasurement(format!(
                "tag {}: non-finite center {:?} or angle {}",
                id, center, angle
            )));
        }

        Ok(Self {
            id,
            x: center[0],
            y: center[1],
            angle: normalize_angle(angle),
        })
    }

    /// Create a measurement from raw detector output.
    ///
    /// `corners` are in detector order (top-left, top-right, bottom-right,
    /// bottom-left). The orientation is the direction of the top edge,
    /// `atan2(tr.y - tl.y, tr.x - tl.x)`, in degrees. Corners and center keep
    /// their sub-pixel precision; nothing is rounded to whole pixels.
    pub fn from_corners(id: TagId, center: [f64; 2], corners: &[[f64; 2]; 4]) -> Result<Self> {
        let flat: Vec<f64> = corners.iter().flatten().copied().collect();
        if !all_finite(&flat) {
            return Err(Error::InvalidMeasurement(format!(
                "tag {}: non-finite corners {:?}",
                id, corners
            )));
        }

        Self::new(id, center, top_edge_angle(corners))
    }

    /// Measurement as the `[x, y, θ]` vector the filter observes.
    pub fn as_vector(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.angle)
    }
}

/// Direction of the top edge (corner 0 to corner 1) in degrees, `[0, 360)`.
pub fn top_edge_angle(corners: &[[f64; 2]; 4]) -> f64 {
    let [top_left, top_right, _, _] = corners;
    let radians = (top_right[1] - top_left[1]).atan2(top_right[0] - top_left[0]);
    normalize_angle(radians.to_degrees())
}

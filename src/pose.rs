//! Filtered tag poses produced by the tracker.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::detection::TagId;
use crate::track::Track;

/// Image dimensions in pixels, used to mirror poses into consumer coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for FrameSize {
    fn default() -> Self {
        Self::new(640, 480)
    }
}

/// Filtered pose of one tag for one frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TagPose {
    pub id: TagId,
    /// Center x in pixels.
    pub x: f64,
    /// Center y in pixels.
    pub y: f64,
    /// Orientation in degrees, `[0, 360)`.
    pub theta: f64,
}

impl TagPose {
    /// Render the pose as a `id,x,y,theta` line for the simulator and robot link.
    ///
    /// Coordinates are truncated to whole pixels and mirrored on both axes
    /// (`width - x`, `height - y`); the angle is truncated to whole degrees.
    pub fn to_wire(&self, frame: FrameSize) -> String {
        let x = i64::from(frame.width) - self.x.trunc() as i64;
        let y = i64::from(frame.height) - self.y.trunc() as i64;
        format!("{},{},{},{}", self.id, x, y, self.theta.trunc() as i64)
    }
}

impl From<&Track> for TagPose {
    fn from(track: &Track) -> Self {
        Self {
            id: track.id,
            x: track.x(),
            y: track.y(),
            theta: track.theta(),
        }
    }
}

impl fmt::Display for TagPose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tag {} at ({:.2}, {:.2}) {:.2}°",
            self.id, self.x, self.y, self.theta
        )
    }
}

//! Track struct holding one tag's running estimate.

use nalgebra::{Matrix3, Vector3};
use std::fmt;

use crate::detection::{Measurement, TagId};
use crate::filter::Estimate;
use crate::utils::normalize_angle;

/// A tracked tag maintained by the [`TrackStore`](crate::TrackStore).
///
/// Contains the tag's `(x, y, θ)` estimate and its uncertainty.
#[derive(Clone, PartialEq)]
pub struct Track {
    /// Tag identity.
    pub id: TagId,

    /// State `[x, y, θ]`; θ is kept in `[0, 360)`.
    pub state: Vector3<f64>,

    /// 3×3 covariance of the state.
    pub covariance: Matrix3<f64>,

    /// Number of predict/update cycles applied since creation.
    pub age: u32,
}

impl Track {
    /// Start a track from its first measurement.
    pub fn new(measurement: &Measurement, initial_covariance: Matrix3<f64>) -> Self {
        let mut state = measurement.as_vector();
        state[2] = normalize_angle(state[2]);
        Self {
            id: measurement.id,
            state,
            covariance: initial_covariance,
            age: 0,
        }
    }

    pub fn x(&self) -> f64 {
        self.state[0]
    }

    pub fn y(&self) -> f64 {
        self.state[1]
    }

    /// Orientation in degrees, `[0, 360)`.
    pub fn theta(&self) -> f64 {
        self.state[2]
    }

    /// Current estimate as filter input.
    pub fn estimate(&self) -> Estimate {
        Estimate::new(self.state, self.covariance)
    }

    /// Store a corrected estimate, re-wrapping θ and bumping the age.
    pub fn apply(&mut self, estimate: Estimate) {
        self.state = estimate.state;
        self.state[2] = normalize_angle(self.state[2]);
        self.covariance = estimate.covariance;
        self.age = self.age.saturating_add(1);
    }
}

impl fmt::Debug for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Track")
            .field("id", &self.id)
            .field("state", &self.state.as_slice())
            .field("covariance_diag", &self.covariance.diagonal().as_slice())
            .field("age", &self.age)
            .finish()
    }
}

//! Filter traits for the tracking system.

use nalgebra::{Matrix3, Vector3};

/// A single tag's estimate: `(x, y, θ)` state and its covariance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Estimate {
    /// State vector `[x, y, θ]` (pixels, pixels, degrees).
    pub state: Vector3<f64>,
    /// 3×3 state covariance.
    pub covariance: Matrix3<f64>,
}

impl Estimate {
    pub fn new(state: Vector3<f64>, covariance: Matrix3<f64>) -> Self {
        Self { state, covariance }
    }
}

/// Advances an estimate one time step without new evidence.
pub trait Predictor {
    /// Produce the predicted `(state, covariance)` from the current estimate.
    fn predict(&self, estimate: &Estimate) -> Estimate;
}

/// Fuses a measurement into a predicted estimate (the correction step).
pub trait Updater {
    /// Correct `predicted` with `measurement` (`[x, y, θ]`).
    ///
    /// Must always return a value; numerical degeneracies degrade the gain
    /// rather than failing.
    fn update(&self, predicted: &Estimate, measurement: &Vector3<f64>) -> Estimate;
}

/// A full predict/update filter shared by every track of a tracker.
///
/// Implementations hold only process parameters; per-tag state lives in the
/// tracks themselves, so one filter instance serves all tags.
pub trait Filter: Predictor + Updater + Send + Sync {}

impl<T: Predictor + Updater + Send + Sync> Filter for T {}

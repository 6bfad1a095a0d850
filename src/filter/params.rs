//! Process parameters shared by every track of a tracker.

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::utils::all_finite;
use crate::{Error, Result};

/// Diagonal process noise `Q` for `[x, y, θ]`.
pub const DEFAULT_PROCESS_NOISE: [f64; 3] = [0.55, 0.05, 0.552];

/// Diagonal measurement noise `R` for `[x, y, θ]`.
pub const DEFAULT_MEASUREMENT_NOISE: [f64; 3] = [0.01, 0.01, 0.005];

/// Diagonal covariance given to a track on first sighting.
pub const DEFAULT_INITIAL_COVARIANCE: [f64; 3] = [1.0, 1.0, 0.1];

/// Nominal camera sample period in seconds (70 fps).
pub const DEFAULT_DT: f64 = 1.0 / 70.0;

/// Noise and timing parameters for the tag filter.
///
/// All matrices are diagonal and given by their diagonals. `dt` is validated
/// and carried along, but the static transition model does not use it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterParams {
    /// Diagonal of the process noise covariance `Q`.
    pub process_noise: [f64; 3],
    /// Diagonal of the measurement noise covariance `R`.
    pub measurement_noise: [f64; 3],
    /// Diagonal of the covariance assigned to new tracks.
    pub initial_covariance: [f64; 3],
    /// Nominal sample period in seconds.
    pub dt: f64,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            process_noise: DEFAULT_PROCESS_NOISE,
            measurement_noise: DEFAULT_MEASUREMENT_NOISE,
            initial_covariance: DEFAULT_INITIAL_COVARIANCE,
            dt: DEFAULT_DT,
        }
    }
}

impl FilterParams {
    /// Check that every diagonal is finite and non-negative and `dt` is positive.
    pub fn validate(&self) -> Result<()> {
        check_diagonal("process_noise", &self.process_noise)?;
        check_diagonal("measurement_noise", &self.measurement_noise)?;
        check_diagonal("initial_covariance", &self.initial_covariance)?;

        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "dt must be a positive number of seconds, got {}",
                self.dt
            )));
        }
        Ok(())
    }

    /// Process noise covariance `Q`.
    pub fn q(&self) -> Matrix3<f64> {
        diagonal(&self.process_noise)
    }

    /// Measurement noise covariance `R`.
    pub fn r(&self) -> Matrix3<f64> {
        diagonal(&self.measurement_noise)
    }

    /// Initial track covariance `P0`.
    pub fn p0(&self) -> Matrix3<f64> {
        diagonal(&self.initial_covariance)
    }
}

fn diagonal(values: &[f64; 3]) -> Matrix3<f64> {
    Matrix3::from_diagonal(&Vector3::from(*values))
}

fn check_diagonal(name: &str, values: &[f64; 3]) -> Result<()> {
    if !all_finite(values) || values.iter().any(|&v| v < 0.0) {
        return Err(Error::InvalidConfig(format!(
            "{} must be finite and non-negative, got {:?}",
            name, values
        )));
    }
    Ok(())
}

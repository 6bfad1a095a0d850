//! Kalman filtering for tag poses.
//!
//! This module provides:
//! - `Predictor` / `Updater` - the two halves of the recursion, as traits
//! - `ExtendedKalmanFilter` - static-model EKF over `(x, y, θ)`
//! - `FilterParams` - noise, initial covariance and sample period

mod traits;
mod params;
mod ekf;

pub use traits::{Estimate, Filter, Predictor, Updater};
pub use params::{
    FilterParams, DEFAULT_DT, DEFAULT_INITIAL_COVARIANCE, DEFAULT_MEASUREMENT_NOISE,
    DEFAULT_PROCESS_NOISE,
};
pub use ekf::{ExtendedKalmanFilter, THETA};

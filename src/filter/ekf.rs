//! Extended Kalman filter for `(x, y, θ)` tag poses.
//!
//! The motion model is static (`f(x) = x`) and the sensor observes the full
//! state (`h(x) = x`), so both Jacobians are the identity. The general EKF
//! form is kept so the recursion reads the same as any other model would:
//!
//! ```text
//! predict:  x⁻ = f(x)            P⁻ = F P Fᵀ + Q
//! update:   S  = H P⁻ Hᵀ + R     K  = P⁻ Hᵀ S⁺
//!           x  = x⁻ + K y        P  = (I − K H) P⁻
//! ```
//!
//! `S⁺` is a pseudo-inverse, so a singular innovation covariance silently
//! produces a degraded gain instead of an error. The angular residual is
//! wrapped into `[0, 360)` rather than to the shortest signed distance.

use nalgebra::{Matrix3, Vector3};

use super::params::FilterParams;
use super::traits::{Estimate, Predictor, Updater};
use crate::Result;
use crate::internal::linalg::pseudo_inverse;
use crate::utils::{normalize_angle, warn_once};

/// Index of the orientation component in the state vector.
pub const THETA: usize = 2;

/// EKF holding the process parameters shared by all tag tracks.
#[derive(Clone, Debug)]
pub struct ExtendedKalmanFilter {
    /// Process noise covariance
    q: Matrix3<f64>,
    /// Measurement noise covariance
    r: Matrix3<f64>,
    /// Nominal sample period (unused by the static model)
    dt: f64,
}

impl ExtendedKalmanFilter {
    /// Create a filter from the given parameters.
    ///
    /// Returns [`Error::InvalidConfig`](crate::Error::InvalidConfig) when any
    /// noise term is negative or non-finite, or `dt` is not positive.
    pub fn new(params: &FilterParams) -> Result<Self> {
        params.validate()?;
        Ok(Self::from_params(params))
    }

    fn from_params(params: &FilterParams) -> Self {
        Self {
            q: params.q(),
            r: params.r(),
            dt: params.dt,
        }
    }

    /// State transition function. Static model: the tag does not move between samples.
    #[inline]
    pub fn transition(&self, x: &Vector3<f64>) -> Vector3<f64> {
        *x
    }

    /// Jacobian of the transition function.
    #[inline]
    pub fn transition_jacobian(&self, _x: &Vector3<f64>) -> Matrix3<f64> {
        Matrix3::identity()
    }

    /// Jacobian of the measurement function (full-state observation).
    #[inline]
    pub fn observation_jacobian(&self, _x: &Vector3<f64>) -> Matrix3<f64> {
        Matrix3::identity()
    }

    /// Residual between a measurement and the predicted state.
    ///
    /// Position components are plain differences; the angle difference is
    /// wrapped with [`normalize_angle`], so 358° against 2° gives 356°.
    pub fn residual(&self, measurement: &Vector3<f64>, predicted: &Vector3<f64>) -> Vector3<f64> {
        let mut y = measurement - predicted;
        y[THETA] = normalize_angle(measurement[THETA] - predicted[THETA]);
        y
    }

    /// Process noise covariance `Q`.
    pub fn q(&self) -> &Matrix3<f64> {
        &self.q
    }

    /// Measurement noise covariance `R`.
    pub fn r(&self) -> &Matrix3<f64> {
        &self.r
    }

    /// Nominal sample period.
    pub fn dt(&self) -> f64 {
        self.dt
    }
}

impl Default for ExtendedKalmanFilter {
    fn default() -> Self {
        Self::from_params(&FilterParams::default())
    }
}

impl Predictor for ExtendedKalmanFilter {
    fn predict(&self, estimate: &Estimate) -> Estimate {
        let f = self.transition_jacobian(&estimate.state);
        let state = self.transition(&estimate.state);
        let covariance = f * estimate.covariance * f.transpose() + self.q;
        Estimate::new(state, covariance)
    }
}

impl Updater for ExtendedKalmanFilter {
    fn update(&self, predicted: &Estimate, measurement: &Vector3<f64>) -> Estimate {
        let h = self.observation_jacobian(&predicted.state);
        let p = &predicted.covariance;

        // S = H @ P @ H.T + R (innovation covariance)
        let s = h * p * h.transpose() + self.r;

        // K = P @ H.T @ S^+ (Kalman gain)
        let s_pinv = pseudo_inverse(&s);
        if !s_pinv.is_full_rank() {
            warn_once("innovation covariance is rank deficient; Kalman gain is degraded");
        }
        let k = p * h.transpose() * s_pinv.matrix;

        let y = self.residual(measurement, &predicted.state);

        let mut state = predicted.state + k * y;
        state[THETA] = normalize_angle(state[THETA]);

        let covariance = (Matrix3::identity() - k * h) * p;

        log::trace!(
            "ekf update: residual={:?} gain_diag={:?}",
            y.as_slice(),
            k.diagonal().as_slice()
        );

        Estimate::new(state, covariance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::filter::params::{DEFAULT_MEASUREMENT_NOISE, DEFAULT_PROCESS_NOISE};
    use approx::assert_relative_eq;

    fn initial(x: f64, y: f64, theta: f64) -> Estimate {
        Estimate::new(Vector3::new(x, y, theta), FilterParams::default().p0())
    }

    // ===== Predict tests =====

    #[test]
    fn test_predict_keeps_state_and_adds_process_noise() {
        let ekf = ExtendedKalmanFilter::default();
        let predicted = ekf.predict(&initial(200.0, 150.0, 30.0));

        assert_eq!(predicted.state, Vector3::new(200.0, 150.0, 30.0));
        assert_relative_eq!(predicted.covariance[(0, 0)], 1.55, epsilon = 1e-12);
        assert_relative_eq!(predicted.covariance[(1, 1)], 1.05, epsilon = 1e-12);
        assert_relative_eq!(predicted.covariance[(2, 2)], 0.652, epsilon = 1e-12);
        assert_relative_eq!(predicted.covariance[(0, 1)], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_predict_preserves_off_diagonal_terms() {
        let ekf = ExtendedKalmanFilter::default();
        let mut estimate = initial(0.0, 0.0, 0.0);
        estimate.covariance[(0, 1)] = 0.3;
        estimate.covariance[(1, 0)] = 0.3;

        let predicted = ekf.predict(&estimate);
        assert_relative_eq!(predicted.covariance[(0, 1)], 0.3, epsilon = 1e-12);
        assert_relative_eq!(predicted.covariance[(1, 0)], 0.3, epsilon = 1e-12);
    }

    // ===== Update tests =====

    #[test]
    fn test_update_second_frame_reference_values() {
        let ekf = ExtendedKalmanFilter::default();
        let predicted = ekf.predict(&initial(200.0, 150.0, 30.0));
        let updated = ekf.update(&predicted, &Vector3::new(204.0, 146.0, 32.0));

        // K = P⁻ / S elementwise on the diagonal
        let k = Vector3::new(1.55 / 1.56, 1.05 / 1.06, 0.652 / 0.657);
        assert_relative_eq!(updated.state[0], 200.0 + 4.0 * k[0], epsilon = 1e-9);
        assert_relative_eq!(updated.state[1], 150.0 - 4.0 * k[1], epsilon = 1e-9);
        assert_relative_eq!(updated.state[2], 30.0 + 2.0 * k[2], epsilon = 1e-9);

        assert_relative_eq!(updated.state[0], 203.974359, epsilon = 1e-6);
        assert_relative_eq!(updated.state[1], 146.037736, epsilon = 1e-6);
        assert_relative_eq!(updated.state[2], 31.984779, epsilon = 1e-6);

        assert_relative_eq!(updated.covariance[(0, 0)], (1.0 - k[0]) * 1.55, epsilon = 1e-12);
        assert_relative_eq!(updated.covariance[(1, 1)], (1.0 - k[1]) * 1.05, epsilon = 1e-12);
        assert_relative_eq!(updated.covariance[(2, 2)], (1.0 - k[2]) * 0.652, epsilon = 1e-12);
    }

    #[test]
    fn test_update_angle_residual_wraps_the_long_way() {
        let ekf = ExtendedKalmanFilter::default();
        let predicted = ekf.predict(&initial(0.0, 0.0, 2.0));

        let y = ekf.residual(&Vector3::new(0.0, 0.0, 358.0), &predicted.state);
        assert_relative_eq!(y[THETA], 356.0, epsilon = 1e-12);

        let updated = ekf.update(&predicted, &Vector3::new(0.0, 0.0, 358.0));
        let k = 0.652 / 0.657;
        // 2 + 356 K lands just short of 358 instead of staying near 0
        assert_relative_eq!(updated.state[THETA], 2.0 + 356.0 * k, epsilon = 1e-9);
        assert!(updated.state[THETA] > 350.0 && updated.state[THETA] < 358.0);
    }

    #[test]
    fn test_update_small_negative_angle_residual() {
        let ekf = ExtendedKalmanFilter::default();
        let predicted = ekf.predict(&initial(0.0, 0.0, 30.0));

        // 29 - 30 wraps to 359, and the corrected angle wraps back into range
        let updated = ekf.update(&predicted, &Vector3::new(0.0, 0.0, 29.0));
        let k = 0.652 / 0.657;
        let expected = normalize_angle(30.0 + 359.0 * k);
        assert_relative_eq!(updated.state[THETA], expected, epsilon = 1e-9);
        assert!(updated.state[THETA] >= 0.0 && updated.state[THETA] < 360.0);
    }

    #[test]
    fn test_update_singular_innovation_gives_zero_gain() {
        let params = FilterParams {
            process_noise: [0.0; 3],
            measurement_noise: [0.0; 3],
            initial_covariance: [0.0; 3],
            ..FilterParams::default()
        };
        let ekf = ExtendedKalmanFilter::new(&params).unwrap();
        let estimate = Estimate::new(Vector3::new(10.0, 20.0, 30.0), params.p0());

        let predicted = ekf.predict(&estimate);
        let updated = ekf.update(&predicted, &Vector3::new(50.0, 60.0, 70.0));

        // S = 0, so S⁺ = 0 and the measurement is ignored
        assert_eq!(updated.state, Vector3::new(10.0, 20.0, 30.0));
        assert_eq!(updated.covariance, Matrix3::zeros());
    }

    #[test]
    fn test_update_partially_singular_innovation() {
        let params = FilterParams {
            process_noise: [0.55, 0.05, 0.0],
            measurement_noise: [0.01, 0.01, 0.0],
            initial_covariance: [1.0, 1.0, 0.0],
            ..FilterParams::default()
        };
        let ekf = ExtendedKalmanFilter::new(&params).unwrap();
        let estimate = Estimate::new(Vector3::new(10.0, 20.0, 30.0), params.p0());

        let predicted = ekf.predict(&estimate);
        let updated = ekf.update(&predicted, &Vector3::new(12.0, 18.0, 90.0));

        assert!(updated.state[0] > 11.9);
        assert!(updated.state[1] < 18.1);
        assert_relative_eq!(updated.state[THETA], 30.0, epsilon = 1e-9);
    }

    #[test]
    fn test_repeated_measurement_converges() {
        let ekf = ExtendedKalmanFilter::default();
        let target = Vector3::new(320.0, 240.0, 90.0);
        let mut estimate = initial(300.0, 250.0, 80.0);
        let mut last_trace = f64::INFINITY;

        for _ in 0..20 {
            let predicted = ekf.predict(&estimate);
            estimate = ekf.update(&predicted, &target);

            let trace = estimate.covariance.trace();
            assert!(trace <= last_trace + 1e-12, "trace grew: {} -> {}", last_trace, trace);
            last_trace = trace;
        }

        assert_relative_eq!(estimate.state[0], 320.0, epsilon = 1e-6);
        assert_relative_eq!(estimate.state[1], 240.0, epsilon = 1e-6);
        assert_relative_eq!(estimate.state[THETA], 90.0, epsilon = 1e-6);
    }

    #[test]
    fn test_steady_state_covariance_matches_riccati_fixed_point() {
        // Scalar DARE for F = H = 1: P = (P + q) r / (P + q + r)
        let ekf = ExtendedKalmanFilter::default();
        let mut estimate = initial(0.0, 0.0, 0.0);
        for _ in 0..100 {
            let predicted = ekf.predict(&estimate);
            estimate = ekf.update(&predicted, &Vector3::zeros());
        }

        for i in 0..3 {
            let (q, r) = (DEFAULT_PROCESS_NOISE[i], DEFAULT_MEASUREMENT_NOISE[i]);
            // P² + qP − qr = 0, positive root
            let p = (-q + (q * q + 4.0 * q * r).sqrt()) / 2.0;
            assert_relative_eq!(estimate.covariance[(i, i)], p, epsilon = 1e-9);
        }
    }

    // ===== Parameter tests =====

    #[test]
    fn test_new_rejects_non_finite_parameters() {
        let nan_r = FilterParams {
            measurement_noise: [f64::NAN, 0.01, 0.005],
            ..FilterParams::default()
        };
        assert!(matches!(
            ExtendedKalmanFilter::new(&nan_r),
            Err(Error::InvalidConfig(_))
        ));

        let inf_q = FilterParams {
            process_noise: [0.55, f64::INFINITY, 0.552],
            ..FilterParams::default()
        };
        assert!(matches!(
            ExtendedKalmanFilter::new(&inf_q),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_update_with_non_finite_covariance_does_not_panic() {
        let ekf = ExtendedKalmanFilter::default();
        let mut estimate = initial(10.0, 20.0, 30.0);
        estimate.covariance[(0, 0)] = f64::NAN;

        let predicted = ekf.predict(&estimate);
        let updated = ekf.update(&predicted, &Vector3::new(50.0, 60.0, 70.0));

        // S is not finite, so S⁺ is zero and the clean axes ignore the measurement
        assert_eq!(updated.state[1], 20.0);
        assert_eq!(updated.state[THETA], 30.0);
    }
}

//! # tagtrack - Fiducial Tag Pose Smoothing
//!
//! Per-tag Extended Kalman Filter tracking for fiducial marker detections.
//!
//! Every tag identity reported by a marker detector gets its own track holding
//! a `(x, y, θ)` estimate in pixels and degrees plus a 3×3 covariance. Tracks
//! are created on first sighting, refined by a predict/update cycle on every
//! later frame that reports them, and dropped the first frame they go missing.
//!
//! ## Features
//!
//! - Static-model EKF with pseudo-inverse gain computation
//! - Keyed track store with immediate, memoryless pruning
//! - Orientation from detector corner geometry
//! - Wire formatting of filtered poses for downstream consumers
//!
//! ## Example
//!
//! ```rust
//! use tagtrack_rs::{Measurement, Tracker, TrackerConfig};
//!
//! let mut tracker = Tracker::new(TrackerConfig::default()).unwrap();
//!
//! let frame = vec![Measurement::new(7, [200.0, 150.0], 30.0).unwrap()];
//! let poses = tracker.update(&frame);
//! assert_eq!(poses[0].x, 200.0);
//! ```

// Internal modules (fixed-size linear algebra helpers)
pub(crate) mod internal;

// Public modules
pub mod filter;
pub mod detection;
pub mod track;
pub mod store;
pub mod tracker;
pub mod pose;
pub mod utils;

// Re-exports for convenience
pub use detection::{Measurement, TagId};
pub use filter::{Estimate, ExtendedKalmanFilter, Filter, FilterParams, Predictor, Updater};
pub use pose::{FrameSize, TagPose};
pub use store::TrackStore;
pub use track::Track;
pub use tracker::{Tracker, TrackerConfig};

// Error types
pub use crate::error::{Error, Result};

mod error {
    use thiserror::Error;

    /// Errors that can occur while configuring the tracker or building inputs.
    #[derive(Error, Debug)]
    pub enum Error {
        #[error("Invalid configuration: {0}")]
        InvalidConfig(String),

        #[error("Invalid measurement: {0}")]
        InvalidMeasurement(String),

        #[error("IO error: {0}")]
        Io(#[from] std::io::Error),

        #[error("Config parse error: {0}")]
        Parse(#[from] serde_json::Error),
    }

    /// Result type for tagtrack operations
    pub type Result<T> = std::result::Result<T, Error>;
}

//! Main tracker implementation.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::filter::{ExtendedKalmanFilter, Filter, FilterParams};
use crate::store::TrackStore;
use crate::{Measurement, TagId, TagPose, Track, Result};

/// Configuration for the tracker.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Filter noise, initial covariance and sample period.
    pub filter: FilterParams,
}

impl TrackerConfig {
    /// Create a configuration with the given filter parameters.
    pub fn new(filter: FilterParams) -> Self {
        Self { filter }
    }

    /// Parse a configuration from JSON; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Check every parameter.
    pub fn validate(&self) -> Result<()> {
        self.filter.validate()
    }
}

/// Multi-tag tracker.
///
/// Keeps one track per tag identity. Each frame, tags seen for the first time
/// start a track from their raw measurement, tags seen before are predicted
/// and corrected, and tags missing from the frame are dropped immediately.
/// A tag that comes back after a gap starts over as a new track.
pub struct Tracker<F: Filter = ExtendedKalmanFilter> {
    /// Tracker configuration.
    pub config: TrackerConfig,

    /// Filter shared by every track.
    filter: F,

    /// Live tracks.
    store: TrackStore,

    /// Frames processed since creation or the last reset.
    frame_count: u64,

    /// Tags already warned about for appearing twice in one frame.
    warned_duplicates: HashSet<TagId>,
}

impl Tracker {
    /// Create a tracker running the EKF built from `config.filter`.
    pub fn new(config: TrackerConfig) -> Result<Self> {
        let filter = ExtendedKalmanFilter::new(&config.filter)?;
        Ok(Self::from_parts(config, filter))
    }
}

impl<F: Filter> Tracker<F> {
    /// Create a tracker with a custom filter.
    ///
    /// `config.filter.initial_covariance` still sets the covariance of new tracks.
    pub fn with_filter(config: TrackerConfig, filter: F) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(config, filter))
    }

    fn from_parts(config: TrackerConfig, filter: F) -> Self {
        let store = TrackStore::new(config.filter.p0());
        Self {
            config,
            filter,
            store,
            frame_count: 0,
            warned_duplicates: HashSet::new(),
        }
    }

    /// Process one frame of measurements.
    ///
    /// # Arguments
    /// * `measurements` - Every tag detected in this frame
    ///
    /// # Returns
    /// One filtered pose per measurement, in input order. First sightings
    /// return the raw measurement.
    pub fn update(&mut self, measurements: &[Measurement]) -> Vec<TagPose> {
        self.frame_count += 1;

        let mut seen: HashSet<TagId> = HashSet::with_capacity(measurements.len());
        let mut poses = Vec::with_capacity(measurements.len());

        for measurement in measurements {
            if !seen.insert(measurement.id) && self.warned_duplicates.insert(measurement.id) {
                log::warn!(
                    "tag {} reported more than once in a frame; later detections refine earlier ones",
                    measurement.id
                );
            }

            let (track, created) = self.store.get_or_create(measurement);
            if created {
                log::debug!(
                    "frame {}: new track for tag {} at ({:.1}, {:.1}) {:.1}°",
                    self.frame_count,
                    track.id,
                    track.x(),
                    track.y(),
                    track.theta()
                );
            } else {
                let predicted = self.filter.predict(&track.estimate());
                let corrected = self.filter.update(&predicted, &measurement.as_vector());
                track.apply(corrected);
            }

            poses.push(TagPose::from(&*track));
        }

        for id in self.store.retain_ids(&seen) {
            log::debug!("frame {}: tag {} lost, dropping track", self.frame_count, id);
        }

        poses
    }

    /// Live tracks.
    pub fn tracks(&self) -> &TrackStore {
        &self.store
    }

    /// Track for a single tag, if it is currently tracked.
    pub fn track(&self, id: TagId) -> Option<&Track> {
        self.store.get(id)
    }

    /// Number of tags currently tracked.
    pub fn current_track_count(&self) -> usize {
        self.store.len()
    }

    /// Frames processed since creation or the last reset.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// The filter shared by every track.
    pub fn filter(&self) -> &F {
        &self.filter
    }

    /// Forget every track and restart the frame counter.
    ///
    /// Duplicate-id warnings are re-armed as well.
    pub fn reset(&mut self) {
        self.store.clear();
        self.frame_count = 0;
        self.warned_duplicates.clear();
    }
}

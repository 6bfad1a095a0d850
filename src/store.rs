//! Keyed collection of tracks owning their lifecycle.

use std::collections::{HashMap, HashSet};

use nalgebra::Matrix3;

use crate::detection::{Measurement, TagId};
use crate::filter::FilterParams;
use crate::track::Track;

/// All live tracks of one tracking session, keyed by tag id.
///
/// This is the single source of truth for which tags are currently tracked;
/// nothing else creates or removes tracks.
#[derive(Clone, Debug)]
pub struct TrackStore {
    tracks: HashMap<TagId, Track>,
    initial_covariance: Matrix3<f64>,
}

impl TrackStore {
    /// Create an empty store whose new tracks start with `initial_covariance`.
    pub fn new(initial_covariance: Matrix3<f64>) -> Self {
        Self {
            tracks: HashMap::new(),
            initial_covariance,
        }
    }

    /// Return the track for `measurement.id`, creating it from the measurement if absent.
    ///
    /// The flag is `true` when the track was created by this call.
    pub fn get_or_create(&mut self, measurement: &Measurement) -> (&mut Track, bool) {
        let initial_covariance = self.initial_covariance;
        let mut created = false;
        let track = self.tracks.entry(measurement.id).or_insert_with(|| {
            created = true;
            Track::new(measurement, initial_covariance)
        });
        (track, created)
    }

    /// Delete the track for `id`, if any.
    pub fn remove(&mut self, id: TagId) -> Option<Track> {
        self.tracks.remove(&id)
    }

    /// Identities currently tracked.
    pub fn active_ids(&self) -> HashSet<TagId> {
        self.tracks.keys().copied().collect()
    }

    /// Remove every track whose id is not in `keep`, returning the removed ids.
    pub fn retain_ids(&mut self, keep: &HashSet<TagId>) -> Vec<TagId> {
        let stale: Vec<TagId> = self.active_ids().difference(keep).copied().collect();
        for id in &stale {
            self.remove(*id);
        }
        stale
    }

    pub fn get(&self, id: TagId) -> Option<&Track> {
        self.tracks.get(&id)
    }

    pub fn contains(&self, id: TagId) -> bool {
        self.tracks.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Iterate over live tracks in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }

    /// Drop every track.
    pub fn clear(&mut self) {
        self.tracks.clear();
    }

    /// Covariance given to newly created tracks.
    pub fn initial_covariance(&self) -> &Matrix3<f64> {
        &self.initial_covariance
    }
}

impl Default for TrackStore {
    fn default() -> Self {
        Self::new(FilterParams::default().p0())
    }
}

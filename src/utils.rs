//! Utility functions for tagtrack.

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::OnceLock;

/// Full turn in degrees.
pub const FULL_TURN_DEG: f64 = 360.0;

/// Wrap an angle in degrees into `[0, 360)`.
///
/// This is a plain modulo: it keeps the representative in range but does not
/// pick the shortest signed distance, so `normalize_angle(358.0 - 2.0)` is
/// `356.0`, not `-4.0`.
#[inline]
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(FULL_TURN_DEG);
    // Tiny negative inputs round up to exactly 360.0
    if wrapped >= FULL_TURN_DEG {
        0.0
    } else {
        wrapped
    }
}

/// Check that every value in a slice is finite.
pub fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

/// Global set of warned messages (for warn_once).
static WARNED_MESSAGES: OnceLock<Mutex<HashSet<String>>> = OnceLock::new();

/// Log a warning message only once.
///
/// Subsequent calls with the same message are ignored.
pub fn warn_once(message: &str) {
    let warned = WARNED_MESSAGES.get_or_init(|| Mutex::new(HashSet::new()));
    if let Ok(mut guard) = warned.lock() {
        if guard.insert(message.to_string()) {
            log::warn!("{}", message);
        }
    }
}

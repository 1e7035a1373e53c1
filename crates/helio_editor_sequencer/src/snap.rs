// SPDX-License-Identifier: MIT OR Apache-2.0
//! Time snapping: interval grid and nearest-key snap.

use crate::selection::Selection;
use crate::sequence::Sequence;
use serde::{Deserialize, Serialize};

/// Which snaps a time-set operation requests.
///
/// Requests are filtered through [`SnapSettings`]; a requested snap only
/// applies when the corresponding setting enables it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SnapMode {
    /// Quantize to the snap interval grid.
    pub interval: bool,
    /// Snap to the nearest key of the current selection.
    pub keys: bool,
}

impl SnapMode {
    /// No snapping.
    pub const NONE: Self = Self {
        interval: false,
        keys: false,
    };
    /// Interval snapping only.
    pub const INTERVAL: Self = Self {
        interval: true,
        keys: false,
    };
    /// Key snapping only.
    pub const KEYS: Self = Self {
        interval: false,
        keys: true,
    };
    /// Interval and key snapping.
    pub const ALL: Self = Self {
        interval: true,
        keys: true,
    };
}

/// User-configurable snap behavior.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SnapSettings {
    /// Whether interval snapping is enabled.
    pub interval_snap_enabled: bool,
    /// Grid spacing in seconds, commonly one frame duration.
    pub snap_interval: f32,
    /// Whether snap-to-keys is enabled.
    pub snap_to_keys_enabled: bool,
    /// Modifier-key override that forces key snapping for one operation.
    pub key_snap_override: bool,
}

impl Default for SnapSettings {
    fn default() -> Self {
        Self {
            interval_snap_enabled: true,
            snap_interval: 1.0 / 30.0,
            snap_to_keys_enabled: false,
            key_snap_override: false,
        }
    }
}

impl SnapSettings {
    /// Derive the snap interval from a frame rate.
    pub fn set_frame_rate(&mut self, frame_rate: f32) {
        self.snap_interval = 1.0 / frame_rate;
    }

    /// Whether a key-snap request should be honored.
    pub fn wants_key_snap(&self) -> bool {
        self.snap_to_keys_enabled || self.key_snap_override
    }
}

/// Quantize `time` to the nearest multiple of `interval`.
pub fn snap_to_interval(time: f32, interval: f32) -> f32 {
    if interval <= 0.0 {
        return time;
    }
    (time / interval).round() * interval
}

/// A queryable set of key times, built lazily over the current selection.
///
/// Built from the selected tracks, or from every track when nothing is
/// selected. Invalidated whenever sequence data or the selection changes.
#[derive(Debug, Clone, Default)]
pub struct KeyCollection {
    times: Vec<f32>,
}

impl KeyCollection {
    /// Build from a sequence and the current selection.
    pub fn from_selection(sequence: &Sequence, selection: &Selection) -> Self {
        let mut times: Vec<f32> = sequence
            .tracks()
            .filter(|t| selection.tracks.is_empty() || selection.tracks.contains(&t.id))
            .flat_map(|t| t.keyframes().iter().map(|k| k.time))
            .collect();
        times.sort_by(f32::total_cmp);
        Self { times }
    }

    /// Whether the collection holds any keys.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Nearest key at or before `time`.
    pub fn key_at_or_before(&self, time: f32) -> Option<f32> {
        let idx = self.times.partition_point(|&t| t <= time);
        idx.checked_sub(1).map(|i| self.times[i])
    }

    /// Nearest key at or after `time`.
    pub fn key_at_or_after(&self, time: f32) -> Option<f32> {
        let idx = self.times.partition_point(|&t| t < time);
        self.times.get(idx).copied()
    }

    /// Nearest key in either direction. When a key lies equidistant on both
    /// sides, the earlier key wins. With no keys at all, `time` is returned
    /// unchanged.
    pub fn find_nearest_key(&self, time: f32) -> f32 {
        match (self.key_at_or_before(time), self.key_at_or_after(time)) {
            (Some(before), Some(after)) => {
                if time - before <= after - time {
                    before
                } else {
                    after
                }
            }
            (Some(before), None) => before,
            (None, Some(after)) => after,
            (None, None) => time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::Track;
    use approx::assert_relative_eq;

    fn collection(times: &[f32]) -> KeyCollection {
        let mut sequence = Sequence::new("keys");
        let mut track = Track::new("t");
        for &t in times {
            track.add_keyframe(t);
        }
        sequence.add_track(track);
        KeyCollection::from_selection(&sequence, &Selection::default())
    }

    #[test]
    fn test_interval_snap() {
        assert_relative_eq!(snap_to_interval(1.04, 0.1), 1.0, epsilon = 1e-6);
        assert_relative_eq!(snap_to_interval(1.06, 0.1), 1.1, epsilon = 1e-6);
    }

    #[test]
    fn test_interval_snap_idempotent() {
        let once = snap_to_interval(3.7219, 1.0 / 30.0);
        let twice = snap_to_interval(once, 1.0 / 30.0);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_zero_interval_is_identity() {
        assert_eq!(snap_to_interval(1.23, 0.0), 1.23);
    }

    #[test]
    fn test_nearest_key_both_sides() {
        let keys = collection(&[1.0, 2.0, 4.0]);
        assert_eq!(keys.find_nearest_key(2.8), 2.0);
        assert_eq!(keys.find_nearest_key(3.2), 4.0);
    }

    #[test]
    fn test_nearest_key_tie_prefers_earlier() {
        let keys = collection(&[1.0, 3.0]);
        assert_eq!(keys.find_nearest_key(2.0), 1.0);
    }

    #[test]
    fn test_nearest_key_one_side_only() {
        let keys = collection(&[5.0]);
        assert_eq!(keys.find_nearest_key(0.0), 5.0);
        assert_eq!(keys.find_nearest_key(10.0), 5.0);
    }

    #[test]
    fn test_no_keys_returns_input() {
        let keys = collection(&[]);
        assert_eq!(keys.find_nearest_key(3.5), 3.5);
    }

    #[test]
    fn test_selection_filters_tracks() {
        let mut sequence = Sequence::new("keys");
        let mut a = Track::new("a");
        a.add_keyframe(1.0);
        let a_id = sequence.add_track(a);
        let mut b = Track::new("b");
        b.add_keyframe(100.0);
        sequence.add_track(b);

        let mut selection = Selection::default();
        selection.tracks.insert(a_id);

        let keys = KeyCollection::from_selection(&sequence, &selection);
        assert_eq!(keys.find_nearest_key(50.0), 1.0);
    }

    #[test]
    fn test_key_on_exact_time_is_at_or_before_and_after() {
        let keys = collection(&[2.0]);
        assert_eq!(keys.key_at_or_before(2.0), Some(2.0));
        assert_eq!(keys.key_at_or_after(2.0), Some(2.0));
    }
}

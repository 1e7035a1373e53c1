// SPDX-License-Identifier: MIT OR Apache-2.0
//! Minimal track model.
//!
//! Per-track-type evaluation logic lives in the host's track editors; the
//! engine itself only needs key times (for snapping) and event markers
//! (for one-shot triggering during time updates).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackId(pub Uuid);

impl TrackId {
    /// Create a new random track ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TrackId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for a keyframe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyframeId(pub Uuid);

impl KeyframeId {
    /// Create a new random keyframe ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for KeyframeId {
    fn default() -> Self {
        Self::new()
    }
}

/// A keyframe position on a track
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Keyframe {
    /// Unique keyframe ID
    pub id: KeyframeId,
    /// Time in seconds
    pub time: f32,
}

impl Keyframe {
    /// Create a new keyframe
    pub fn new(time: f32) -> Self {
        Self {
            id: KeyframeId::new(),
            time,
        }
    }
}

/// An event marker that fires once when playback crosses it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMarker {
    /// Marker ID
    pub id: Uuid,
    /// Time of the event
    pub time: f32,
    /// Event name/type
    pub name: String,
}

/// A track in a sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    /// Unique track ID
    pub id: TrackId,
    /// Track name
    pub name: String,
    /// Whether the track is muted
    pub muted: bool,
    /// Whether the track is locked against edits
    pub locked: bool,
    keyframes: Vec<Keyframe>,
    events: Vec<EventMarker>,
}

impl Track {
    /// Create a new track
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: TrackId::new(),
            name: name.into(),
            muted: false,
            locked: false,
            keyframes: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Add a keyframe at `time`
    pub fn add_keyframe(&mut self, time: f32) -> KeyframeId {
        let keyframe = Keyframe::new(time);
        let id = keyframe.id;
        self.keyframes.push(keyframe);
        self.sort_keyframes();
        id
    }

    /// Remove a keyframe
    pub fn remove_keyframe(&mut self, keyframe_id: KeyframeId) {
        self.keyframes.retain(|k| k.id != keyframe_id);
    }

    /// All keyframes, sorted by time
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Add an event marker
    pub fn add_event(&mut self, time: f32, name: impl Into<String>) -> Uuid {
        let id = Uuid::new_v4();
        self.events.push(EventMarker {
            id,
            time,
            name: name.into(),
        });
        self.events.sort_by(|a, b| a.time.total_cmp(&b.time));
        id
    }

    /// All event markers, sorted by time
    pub fn events(&self) -> &[EventMarker] {
        &self.events
    }

    /// Event markers with `start < time <= end`, the half-open window used
    /// so a forward time update fires each event exactly once.
    pub fn events_in_window(&self, start: f32, end: f32) -> impl Iterator<Item = &EventMarker> {
        self.events
            .iter()
            .filter(move |e| e.time > start && e.time <= end)
    }

    /// Time of the last keyframe, or zero for an empty track
    pub fn duration(&self) -> f32 {
        self.keyframes.last().map_or(0.0, |k| k.time)
    }

    fn sort_keyframes(&mut self) {
        self.keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyframes_stay_sorted() {
        let mut track = Track::new("Position");
        track.add_keyframe(3.0);
        track.add_keyframe(1.0);
        track.add_keyframe(2.0);
        let times: Vec<f32> = track.keyframes().iter().map(|k| k.time).collect();
        assert_eq!(times, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_events_in_window_is_half_open() {
        let mut track = Track::new("Events");
        track.add_event(1.0, "a");
        track.add_event(2.0, "b");
        track.add_event(3.0, "c");
        let fired: Vec<&str> = track
            .events_in_window(1.0, 3.0)
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(fired, vec!["b", "c"]);
    }

    #[test]
    fn test_remove_keyframe() {
        let mut track = Track::new("Position");
        let id = track.add_keyframe(1.0);
        track.add_keyframe(2.0);
        track.remove_keyframe(id);
        assert_eq!(track.keyframes().len(), 1);
    }
}

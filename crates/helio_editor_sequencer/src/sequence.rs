// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sequence data: the authoritative per-timeline edit state.

use crate::error::{Result, SequencerError};
use crate::range::TimeRange;
use crate::track::{Track, TrackId};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SequenceId(pub Uuid);

impl SequenceId {
    /// Create a new random sequence ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SequenceId {
    fn default() -> Self {
        Self::new()
    }
}

/// A (possibly nested) animatable timeline asset.
///
/// The playback and in/out ranges stored here are authoritative edit data;
/// the view and working ranges are presentation state owned by the
/// sequencer controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sequence {
    /// Unique sequence ID
    pub id: SequenceId,
    /// Sequence name
    pub name: String,
    /// Frame rate used for interval snapping and frame conversion
    pub frame_rate: f32,
    playback_range: TimeRange,
    in_out_range: TimeRange,
    tracks: IndexMap<TrackId, Track>,
}

impl Sequence {
    /// Create a new sequence with a default ten second playback range
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: SequenceId::new(),
            name: name.into(),
            frame_rate: 30.0,
            playback_range: TimeRange::new(0.0, 10.0),
            in_out_range: TimeRange::new(0.0, 10.0),
            tracks: IndexMap::new(),
        }
    }

    /// The authored start/end that playback and looping respect
    pub fn playback_range(&self) -> TimeRange {
        self.playback_range
    }

    /// Replace the playback range. Empty or degenerate ranges are rejected
    /// and prior state is kept.
    pub fn set_playback_range(&mut self, range: TimeRange) -> Result<()> {
        if range.is_empty() || range.is_degenerate() {
            return Err(SequencerError::DegenerateRange);
        }
        self.playback_range = range;
        Ok(())
    }

    /// The secondary region-of-interest range
    pub fn in_out_range(&self) -> TimeRange {
        self.in_out_range
    }

    /// Replace the in/out range. Empty or degenerate ranges are rejected.
    pub fn set_in_out_range(&mut self, range: TimeRange) -> Result<()> {
        if range.is_empty() || range.is_degenerate() {
            return Err(SequencerError::DegenerateRange);
        }
        self.in_out_range = range;
        Ok(())
    }

    /// Add a track
    pub fn add_track(&mut self, track: Track) -> TrackId {
        let id = track.id;
        self.tracks.insert(id, track);
        id
    }

    /// Remove a track
    pub fn remove_track(&mut self, track_id: TrackId) -> Option<Track> {
        self.tracks.swap_remove(&track_id)
    }

    /// Get a track
    pub fn track(&self, track_id: TrackId) -> Option<&Track> {
        self.tracks.get(&track_id)
    }

    /// Get a mutable track
    pub fn track_mut(&mut self, track_id: TrackId) -> Option<&mut Track> {
        self.tracks.get_mut(&track_id)
    }

    /// Get all tracks
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }

    /// Get track count
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Duration of one frame at the configured frame rate
    pub fn frame_duration(&self) -> f32 {
        1.0 / self.frame_rate
    }

    /// Convert time to the nearest frame number; times before zero map to
    /// frame zero.
    pub fn time_to_frame(&self, time: f32) -> u32 {
        (time * self.frame_rate).round().max(0.0) as u32
    }

    /// Convert frame number to time
    pub fn frame_to_time(&self, frame: u32) -> f32 {
        frame as f32 / self.frame_rate
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self::new("Untitled Sequence")
    }
}

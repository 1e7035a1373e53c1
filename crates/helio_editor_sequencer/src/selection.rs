// SPDX-License-Identifier: MIT OR Apache-2.0
//! Selection state over tracks and keyframes.

use crate::track::{KeyframeId, TrackId};
use std::collections::HashSet;

/// Current selection
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Selected tracks
    pub tracks: HashSet<TrackId>,
    /// Selected keyframes (`track_id`, `keyframe_id`)
    pub keyframes: HashSet<(TrackId, KeyframeId)>,
}

impl Selection {
    /// Clear the selection
    pub fn clear(&mut self) {
        self.tracks.clear();
        self.keyframes.clear();
    }

    /// Whether nothing is selected
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty() && self.keyframes.is_empty()
    }

    /// Select a track
    pub fn select_track(&mut self, track_id: TrackId) {
        self.tracks.insert(track_id);
    }

    /// Select a keyframe
    pub fn select_keyframe(&mut self, track_id: TrackId, keyframe_id: KeyframeId) {
        self.keyframes.insert((track_id, keyframe_id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_empties_everything() {
        let mut selection = Selection::default();
        selection.select_track(TrackId::new());
        selection.select_keyframe(TrackId::new(), KeyframeId::new());
        assert!(!selection.is_empty());
        selection.clear();
        assert!(selection.is_empty());
    }
}

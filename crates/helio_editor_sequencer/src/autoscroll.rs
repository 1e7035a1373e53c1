// SPDX-License-Identifier: MIT OR Apache-2.0
//! Autoscroll and autoscrub offsets.
//!
//! When the play head nears the edge of the visible window, the view pans
//! (autoscroll) and, while scrubbing, the scrub position advances with it
//! (autoscrub). Offsets computed here are applied each tick with damping by
//! the sequencer.

use crate::range::TimeRange;

/// Fraction of the view range used as the edge threshold during scrubbing.
pub const SCRUB_THRESHOLD_PCT: f32 = 0.025;

/// Fraction of the view range used as the edge threshold for direct time
/// sets with autoscroll enabled.
pub const SET_TIME_THRESHOLD_PCT: f32 = 0.1;

/// Computes pan/scrub offsets when the play head approaches the view edge.
#[derive(Debug, Default)]
pub struct AutoscrollController {
    autoscroll_offset: Option<f32>,
    autoscrub_offset: Option<f32>,
}

impl AutoscrollController {
    /// Pending view-range pan offset in seconds, unset when idle.
    pub fn autoscroll_offset(&self) -> Option<f32> {
        self.autoscroll_offset
    }

    /// Pending scrub advance offset in seconds, unset when idle.
    pub fn autoscrub_offset(&self) -> Option<f32> {
        self.autoscrub_offset
    }

    /// How far `new_time` encroaches into the edge threshold of `view`.
    ///
    /// The threshold is `view size * threshold_pct`. Movement direction
    /// comes from the sign of `new_time - previous`; a stationary play head
    /// never encroaches. Returns a negative offset at the lower edge, a
    /// positive offset at the upper edge, `None` strictly between
    /// `min + threshold` and `max - threshold`.
    pub fn calculate_encroachment(
        view: &TimeRange,
        new_time: f32,
        previous: f32,
        threshold_pct: f32,
    ) -> Option<f32> {
        let (min, max) = (view.lower_value()?, view.upper_value()?);
        let threshold = (max - min) * threshold_pct;
        let direction = new_time - previous;

        if direction < 0.0 && new_time < min + threshold {
            Some(new_time - (min + threshold))
        } else if direction > 0.0 && new_time > max - threshold {
            Some(new_time - (max - threshold))
        } else {
            None
        }
    }

    /// Update both offsets during interactive scrubbing.
    ///
    /// Uses the tighter scrub threshold. When autoscrub first engages, the
    /// returned value is the scrub position snapped to the threshold edge
    /// so subsequent deltas start from a consistent point. Both offsets are
    /// cleared when `new_time` sits within one threshold-width of the
    /// working range's extremes, which would otherwise pan without end.
    pub fn update_auto_scroll(
        &mut self,
        new_time: f32,
        previous: f32,
        view: &TimeRange,
        working: &TimeRange,
    ) -> Option<f32> {
        let threshold = view.size().unwrap_or(0.0) * SCRUB_THRESHOLD_PCT;

        if let (Some(w_min), Some(w_max)) = (working.lower_value(), working.upper_value()) {
            if new_time < w_min + threshold || new_time > w_max - threshold {
                self.autoscroll_offset = None;
                self.autoscrub_offset = None;
                return None;
            }
        }

        self.autoscroll_offset =
            Self::calculate_encroachment(view, new_time, previous, SCRUB_THRESHOLD_PCT);

        match self.autoscroll_offset {
            Some(offset) => {
                let snapped = if self.autoscrub_offset.is_none() {
                    // First engagement: align the scrub position with the
                    // threshold edge it crossed.
                    let (min, max) = (view.lower_value()?, view.upper_value()?);
                    Some(if offset < 0.0 {
                        min + threshold
                    } else {
                        max - threshold
                    })
                } else {
                    None
                };
                self.autoscrub_offset = Some(offset);
                snapped
            }
            None => {
                self.autoscrub_offset = None;
                None
            }
        }
    }

    /// Explicitly drive autoscroll at a fixed rate, bypassing threshold
    /// calculation. Used by UI drag handles at the view edges.
    pub fn start_autoscroll(&mut self, units_per_second: f32) {
        self.autoscroll_offset = Some(units_per_second);
    }

    /// Stop any explicit or threshold-driven autoscroll.
    pub fn stop_autoscroll(&mut self) {
        self.autoscroll_offset = None;
        self.autoscrub_offset = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_no_encroachment_inside_thresholds() {
        let view = TimeRange::new(0.0, 10.0);
        // threshold = 1.0 at 10%
        for t in [1.0, 2.0, 5.0, 8.9] {
            assert_eq!(
                AutoscrollController::calculate_encroachment(&view, t, t - 0.1, 0.1),
                None
            );
            assert_eq!(
                AutoscrollController::calculate_encroachment(&view, t, t + 0.1, 0.1),
                None
            );
        }
    }

    #[test]
    fn test_encroachment_at_upper_edge() {
        let view = TimeRange::new(0.0, 10.0);
        let offset = AutoscrollController::calculate_encroachment(&view, 9.5, 9.0, 0.1);
        assert_relative_eq!(offset.unwrap(), 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_encroachment_at_lower_edge_is_negative() {
        let view = TimeRange::new(0.0, 10.0);
        let offset = AutoscrollController::calculate_encroachment(&view, 0.25, 1.0, 0.1);
        assert_relative_eq!(offset.unwrap(), -0.75, epsilon = 1e-6);
    }

    #[test]
    fn test_direction_gates_encroachment() {
        let view = TimeRange::new(0.0, 10.0);
        // In the upper threshold zone but moving away from the edge.
        assert_eq!(
            AutoscrollController::calculate_encroachment(&view, 9.5, 9.8, 0.1),
            None
        );
        // Stationary.
        assert_eq!(
            AutoscrollController::calculate_encroachment(&view, 9.5, 9.5, 0.1),
            None
        );
    }

    #[test]
    fn test_scrub_snaps_to_threshold_edge_on_first_engage() {
        let mut ctrl = AutoscrollController::default();
        let view = TimeRange::new(0.0, 10.0);
        let working = TimeRange::new(-100.0, 100.0);
        // threshold = 0.25 at 2.5%
        let snapped = ctrl.update_auto_scroll(9.9, 9.0, &view, &working);
        assert_relative_eq!(snapped.unwrap(), 9.75, epsilon = 1e-6);
        assert!(ctrl.autoscrub_offset().is_some());

        // Already engaged: no further snapping.
        assert!(ctrl.update_auto_scroll(9.95, 9.9, &view, &working).is_none());
    }

    #[test]
    fn test_suppressed_near_working_range_extremes() {
        let mut ctrl = AutoscrollController::default();
        let view = TimeRange::new(0.0, 10.0);
        let working = TimeRange::new(0.0, 10.0);
        ctrl.start_autoscroll(1.0);
        let snapped = ctrl.update_auto_scroll(9.9, 9.0, &view, &working);
        assert!(snapped.is_none());
        assert!(ctrl.autoscroll_offset().is_none());
        assert!(ctrl.autoscrub_offset().is_none());
    }

    #[test]
    fn test_explicit_start_stop() {
        let mut ctrl = AutoscrollController::default();
        ctrl.start_autoscroll(2.0);
        assert_eq!(ctrl.autoscroll_offset(), Some(2.0));
        ctrl.stop_autoscroll();
        assert_eq!(ctrl.autoscroll_offset(), None);
    }
}

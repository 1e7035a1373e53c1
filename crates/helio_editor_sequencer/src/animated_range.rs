// SPDX-License-Identifier: MIT OR Apache-2.0
//! Animated view-range transitions.
//!
//! Zooming or panning the visible time window eases toward its target over
//! a short fixed duration instead of snapping. Collaborators that need the
//! intended window read [`AnimatedViewRange::target`]; only presentation
//! reads the interpolated [`AnimatedViewRange::current`].

use crate::range::{TimeBound, TimeRange};
use serde::{Deserialize, Serialize};

/// Duration of a view-range ease, in seconds.
const ANIMATION_DURATION: f32 = 0.1;

/// How a view-range change is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RangeInterpolation {
    /// Snap to the new range, cancelling any in-flight animation.
    #[default]
    Immediate,
    /// Ease toward the new range over the fixed animation duration.
    Animated,
}

/// A view range that converges toward its target with a quadratic ease-in.
#[derive(Debug, Clone)]
pub struct AnimatedViewRange {
    /// Range the animation started from.
    start: TimeRange,
    /// Range being converged toward.
    target: TimeRange,
    /// Normalized animation progress in `[0, 1]`.
    progress: f32,
}

impl AnimatedViewRange {
    /// Create an idle controller resting at `range`.
    pub fn new(range: TimeRange) -> Self {
        Self {
            start: range,
            target: range,
            progress: 1.0,
        }
    }

    /// The intended range: always the last value passed to
    /// [`Self::set_target`], regardless of animation state.
    pub fn target(&self) -> TimeRange {
        self.target
    }

    /// The externally visible range, interpolated by eased progress.
    pub fn current(&self) -> TimeRange {
        if self.progress >= 1.0 {
            return self.target;
        }
        lerp_ranges(&self.start, &self.target, ease_in(self.progress))
    }

    /// Whether an animation is still converging.
    pub fn is_animating(&self) -> bool {
        self.progress < 1.0
    }

    /// Retarget the range.
    ///
    /// Animated retargeting while an ease is in flight restarts from the
    /// current interpolated value so the view never snaps.
    pub fn set_target(&mut self, range: TimeRange, interpolation: RangeInterpolation) {
        match interpolation {
            RangeInterpolation::Immediate => {
                self.start = range;
                self.target = range;
                self.progress = 1.0;
            }
            RangeInterpolation::Animated => {
                self.start = self.current();
                self.target = range;
                self.progress = 0.0;
            }
        }
    }

    /// Advance any in-flight animation by `delta_time` seconds.
    pub fn advance(&mut self, delta_time: f32) {
        if self.progress >= 1.0 {
            return;
        }
        self.progress = (self.progress + delta_time / ANIMATION_DURATION).min(1.0);
    }
}

fn ease_in(t: f32) -> f32 {
    t * t
}

fn lerp_ranges(a: &TimeRange, b: &TimeRange, t: f32) -> TimeRange {
    // View ranges are finite in practice; an unbounded side adopts the
    // target bound outright.
    let lower = match (a.lower_value(), b.lower_value()) {
        (Some(from), Some(to)) => TimeBound::Finite(from + (to - from) * t),
        _ => b.lower,
    };
    let upper = match (a.upper_value(), b.upper_value()) {
        (Some(from), Some(to)) => TimeBound::Finite(from + (to - from) * t),
        _ => b.upper,
    };
    TimeRange { lower, upper }
}

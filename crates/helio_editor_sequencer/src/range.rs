// SPDX-License-Identifier: MIT OR Apache-2.0
//! Time range model used by the sequencer.
//!
//! View, working (clamp), playback and in/out ranges are all [`TimeRange`]
//! values. Bounds are `f32` and may be unbounded on either side (the
//! effective playing bounds while recording are unbounded above).

use serde::{Deserialize, Serialize};

/// One bound of a [`TimeRange`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TimeBound {
    /// A finite bound value in seconds.
    Finite(f32),
    /// No bound in this direction.
    Unbounded,
}

impl TimeBound {
    /// Get the finite value, if any.
    pub fn value(self) -> Option<f32> {
        match self {
            Self::Finite(v) => Some(v),
            Self::Unbounded => None,
        }
    }
}

/// A closed time interval, possibly unbounded on either side.
///
/// Containment is closed on the lower bound. The upper bound is closed for
/// playback-range checks ([`TimeRange::contains`]) and open for autoscroll
/// threshold checks ([`TimeRange::contains_below_upper`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Lower bound.
    pub lower: TimeBound,
    /// Upper bound.
    pub upper: TimeBound,
}

impl TimeRange {
    /// Create a finite range.
    pub fn new(lower: f32, upper: f32) -> Self {
        Self {
            lower: TimeBound::Finite(lower),
            upper: TimeBound::Finite(upper),
        }
    }

    /// The range containing no values.
    pub fn empty() -> Self {
        Self::new(f32::INFINITY, f32::NEG_INFINITY)
    }

    /// The range containing every value.
    pub fn unbounded() -> Self {
        Self {
            lower: TimeBound::Unbounded,
            upper: TimeBound::Unbounded,
        }
    }

    /// Lower bound value, if finite.
    pub fn lower_value(&self) -> Option<f32> {
        self.lower.value()
    }

    /// Upper bound value, if finite.
    pub fn upper_value(&self) -> Option<f32> {
        self.upper.value()
    }

    /// Both bounds are finite and inverted, so no value is contained.
    pub fn is_empty(&self) -> bool {
        match (self.lower, self.upper) {
            (TimeBound::Finite(l), TimeBound::Finite(u)) => l > u,
            _ => false,
        }
    }

    /// Both bounds are finite and equal.
    pub fn is_degenerate(&self) -> bool {
        match (self.lower, self.upper) {
            (TimeBound::Finite(l), TimeBound::Finite(u)) => l == u,
            _ => false,
        }
    }

    /// Both bounds are finite.
    pub fn is_finite(&self) -> bool {
        matches!(
            (self.lower, self.upper),
            (TimeBound::Finite(_), TimeBound::Finite(_))
        )
    }

    /// Size of the range; `None` if either bound is unbounded or the range
    /// is empty.
    pub fn size(&self) -> Option<f32> {
        match (self.lower, self.upper) {
            (TimeBound::Finite(l), TimeBound::Finite(u)) if l <= u => Some(u - l),
            _ => None,
        }
    }

    /// Closed-closed containment: `lower <= time <= upper`.
    pub fn contains(&self, time: f32) -> bool {
        !self.is_empty()
            && self.lower.value().map_or(true, |l| time >= l)
            && self.upper.value().map_or(true, |u| time <= u)
    }

    /// Closed-open containment: `lower <= time < upper`.
    pub fn contains_below_upper(&self, time: f32) -> bool {
        !self.is_empty()
            && self.lower.value().map_or(true, |l| time >= l)
            && self.upper.value().map_or(true, |u| time < u)
    }

    /// Smallest range containing both `self` and `other`.
    pub fn union(&self, other: &TimeRange) -> TimeRange {
        Self::hull(&[*self, *other])
    }

    /// Smallest range containing all inputs. Empty inputs are skipped; the
    /// hull of zero ranges is empty.
    pub fn hull(ranges: &[TimeRange]) -> TimeRange {
        let mut result = Self::empty();
        for range in ranges {
            if range.is_empty() {
                continue;
            }
            if result.is_empty() {
                result = *range;
                continue;
            }
            result.lower = match (result.lower, range.lower) {
                (TimeBound::Finite(a), TimeBound::Finite(b)) => TimeBound::Finite(a.min(b)),
                _ => TimeBound::Unbounded,
            };
            result.upper = match (result.upper, range.upper) {
                (TimeBound::Finite(a), TimeBound::Finite(b)) => TimeBound::Finite(a.max(b)),
                _ => TimeBound::Unbounded,
            };
        }
        result
    }

    /// Clamp a time into the range, leaving it unchanged past unbounded ends.
    pub fn clamp(&self, time: f32) -> f32 {
        let time = match self.lower {
            TimeBound::Finite(l) => time.max(l),
            TimeBound::Unbounded => time,
        };
        match self.upper {
            TimeBound::Finite(u) => time.min(u),
            TimeBound::Unbounded => time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_closed_closed() {
        let r = TimeRange::new(0.0, 10.0);
        assert!(r.contains(0.0));
        assert!(r.contains(10.0));
        assert!(r.contains(5.0));
        assert!(!r.contains(-0.1));
        assert!(!r.contains(10.1));
    }

    #[test]
    fn test_contains_closed_open() {
        let r = TimeRange::new(0.0, 10.0);
        assert!(r.contains_below_upper(0.0));
        assert!(!r.contains_below_upper(10.0));
        assert!(r.contains_below_upper(9.999));
    }

    #[test]
    fn test_empty_and_degenerate() {
        assert!(TimeRange::empty().is_empty());
        assert!(!TimeRange::empty().contains(0.0));
        assert!(TimeRange::new(3.0, 3.0).is_degenerate());
        assert!(!TimeRange::new(3.0, 3.0).is_empty());
        assert!(TimeRange::new(3.0, 3.0).contains(3.0));
        assert!(!TimeRange::new(0.0, 10.0).is_degenerate());
    }

    #[test]
    fn test_hull_of_nothing_is_empty() {
        assert!(TimeRange::hull(&[]).is_empty());
    }

    #[test]
    fn test_hull_skips_empty_inputs() {
        let hull = TimeRange::hull(&[TimeRange::empty(), TimeRange::new(2.0, 4.0)]);
        assert_eq!(hull, TimeRange::new(2.0, 4.0));
    }

    #[test]
    fn test_hull_spans_all_inputs() {
        let hull = TimeRange::hull(&[
            TimeRange::new(2.0, 4.0),
            TimeRange::new(-1.0, 1.0),
            TimeRange::new(3.0, 9.0),
        ]);
        assert_eq!(hull, TimeRange::new(-1.0, 9.0));
    }

    #[test]
    fn test_hull_with_unbounded_side() {
        let open = TimeRange {
            lower: TimeBound::Finite(0.0),
            upper: TimeBound::Unbounded,
        };
        let hull = TimeRange::hull(&[open, TimeRange::new(-5.0, 5.0)]);
        assert_eq!(hull.lower, TimeBound::Finite(-5.0));
        assert_eq!(hull.upper, TimeBound::Unbounded);
    }

    #[test]
    fn test_unbounded_contains_everything() {
        let r = TimeRange::unbounded();
        assert!(r.contains(f32::MIN));
        assert!(r.contains(f32::MAX));
        assert!(r.size().is_none());
    }

    #[test]
    fn test_clamp() {
        let r = TimeRange::new(0.0, 10.0);
        assert_eq!(r.clamp(-5.0), 0.0);
        assert_eq!(r.clamp(15.0), 10.0);
        assert_eq!(r.clamp(5.0), 5.0);
    }

    #[test]
    fn test_size() {
        assert_eq!(TimeRange::new(2.0, 7.5).size(), Some(5.5));
        assert!(TimeRange::empty().size().is_none());
    }
}

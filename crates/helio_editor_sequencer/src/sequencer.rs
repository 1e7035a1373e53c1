// SPDX-License-Identifier: MIT OR Apache-2.0
//! The sequencer controller: playback state machine, global time, ranges
//! and the nested-instance focus stack.
//!
//! The host calls [`Sequencer::tick`] once per frame. Within one tick the
//! ordering is fixed: autoscroll pan, then autoscrub advance, then the
//! looped-time rule, then instance evaluation and track-editor ticks.
//! Collaborators must re-query ranges every frame; the view range may be
//! mid-animation.

use crate::animated_range::{AnimatedViewRange, RangeInterpolation};
use crate::autoscroll::{AutoscrollController, SET_TIME_THRESHOLD_PCT};
use crate::error::{Result, SequencerError};
use crate::instance::{InstanceRef, InstanceStack, SequenceInstance};
use crate::range::TimeRange;
use crate::selection::Selection;
use crate::sequence::{Sequence, SequenceId};
use crate::snap::{snap_to_interval, KeyCollection, SnapMode, SnapSettings};
use crate::track::TrackId;
use crate::track_editor::{TrackEditor, TrackEditorRegistry};
use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::Rc;

/// Damping applied to autoscroll/autoscrub offsets each tick.
const AUTOSCROLL_DAMPING: f32 = 0.1;

/// Playback status. Exactly one is active; transitions happen only through
/// [`Sequencer::set_playback_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    /// Not advancing time
    #[default]
    Stopped,
    /// Playing forward
    Playing,
    /// Recording; playing with effectively unbounded time bounds
    Recording,
    /// Interactive scrub drag in progress
    Scrubbing,
    /// Stepping by a fixed increment
    Stepping,
    /// Jumping to a time bound
    Jumping,
}

impl PlaybackStatus {
    /// Whether this status advances time each tick.
    pub fn is_playing(self) -> bool {
        matches!(self, Self::Playing | Self::Recording)
    }
}

/// Notifications queued for the host, drained with
/// [`Sequencer::take_events`].
#[derive(Debug, Clone, PartialEq)]
pub enum SequencerEvent {
    /// Authoritative range/track data changed; downstream presentation must
    /// be recomputed.
    DataChanged,
    /// The scrub position was committed.
    TimeChanged {
        /// Position before the commit
        previous: f32,
        /// Position after the commit
        current: f32,
    },
    /// The playback status changed.
    PlaybackStatusChanged {
        /// Status before the transition
        previous: PlaybackStatus,
        /// Status after the transition
        current: PlaybackStatus,
    },
    /// A different sequence instance was focused.
    FocusChanged,
}

/// Timeline sequencer controller.
///
/// Owns the scrub position, the four time ranges, the instance focus stack
/// and the registered track editors. Single-threaded and tick-driven; every
/// operation runs to completion synchronously.
pub struct Sequencer {
    stack: InstanceStack,
    sub_instances: IndexMap<SequenceId, InstanceRef>,

    scrub_position: f32,
    playback_status: PlaybackStatus,
    looping_enabled: bool,
    keep_cursor_in_play_range: bool,
    time_dilation: f32,
    pre_play_time_dilation: Option<f32>,

    view_range: AnimatedViewRange,
    working_range: TimeRange,

    autoscroll_enabled: bool,
    autoscroll: AutoscrollController,

    snap_settings: SnapSettings,
    key_collection: Option<KeyCollection>,
    selection: Selection,

    track_editors: TrackEditorRegistry,
    events: Vec<SequencerEvent>,
    triggered_events: Vec<(TrackId, String)>,
}

impl Sequencer {
    /// Create a sequencer editing `root_sequence`. The root instance stays
    /// on the stack for the lifetime of the session.
    pub fn new(root_sequence: Rc<RefCell<Sequence>>) -> Self {
        let playback = root_sequence.borrow().playback_range();
        let frame_rate = root_sequence.borrow().frame_rate;
        let root = SequenceInstance::new_ref(root_sequence);

        let mut snap_settings = SnapSettings::default();
        snap_settings.set_frame_rate(frame_rate);

        Self {
            stack: InstanceStack::new(root),
            sub_instances: IndexMap::new(),
            scrub_position: playback.lower_value().unwrap_or(0.0),
            playback_status: PlaybackStatus::Stopped,
            looping_enabled: false,
            keep_cursor_in_play_range: false,
            time_dilation: 1.0,
            pre_play_time_dilation: None,
            view_range: AnimatedViewRange::new(playback),
            working_range: playback,
            autoscroll_enabled: false,
            autoscroll: AutoscrollController::default(),
            snap_settings,
            key_collection: None,
            selection: Selection::default(),
            track_editors: TrackEditorRegistry::default(),
            events: Vec::new(),
            triggered_events: Vec::new(),
        }
    }

    // --- per-frame update -------------------------------------------------

    /// Advance the sequencer by one frame. Not re-entrant.
    pub fn tick(&mut self, delta_time: f32) {
        if let Some(offset) = self.autoscroll.autoscroll_offset() {
            self.pan_view_immediate(offset * AUTOSCROLL_DAMPING);
        }
        if let Some(offset) = self.autoscroll.autoscrub_offset() {
            let position = self.scrub_position + offset * AUTOSCROLL_DAMPING;
            self.set_global_time_directly(position, SnapMode::NONE);
        }

        let candidate = self.scrub_position + delta_time * self.time_dilation;
        if self.playback_status.is_playing() {
            self.set_global_time_looped(candidate);
        }

        self.view_range.advance(delta_time);

        // Propagate the (possibly updated) time regardless of state.
        let last = self.stack.top().borrow().last_position();
        let triggered = self.stack.top().borrow_mut().update(self.scrub_position, last);
        self.triggered_events.extend(triggered);

        self.track_editors.tick_all(delta_time);
    }

    // --- global time ------------------------------------------------------

    /// The current scrub position.
    pub fn global_time(&self) -> f32 {
        self.scrub_position
    }

    /// The scrub position expressed in the focused instance's local time.
    ///
    /// Nested time mapping is the identity until sub-sequence sections
    /// carry their own start offsets.
    pub fn local_time(&self) -> f32 {
        self.scrub_position
    }

    /// Set the global time, panning the view first when autoscroll is
    /// enabled and the play head encroaches on a view edge.
    pub fn set_global_time(&mut self, time: f32, snap: SnapMode) {
        if self.autoscroll_enabled {
            let view = self.view_range.target();
            if let Some(offset) = AutoscrollController::calculate_encroachment(
                &view,
                time,
                self.scrub_position,
                SET_TIME_THRESHOLD_PCT,
            ) {
                if let (Some(lower), Some(upper)) = (view.lower_value(), view.upper_value()) {
                    let stays_inside = self.working_range.contains(lower + offset)
                        && self.working_range.contains(upper + offset);
                    if stays_inside {
                        self.view_range.set_target(
                            TimeRange::new(lower + offset, upper + offset),
                            RangeInterpolation::Immediate,
                        );
                    }
                }
            }
        }
        self.set_global_time_directly(time, snap);
    }

    /// Set the global time without touching the view range.
    ///
    /// Applies requested snaps as allowed by the snap settings, commits the
    /// new position, evaluates the focused instance over the old/new time
    /// window and prunes stale root bindings once the root's time has left
    /// the playback range.
    pub fn set_global_time_directly(&mut self, time: f32, snap: SnapMode) {
        let mut new_time = time;
        if snap.interval && self.snap_settings.interval_snap_enabled {
            new_time = snap_to_interval(new_time, self.snap_settings.snap_interval);
        }
        if snap.keys && self.snap_settings.wants_key_snap() {
            self.ensure_key_collection();
            if let Some(keys) = &self.key_collection {
                new_time = keys.find_nearest_key(new_time);
            }
        }

        let last_time = self.scrub_position;
        self.scrub_position = new_time;

        let triggered = self.stack.top().borrow_mut().update(new_time, last_time);
        self.triggered_events.extend(triggered);

        let root_playback = self
            .stack
            .root()
            .borrow()
            .sequence()
            .borrow()
            .playback_range();
        if !root_playback.contains(new_time) {
            self.stack.root().borrow_mut().prune_stale_bindings();
        }

        tracing::trace!(previous = last_time, current = new_time, "Committed scrub position");
        self.events.push(SequencerEvent::TimeChanged {
            previous: last_time,
            current: new_time,
        });
    }

    /// Commit a candidate time through the looped-time rule.
    ///
    /// A candidate before the lower playing bound is clamped up to the
    /// bound without interrupting playback. Looping wraps a single
    /// playback-range length past the upper bound. Without looping,
    /// exiting past the upper bound from inside stops playback at the
    /// bound; otherwise the cursor is kept inside the playback or working
    /// range per the configured flags.
    pub fn set_global_time_looped(&mut self, candidate: f32) {
        let bounds = self.time_bounds();
        if bounds.is_empty() {
            // No bounds at all; nothing sensible to play toward.
            self.set_playback_status(PlaybackStatus::Stopped);
            return;
        }

        let mut candidate = candidate;
        if let Some(lower) = bounds.lower_value() {
            if candidate < lower {
                candidate = lower;
            }
        }

        if self.looping_enabled {
            let mut new_time = candidate;
            if let (Some(upper), Some(size)) = (bounds.upper_value(), bounds.size()) {
                if new_time > upper {
                    new_time -= size;
                }
            }
            self.set_global_time_directly(new_time, SnapMode::NONE);
            return;
        }

        let was_inside = bounds.contains(self.scrub_position);
        if let Some(upper) = bounds.upper_value() {
            if was_inside && candidate > upper {
                self.set_global_time_directly(upper, SnapMode::NONE);
                self.set_playback_status(PlaybackStatus::Stopped);
                return;
            }
        }

        if self.keep_cursor_in_play_range {
            let mut new_time = candidate;
            if let (Some(lower), Some(upper)) = (bounds.lower_value(), bounds.upper_value()) {
                // Keep the cursor in [lower, upper), wrapping back to the
                // start when the upper bound is reached.
                if new_time >= upper {
                    new_time = lower;
                }
            }
            self.set_global_time_directly(new_time, SnapMode::NONE);
        } else if self.playback_status != PlaybackStatus::Recording
            && !self.working_range.contains(candidate)
        {
            let clamped = self.working_range.clamp(candidate);
            self.set_global_time_directly(clamped, SnapMode::NONE);
            self.set_playback_status(PlaybackStatus::Stopped);
        } else {
            self.set_global_time_directly(candidate, SnapMode::NONE);
        }
    }

    /// Effective playing bounds: the focused playback range, or unbounded
    /// while recording.
    pub fn time_bounds(&self) -> TimeRange {
        if self.playback_status == PlaybackStatus::Recording {
            return TimeRange::unbounded();
        }
        self.playback_range()
    }

    // --- playback status --------------------------------------------------

    /// The current playback status.
    pub fn playback_status(&self) -> PlaybackStatus {
        self.playback_status
    }

    /// Transition to a new playback status. Any state may follow any other.
    ///
    /// Entering playback saves the current time dilation; leaving restores
    /// it, so a playback-rate override never leaks into editing.
    pub fn set_playback_status(&mut self, status: PlaybackStatus) {
        if status == self.playback_status {
            return;
        }
        let previous = self.playback_status;
        if status.is_playing() && !previous.is_playing() {
            self.pre_play_time_dilation = Some(self.time_dilation);
        } else if previous.is_playing() && !status.is_playing() {
            if let Some(dilation) = self.pre_play_time_dilation.take() {
                self.time_dilation = dilation;
            }
        }
        self.playback_status = status;
        tracing::info!("Playback status: {:?} -> {:?}", previous, status);
        self.events.push(SequencerEvent::PlaybackStatusChanged {
            previous,
            current: status,
        });
    }

    /// Global playback rate multiplier.
    pub fn time_dilation(&self) -> f32 {
        self.time_dilation
    }

    /// Set the playback rate multiplier.
    pub fn set_time_dilation(&mut self, dilation: f32) {
        self.time_dilation = dilation;
    }

    /// Whether playback wraps at the playback range's upper bound.
    pub fn is_looping_enabled(&self) -> bool {
        self.looping_enabled
    }

    /// Enable or disable loop playback.
    pub fn set_looping_enabled(&mut self, enabled: bool) {
        self.looping_enabled = enabled;
    }

    /// Whether the cursor is kept inside the playback range while playing.
    pub fn keeps_cursor_in_play_range(&self) -> bool {
        self.keep_cursor_in_play_range
    }

    /// Keep (or stop keeping) the cursor inside the playback range.
    pub fn set_keep_cursor_in_play_range(&mut self, keep: bool) {
        self.keep_cursor_in_play_range = keep;
    }

    // --- scrubbing, stepping, jumping -------------------------------------

    /// Handle an interactive scrub-drag position update.
    pub fn scrub(&mut self, new_position: f32) {
        if self.playback_status != PlaybackStatus::Scrubbing {
            self.set_playback_status(PlaybackStatus::Scrubbing);
        }
        let view = self.view_range.target();
        let snapped = self.autoscroll.update_auto_scroll(
            new_position,
            self.scrub_position,
            &view,
            &self.working_range,
        );
        self.set_global_time(snapped.unwrap_or(new_position), SnapMode::INTERVAL);
    }

    /// Finish an interactive scrub drag.
    pub fn end_scrub(&mut self) {
        self.autoscroll.stop_autoscroll();
        self.set_playback_status(PlaybackStatus::Stopped);
    }

    /// Step the scrub position forward by one snap interval.
    pub fn step_forward(&mut self) {
        self.step_by(self.snap_settings.snap_interval);
    }

    /// Step the scrub position backward by one snap interval.
    pub fn step_backward(&mut self) {
        self.step_by(-self.snap_settings.snap_interval);
    }

    fn step_by(&mut self, delta: f32) {
        self.set_playback_status(PlaybackStatus::Stepping);
        let target = self.scrub_position + delta;
        self.set_global_time(target, SnapMode::INTERVAL);
        self.set_playback_status(PlaybackStatus::Stopped);
    }

    /// Jump to the lower time bound.
    pub fn jump_to_start(&mut self) {
        if let Some(lower) = self.time_bounds().lower_value() {
            self.set_playback_status(PlaybackStatus::Jumping);
            self.set_global_time(lower, SnapMode::NONE);
            self.set_playback_status(PlaybackStatus::Stopped);
        }
    }

    /// Jump to the upper time bound.
    pub fn jump_to_end(&mut self) {
        if let Some(upper) = self.time_bounds().upper_value() {
            self.set_playback_status(PlaybackStatus::Jumping);
            self.set_global_time(upper, SnapMode::NONE);
            self.set_playback_status(PlaybackStatus::Stopped);
        }
    }

    // --- ranges -----------------------------------------------------------

    /// The visible time window, interpolated by any in-flight animation.
    pub fn view_range(&self) -> TimeRange {
        self.view_range.current()
    }

    /// The intended view range, readable mid-animation.
    pub fn target_view_range(&self) -> TimeRange {
        self.view_range.target()
    }

    /// Change the visible time window. The working range grows to contain
    /// the new window so panning never leaves the pannable area.
    pub fn set_view_range(
        &mut self,
        range: TimeRange,
        interpolation: RangeInterpolation,
    ) -> Result<()> {
        if range.is_empty() || range.is_degenerate() {
            return Err(SequencerError::DegenerateRange);
        }
        self.view_range.set_target(range, interpolation);
        self.working_range = self.working_range.union(&range);
        Ok(())
    }

    /// Animate the view to the smallest range containing `ranges`.
    pub fn zoom_to_ranges(&mut self, ranges: &[TimeRange]) {
        let hull = TimeRange::hull(ranges);
        if !hull.is_empty() && !hull.is_degenerate() {
            let _ = self.set_view_range(hull, RangeInterpolation::Animated);
        }
    }

    /// The working (clamp) range the view may pan within.
    pub fn working_range(&self) -> TimeRange {
        self.working_range
    }

    /// Replace the working range; it is grown to contain the current view
    /// target rather than clipping it.
    pub fn set_working_range(&mut self, range: TimeRange) -> Result<()> {
        if range.is_empty() || range.is_degenerate() {
            return Err(SequencerError::DegenerateRange);
        }
        self.working_range = range.union(&self.view_range.target());
        Ok(())
    }

    /// The focused sequence's playback range.
    pub fn playback_range(&self) -> TimeRange {
        self.stack
            .top()
            .borrow()
            .sequence()
            .borrow()
            .playback_range()
    }

    /// Replace the focused sequence's playback range.
    pub fn set_playback_range(&mut self, range: TimeRange) -> Result<()> {
        self.stack
            .top()
            .borrow()
            .sequence()
            .borrow_mut()
            .set_playback_range(range)?;
        self.notify_data_changed();
        Ok(())
    }

    /// The focused sequence's in/out range.
    pub fn in_out_range(&self) -> TimeRange {
        self.stack.top().borrow().sequence().borrow().in_out_range()
    }

    /// Replace the focused sequence's in/out range.
    pub fn set_in_out_range(&mut self, range: TimeRange) -> Result<()> {
        self.stack
            .top()
            .borrow()
            .sequence()
            .borrow_mut()
            .set_in_out_range(range)?;
        self.notify_data_changed();
        Ok(())
    }

    // --- focus stack ------------------------------------------------------

    /// The focused sequence instance.
    pub fn focused_instance(&self) -> InstanceRef {
        Rc::clone(self.stack.top())
    }

    /// The root sequence instance.
    pub fn root_instance(&self) -> InstanceRef {
        Rc::clone(self.stack.root())
    }

    /// Number of instances on the focus stack.
    pub fn instance_count(&self) -> usize {
        self.stack.len()
    }

    /// Focus a sub-sequence, creating its evaluation instance on demand.
    pub fn focus_sub_sequence(&mut self, sequence: Rc<RefCell<Sequence>>) -> Result<InstanceRef> {
        let id = sequence.borrow().id;
        let instance = match self.sub_instances.get(&id) {
            Some(existing) => Rc::clone(existing),
            None => {
                let created = SequenceInstance::new_ref(Rc::clone(&sequence));
                self.sub_instances.insert(id, Rc::clone(&created));
                created
            }
        };
        self.focus_instance(Rc::clone(&instance))?;
        Ok(instance)
    }

    /// Focus an existing instance.
    pub fn focus_instance(&mut self, instance: InstanceRef) -> Result<()> {
        self.stack.push(instance)?;
        self.reset_per_sequence_data();
        Ok(())
    }

    /// Pop the focus stack until `instance` is focused, destroying the
    /// evaluation instances of everything popped.
    pub fn pop_to_instance(&mut self, instance: &InstanceRef) -> Result<()> {
        self.stack.pop_to(instance)?;
        let stack = &self.stack;
        self.sub_instances.retain(|_, inst| stack.contains(inst));
        self.reset_per_sequence_data();
        Ok(())
    }

    /// Replace the edited asset: clears the whole stack and re-seeds with a
    /// new root instance. Scrub position and presentation state reset.
    pub fn reset_to_new_root(&mut self, sequence: Rc<RefCell<Sequence>>) {
        self.sub_instances.clear();
        let playback = sequence.borrow().playback_range();
        self.stack.reset(SequenceInstance::new_ref(sequence));
        self.scrub_position = playback.lower_value().unwrap_or(0.0);
        self.reset_per_sequence_data();
    }

    fn reset_per_sequence_data(&mut self) {
        self.selection.clear();
        self.key_collection = None;

        let playback = self.playback_range();
        if !playback.is_empty() && !playback.is_degenerate() {
            self.view_range
                .set_target(playback, RangeInterpolation::Immediate);
            self.working_range = playback;
        }

        self.events.push(SequencerEvent::FocusChanged);
        self.notify_data_changed();
    }

    // --- selection, snapping, collaborators -------------------------------

    /// The current selection.
    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Mutate the selection. Invalidates the cached key collection.
    pub fn selection_mut(&mut self) -> &mut Selection {
        self.key_collection = None;
        &mut self.selection
    }

    /// Snap configuration.
    pub fn snap_settings(&self) -> &SnapSettings {
        &self.snap_settings
    }

    /// Mutate the snap configuration.
    pub fn snap_settings_mut(&mut self) -> &mut SnapSettings {
        &mut self.snap_settings
    }

    /// Enable or disable autoscroll on direct time sets.
    pub fn set_autoscroll_enabled(&mut self, enabled: bool) {
        self.autoscroll_enabled = enabled;
    }

    /// Drive autoscroll explicitly at a fixed rate (UI drag handles).
    pub fn start_autoscroll(&mut self, units_per_second: f32) {
        self.autoscroll.start_autoscroll(units_per_second);
    }

    /// Stop explicit autoscroll.
    pub fn stop_autoscroll(&mut self) {
        self.autoscroll.stop_autoscroll();
    }

    /// Register a track editor collaborator.
    pub fn register_track_editor(&mut self, editor: Box<dyn TrackEditor>) {
        self.track_editors.register(editor);
    }

    /// Release all collaborators; called when the session closes. Safe to
    /// call repeatedly.
    pub fn release(&mut self) {
        self.track_editors.release_all();
    }

    /// Note that authoritative sequence data changed out-of-band.
    pub fn notify_data_changed(&mut self) {
        self.key_collection = None;
        self.events.push(SequencerEvent::DataChanged);
    }

    /// Drain pending notifications.
    pub fn take_events(&mut self) -> Vec<SequencerEvent> {
        std::mem::take(&mut self.events)
    }

    /// Drain event markers triggered by time updates since the last drain.
    pub fn take_triggered_events(&mut self) -> Vec<(TrackId, String)> {
        std::mem::take(&mut self.triggered_events)
    }

    // --- internals --------------------------------------------------------

    fn pan_view_immediate(&mut self, pan: f32) {
        let target = self.view_range.target();
        if let (Some(lower), Some(upper)) = (target.lower_value(), target.upper_value()) {
            let shifted = TimeRange::new(lower + pan, upper + pan);
            self.view_range
                .set_target(shifted, RangeInterpolation::Immediate);
            self.working_range = self.working_range.union(&shifted);
        }
    }

    fn ensure_key_collection(&mut self) {
        if self.key_collection.is_some() {
            return;
        }
        let sequence = {
            let focused = self.stack.top().borrow();
            Rc::clone(focused.sequence())
        };
        let collection = KeyCollection::from_selection(&sequence.borrow(), &self.selection);
        self.key_collection = Some(collection);
    }
}

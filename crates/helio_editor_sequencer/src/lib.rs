// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline/sequencer engine for Helio Editor.
//!
//! This crate provides the playback, time-range and nested-sequence core
//! of the timeline editor:
//! - A playback state machine owning the global scrub position
//! - View/working/playback/in-out time ranges with animated view changes
//! - A non-empty stack of nested sequence-evaluation instances
//! - Autoscroll/autoscrub near the view edges
//! - Interval and nearest-key time snapping
//!
//! ## Architecture
//!
//! The engine is single-threaded and tick-driven. The host calls
//! [`Sequencer::tick`] once per frame; UI widgets and per-track-type
//! editors are external collaborators reached through accessors, drained
//! event queues and the [`TrackEditor`] lifecycle trait.

pub mod animated_range;
pub mod autoscroll;
pub mod binding;
pub mod error;
pub mod instance;
pub mod range;
pub mod selection;
pub mod sequence;
pub mod sequencer;
pub mod session;
pub mod snap;
pub mod track;
pub mod track_editor;

pub use animated_range::{AnimatedViewRange, RangeInterpolation};
pub use autoscroll::AutoscrollController;
pub use binding::{EntityId, ObjectBinding, ObjectBindingId, RuntimeObject};
pub use error::{Result, SequencerError};
pub use instance::{InstanceRef, InstanceStack, SequenceInstance};
pub use range::{TimeBound, TimeRange};
pub use selection::Selection;
pub use sequence::{Sequence, SequenceId};
pub use sequencer::{PlaybackStatus, Sequencer, SequencerEvent};
pub use session::{SessionId, SessionRegistry};
pub use snap::{snap_to_interval, KeyCollection, SnapMode, SnapSettings};
pub use track::{EventMarker, Keyframe, KeyframeId, Track, TrackId};
pub use track_editor::{TrackEditor, TrackEditorRegistry};

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Track editor collaborators.
//!
//! Per-track-type logic is supplied by the host as an ordered collection of
//! opaque plugins. The engine only drives their lifecycle; it never
//! downcasts.

/// Lifecycle interface implemented by per-track-type editor plugins.
pub trait TrackEditor {
    /// Called once when the editor is registered.
    fn on_initialize(&mut self) {}

    /// Called once per frame, in registration order, after the global time
    /// has been updated.
    fn tick(&mut self, delta_time: f32) {
        let _ = delta_time;
    }

    /// Called when the hosting session closes. Guaranteed at most once.
    fn on_release(&mut self) {}
}

struct EditorSlot {
    editor: Box<dyn TrackEditor>,
    released: bool,
}

/// Ordered registry of track editors.
#[derive(Default)]
pub struct TrackEditorRegistry {
    editors: Vec<EditorSlot>,
}

impl TrackEditorRegistry {
    /// Register an editor, invoking its `on_initialize` callback.
    pub fn register(&mut self, mut editor: Box<dyn TrackEditor>) {
        editor.on_initialize();
        self.editors.push(EditorSlot {
            editor,
            released: false,
        });
    }

    /// Number of registered editors, released or not.
    pub fn len(&self) -> usize {
        self.editors.len()
    }

    /// Whether no editors are registered.
    pub fn is_empty(&self) -> bool {
        self.editors.is_empty()
    }

    /// Tick every live editor in registration order.
    pub fn tick_all(&mut self, delta_time: f32) {
        for slot in &mut self.editors {
            if !slot.released {
                slot.editor.tick(delta_time);
            }
        }
    }

    /// Release every editor. Safe to call more than once; editors already
    /// released are skipped.
    pub fn release_all(&mut self) {
        for slot in &mut self.editors {
            if !slot.released {
                slot.editor.on_release();
                slot.released = true;
            }
        }
    }
}

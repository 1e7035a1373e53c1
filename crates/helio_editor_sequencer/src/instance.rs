// SPDX-License-Identifier: MIT OR Apache-2.0
//! Sequence evaluation instances and the focus stack.
//!
//! Each [`SequenceInstance`] is one level of nested-sequence evaluation.
//! The stack is never empty: index 0 is the root instance created when the
//! session opens, the top is the focused instance. Pushing and popping
//! drive sub-sequence editing.

use crate::binding::{ObjectBinding, ObjectBindingId, RuntimeObject};
use crate::error::{Result, SequencerError};
use crate::sequence::Sequence;
use crate::track::TrackId;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::rc::Rc;

/// Shared handle to a sequence instance. Identity is pointer identity.
pub type InstanceRef = Rc<RefCell<SequenceInstance>>;

/// One level of evaluation context for a (possibly nested) sequence.
#[derive(Debug)]
pub struct SequenceInstance {
    sequence: Rc<RefCell<Sequence>>,
    bindings: IndexMap<ObjectBindingId, ObjectBinding>,
    last_position: f32,
}

impl SequenceInstance {
    /// Create an instance evaluating `sequence`.
    pub fn new(sequence: Rc<RefCell<Sequence>>) -> Self {
        Self {
            sequence,
            bindings: IndexMap::new(),
            last_position: 0.0,
        }
    }

    /// Wrap a new instance in a shared handle.
    pub fn new_ref(sequence: Rc<RefCell<Sequence>>) -> InstanceRef {
        Rc::new(RefCell::new(Self::new(sequence)))
    }

    /// The sequence this instance evaluates.
    pub fn sequence(&self) -> &Rc<RefCell<Sequence>> {
        &self.sequence
    }

    /// Time this instance was last evaluated at.
    pub fn last_position(&self) -> f32 {
        self.last_position
    }

    /// Bind a runtime object to a binding id.
    pub fn bind_object(&mut self, binding: ObjectBindingId, object: &Rc<RuntimeObject>) {
        self.bindings.entry(binding).or_default().bind(object);
    }

    /// Resolve the live runtime objects for a binding. Stale targets are
    /// skipped (non-fatal, see [`ObjectBinding::resolve`]); an unknown
    /// binding id resolves to nothing.
    pub fn resolve_binding(&self, binding: ObjectBindingId) -> Vec<Rc<RuntimeObject>> {
        self.bindings
            .get(&binding)
            .map(ObjectBinding::resolve)
            .unwrap_or_default()
    }

    /// Drop references to runtime objects that no longer exist.
    pub fn prune_stale_bindings(&mut self) {
        for binding in self.bindings.values_mut() {
            binding.prune();
        }
    }

    /// Evaluate the instance at `position`, having last been evaluated at
    /// `last_position`. Returns event markers crossed by a forward move, in
    /// the half-open window `(last_position, position]`, so one-shot events
    /// between old and new time fire exactly once.
    pub fn update(&mut self, position: f32, last_position: f32) -> Vec<(TrackId, String)> {
        let mut triggered = Vec::new();
        if position > last_position {
            let sequence = self.sequence.borrow();
            for track in sequence.tracks() {
                if track.muted {
                    continue;
                }
                for event in track.events_in_window(last_position, position) {
                    triggered.push((track.id, event.name.clone()));
                }
            }
        }
        self.last_position = position;
        triggered
    }
}

/// Ordered, non-empty stack of sequence instances.
///
/// `stack[0]` is the root; the last element is focused.
#[derive(Debug)]
pub struct InstanceStack {
    stack: Vec<InstanceRef>,
}

impl InstanceStack {
    /// Create a stack seeded with its root instance.
    pub fn new(root: InstanceRef) -> Self {
        Self { stack: vec![root] }
    }

    /// The root instance.
    pub fn root(&self) -> &InstanceRef {
        &self.stack[0]
    }

    /// The focused instance.
    pub fn top(&self) -> &InstanceRef {
        self.stack.last().expect("instance stack is never empty")
    }

    /// Number of instances on the stack, always at least one.
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether `instance` is on the stack.
    pub fn contains(&self, instance: &InstanceRef) -> bool {
        self.stack.iter().any(|i| Rc::ptr_eq(i, instance))
    }

    /// Focus a sub-sequence instance. Pushing the currently focused
    /// instance onto itself is recursion and is rejected.
    pub fn push(&mut self, instance: InstanceRef) -> Result<()> {
        if Rc::ptr_eq(self.top(), &instance) {
            return Err(SequencerError::Recursion);
        }
        self.stack.push(instance);
        Ok(())
    }

    /// Pop the focused instance. The root instance cannot be popped.
    pub fn pop(&mut self) -> Result<InstanceRef> {
        if self.stack.len() <= 1 {
            return Err(SequencerError::EmptyStack);
        }
        self.stack.pop().ok_or(SequencerError::EmptyStack)
    }

    /// Pop until `instance` is focused.
    pub fn pop_to(&mut self, instance: &InstanceRef) -> Result<()> {
        if !self.contains(instance) {
            return Err(SequencerError::InstanceNotFound);
        }
        while !Rc::ptr_eq(self.top(), instance) {
            self.stack.pop();
        }
        Ok(())
    }

    /// Clear the stack and re-seed with a new root instance.
    pub fn reset(&mut self, new_root: InstanceRef) {
        self.stack.clear();
        self.stack.push(new_root);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance(name: &str) -> InstanceRef {
        SequenceInstance::new_ref(Rc::new(RefCell::new(Sequence::new(name))))
    }

    #[test]
    fn test_push_self_is_recursion() {
        let root = instance("root");
        let mut stack = InstanceStack::new(Rc::clone(&root));
        assert_eq!(stack.push(root), Err(SequencerError::Recursion));
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn test_push_and_pop_to_root() {
        let root = instance("root");
        let child = instance("child");
        let mut stack = InstanceStack::new(Rc::clone(&root));

        stack.push(Rc::clone(&child)).unwrap();
        assert_eq!(stack.len(), 2);
        assert!(!Rc::ptr_eq(stack.top(), stack.root()));

        stack.pop_to(&root).unwrap();
        assert_eq!(stack.len(), 1);
        assert!(Rc::ptr_eq(stack.top(), &root));
    }

    #[test]
    fn test_pop_below_root_fails() {
        let root = instance("root");
        let mut stack = InstanceStack::new(root);
        assert_eq!(stack.pop().unwrap_err(), SequencerError::EmptyStack);
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn test_pop_to_unknown_instance_fails() {
        let root = instance("root");
        let stranger = instance("stranger");
        let mut stack = InstanceStack::new(root);
        assert_eq!(
            stack.pop_to(&stranger),
            Err(SequencerError::InstanceNotFound)
        );
    }

    #[test]
    fn test_stack_never_empty() {
        let root = instance("root");
        let mut stack = InstanceStack::new(Rc::clone(&root));
        for _ in 0..3 {
            stack.push(instance("child")).unwrap();
        }
        stack.pop_to(&root).unwrap();
        let _ = stack.pop();
        assert!(stack.len() >= 1);
    }

    #[test]
    fn test_update_fires_events_once() {
        let sequence = Rc::new(RefCell::new(Sequence::new("events")));
        let track_id = {
            let mut seq = sequence.borrow_mut();
            let mut track = crate::track::Track::new("Events");
            track.add_event(1.0, "boom");
            seq.add_track(track)
        };
        let mut inst = SequenceInstance::new(sequence);

        let fired = inst.update(2.0, 0.0);
        assert_eq!(fired, vec![(track_id, "boom".to_string())]);

        // Moving further forward does not re-fire.
        let fired = inst.update(3.0, 2.0);
        assert!(fired.is_empty());
    }

    #[test]
    fn test_update_backward_fires_nothing() {
        let sequence = Rc::new(RefCell::new(Sequence::new("events")));
        {
            let mut seq = sequence.borrow_mut();
            let mut track = crate::track::Track::new("Events");
            track.add_event(1.0, "boom");
            seq.add_track(track);
        }
        let mut inst = SequenceInstance::new(sequence);
        inst.update(2.0, 0.0);
        assert!(inst.update(0.0, 2.0).is_empty());
    }
}

// SPDX-License-Identifier: MIT OR Apache-2.0
//! Object bindings: mapping timeline bindings to runtime objects.
//!
//! The host owns runtime objects; the engine only holds weak references.
//! A binding whose targets have all been dropped is stale and resolves to
//! nothing for that frame.

use serde::{Deserialize, Serialize};
use std::rc::{Rc, Weak};
use uuid::Uuid;

/// Entity ID identifying a runtime object in the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

/// Unique identifier for an object binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectBindingId(pub Uuid);

impl ObjectBindingId {
    /// Create a new random binding ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObjectBindingId {
    fn default() -> Self {
        Self::new()
    }
}

/// A runtime object that tracks can animate
#[derive(Debug)]
pub struct RuntimeObject {
    /// Host entity this object represents
    pub entity: EntityId,
    /// Display name
    pub name: String,
}

impl RuntimeObject {
    /// Create a runtime object for an entity
    pub fn new(entity: EntityId, name: impl Into<String>) -> Self {
        Self {
            entity,
            name: name.into(),
        }
    }
}

/// Weak references from one binding to its runtime objects
#[derive(Debug, Default, Clone)]
pub struct ObjectBinding {
    targets: Vec<Weak<RuntimeObject>>,
}

impl ObjectBinding {
    /// Bind a runtime object
    pub fn bind(&mut self, object: &Rc<RuntimeObject>) {
        self.targets.push(Rc::downgrade(object));
    }

    /// Resolve the still-live targets. Dead references are skipped with a
    /// warning and the binding is treated as unresolved for those targets.
    pub fn resolve(&self) -> Vec<Rc<RuntimeObject>> {
        let mut objects = Vec::with_capacity(self.targets.len());
        for target in &self.targets {
            match target.upgrade() {
                Some(object) => objects.push(object),
                None => {
                    tracing::warn!("Stale object binding; runtime target no longer exists");
                }
            }
        }
        objects
    }

    /// Drop references whose targets no longer exist
    pub fn prune(&mut self) {
        self.targets.retain(|t| t.strong_count() > 0);
    }

    /// Number of references, live or stale
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether the binding holds no references at all
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

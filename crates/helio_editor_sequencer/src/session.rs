// SPDX-License-Identifier: MIT OR Apache-2.0
//! Session registry for concurrently hosted sequencers.
//!
//! Hosts that open multiple timelines own a registry keyed by session id
//! instead of a mutable "currently active editor" global. Opening a session
//! can explicitly close out a previous one; closing releases the
//! sequencer's collaborators.

use crate::sequencer::Sequencer;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an editing session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new random session ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Registry of open sequencer sessions.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: IndexMap<SessionId, Sequencer>,
}

impl SessionRegistry {
    /// Open a session, optionally closing a previous one first.
    pub fn open(&mut self, sequencer: Sequencer, close_first: Option<SessionId>) -> SessionId {
        if let Some(previous) = close_first {
            self.close(previous);
        }
        let id = SessionId::new();
        self.sessions.insert(id, sequencer);
        tracing::info!("Opened sequencer session {:?}", id);
        id
    }

    /// Close a session, releasing its collaborators. Closing an unknown or
    /// already-closed session is a no-op.
    pub fn close(&mut self, id: SessionId) {
        if let Some(mut sequencer) = self.sessions.swap_remove(&id) {
            sequencer.release();
            tracing::info!("Closed sequencer session {:?}", id);
        }
    }

    /// Get a session's sequencer.
    pub fn get(&self, id: SessionId) -> Option<&Sequencer> {
        self.sessions.get(&id)
    }

    /// Get a session's sequencer mutably.
    pub fn get_mut(&mut self, id: SessionId) -> Option<&mut Sequencer> {
        self.sessions.get_mut(&id)
    }

    /// Number of open sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no sessions are open.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Tick every open session in opening order.
    pub fn tick_all(&mut self, delta_time: f32) {
        for sequencer in self.sessions.values_mut() {
            sequencer.tick(delta_time);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::Sequence;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn sequencer() -> Sequencer {
        Sequencer::new(Rc::new(RefCell::new(Sequence::new("root"))))
    }

    #[test]
    fn test_open_close() {
        let mut registry = SessionRegistry::default();
        let id = registry.open(sequencer(), None);
        assert_eq!(registry.len(), 1);
        assert!(registry.get(id).is_some());
        registry.close(id);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_open_replacing_previous_session() {
        let mut registry = SessionRegistry::default();
        let first = registry.open(sequencer(), None);
        let second = registry.open(sequencer(), Some(first));
        assert_eq!(registry.len(), 1);
        assert!(registry.get(first).is_none());
        assert!(registry.get(second).is_some());
    }

    #[test]
    fn test_close_unknown_session_is_noop() {
        let mut registry = SessionRegistry::default();
        registry.close(SessionId::new());
        assert!(registry.is_empty());
    }
}

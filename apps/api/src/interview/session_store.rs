//! Process-local map from interview id to its live workflow.
//!
//! Each entry sits behind its own async mutex: a request holds it for the
//! whole round (gateway calls and persistence included), so submissions for
//! the same interview run one at a time while different interviews proceed
//! independently. Entries are evicted when an interview completes.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::interview::workflow::InterviewWorkflow;

pub type SessionSlot = Arc<Mutex<InterviewWorkflow>>;

#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<DashMap<Uuid, SessionSlot>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: Uuid) -> Option<SessionSlot> {
        self.sessions.get(&id).map(|entry| entry.value().clone())
    }

    /// Registers or replaces the live workflow for `id`.
    pub fn put(&self, id: Uuid, workflow: InterviewWorkflow) -> SessionSlot {
        let slot = Arc::new(Mutex::new(workflow));
        self.sessions.insert(id, slot.clone());
        slot
    }

    /// Returns the live slot, creating it with `init` on a miss.
    /// Concurrent callers racing on a miss all receive the same slot.
    pub fn get_or_insert_with<F>(&self, id: Uuid, init: F) -> SessionSlot
    where
        F: FnOnce() -> InterviewWorkflow,
    {
        self.sessions
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(init())))
            .value()
            .clone()
    }

    pub fn remove(&self, id: Uuid) -> Option<SessionSlot> {
        self.sessions.remove(&id).map(|(_, slot)| slot)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

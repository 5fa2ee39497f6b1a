//! Per-session state registry.
//!
//! Each session owns at most one live empire. The outer map lock is held
//! only for lookup/insert; the per-session lock is held for the duration of
//! one engine call, so concurrent operations on the SAME session serialize
//! while different sessions proceed independently.

use std::sync::{Arc, Mutex};

use ahash::AHashMap;

use crate::core::types::SessionId;
use crate::empire::Empire;

#[derive(Debug, Default)]
pub struct SessionState {
    /// The session's current empire; `None` until the first generate.
    pub empire: Option<Empire>,
}

#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<AHashMap<SessionId, Arc<Mutex<SessionState>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the session, creating empty state on first use.
    pub fn entry(&self, id: SessionId) -> Arc<Mutex<SessionState>> {
        let mut sessions = self.sessions.lock().unwrap();
        sessions
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(SessionState::default())))
            .clone()
    }

    /// Fetch an existing session without creating one.
    pub fn get(&self, id: SessionId) -> Option<Arc<Mutex<SessionState>>> {
        self.sessions.lock().unwrap().get(&id).cloned()
    }

    pub fn remove(&self, id: SessionId) -> bool {
        self.sessions.lock().unwrap().remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_creates_once() {
        let store = SessionStore::new();
        let id = SessionId::new();

        assert!(store.get(id).is_none());
        let a = store.entry(id);
        let b = store.entry(id);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove() {
        let store = SessionStore::new();
        let id = SessionId::new();
        store.entry(id);
        assert!(store.remove(id));
        assert!(!store.remove(id));
        assert!(store.is_empty());
    }
}

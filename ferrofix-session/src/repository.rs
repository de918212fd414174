/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! Registry of live sessions.

use crate::id::SessionId;
use crate::session::Session;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tracing::debug;

/// At most one live [`Session`] per [`SessionId`].
///
/// Lookups take the read lock; inserts and removals take the write lock.
#[derive(Debug, Default)]
pub struct SessionRepository {
    sessions: RwLock<HashMap<SessionId, Arc<Session>>>,
}

impl SessionRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, id: &SessionId) -> Option<Arc<Session>> {
        self.sessions.read().get(id).cloned()
    }

    #[must_use]
    pub fn contains(&self, id: &SessionId) -> bool {
        self.sessions.read().contains_key(id)
    }

    /// Inserts `session` unless its id is already registered.
    ///
    /// Returns the registered session and whether it was this call that
    /// inserted it. The check and the insert happen under one write lock.
    pub fn insert_if_absent(&self, session: Arc<Session>) -> (Arc<Session>, bool) {
        let mut sessions = self.sessions.write();
        match sessions.entry(session.id().clone()) {
            Entry::Occupied(entry) => (Arc::clone(entry.get()), false),
            Entry::Vacant(entry) => {
                debug!(session = %session.id(), "session registered");
                (Arc::clone(entry.insert(session)), true)
            }
        }
    }

    /// Removes `id` only if it still maps to `session`.
    ///
    /// A connection that lost the insert race must not evict the winner.
    pub fn remove_if_same(&self, id: &SessionId, session: &Arc<Session>) -> bool {
        let mut sessions = self.sessions.write();
        match sessions.get(id) {
            Some(current) if Arc::ptr_eq(current, session) => {
                sessions.remove(id);
                debug!(session = %id, "session removed");
                true
            }
            _ => false,
        }
    }

    pub fn remove(&self, id: &SessionId) -> Option<Arc<Session>> {
        let removed = self.sessions.write().remove(id);
        if removed.is_some() {
            debug!(session = %id, "session removed");
        }
        removed
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }

    /// Snapshot of the registered ids.
    #[must_use]
    pub fn ids(&self) -> Vec<SessionId> {
        self.sessions.read().keys().cloned().collect()
    }
}

//! In-memory registry of active QoD sessions per resource.
//!
//! Sessions are process-local state: they expire on the gateway side
//! anyway, so restarts lose nothing durable.

use std::collections::HashMap;
use std::sync::RwLock;

use uuid::Uuid;

use crate::client::QodSession;

/// Maps resource ids to their currently-active QoD session.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, QodSession>>,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Registers `session` as the active session for `resource_id`,
    /// returning the previous one if there was any.
    pub fn insert(&self, resource_id: Uuid, session: QodSession) -> Option<QodSession> {
        self.sessions
            .write()
            .expect("Session registry lock poisoned")
            .insert(resource_id, session)
    }

    /// Returns a copy of the active session for `resource_id`.
    #[must_use]
    pub fn get(&self, resource_id: Uuid) -> Option<QodSession> {
        self.sessions
            .read()
            .expect("Session registry lock poisoned")
            .get(&resource_id)
            .cloned()
    }

    /// Removes and returns the active session for `resource_id`.
    pub fn remove(&self, resource_id: Uuid) -> Option<QodSession> {
        self.sessions
            .write()
            .expect("Session registry lock poisoned")
            .remove(&resource_id)
    }

    /// Number of active sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .expect("Session registry lock poisoned")
            .len()
    }

    /// Returns `true` when no sessions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(id: &str) -> QodSession {
        QodSession {
            id: id.to_string(),
            phone_number: "+34600000001".to_string(),
            profile: "QOS_E".to_string(),
            duration: 300,
        }
    }

    #[test]
    fn insert_get_remove() {
        let registry = SessionRegistry::new();
        let resource = Uuid::new_v4();

        assert!(registry.get(resource).is_none());
        assert!(registry.insert(resource, session("a")).is_none());
        assert_eq!(registry.get(resource).unwrap().id, "a");

        let previous = registry.insert(resource, session("b")).unwrap();
        assert_eq!(previous.id, "a");
        assert_eq!(registry.len(), 1);

        assert_eq!(registry.remove(resource).unwrap().id, "b");
        assert!(registry.is_empty());
    }
}

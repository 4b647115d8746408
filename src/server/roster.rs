//! Shared registry of admitted sessions
//!
//! The roster is the only shared mutable state in the relay. One mutex
//! guards the name→session map; admit, remove and enumeration are mutually
//! exclusive, so two racing registrations for one name can never both
//! succeed and a session removed mid-broadcast is never enumerated after
//! removal. Actual sends happen outside the lock, on a recipient list
//! copied while it was held, so slow peers never stall roster mutation.

use crate::protocol::Event;
use crate::server::Session;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Concurrency-safe mapping from display name to live session
#[derive(Default)]
pub struct Roster {
    sessions: Mutex<HashMap<String, Arc<Session>>>,
}

impl Roster {
    /// Create an empty roster
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically admit a session under its display name
    ///
    /// Returns `false` without mutating anything if the name is already
    /// present. On success the session is moved to
    /// [`SessionState::Active`](crate::server::SessionState::Active) while
    /// the lock is still held, so no other task can observe an admitted but
    /// pending session.
    pub fn try_admit(&self, session: Arc<Session>) -> bool {
        let mut sessions = self.sessions.lock();
        if sessions.contains_key(session.name()) {
            return false;
        }
        session.activate();
        sessions.insert(session.name().to_string(), session);
        true
    }

    /// Remove a session by name, returning it if it was present
    pub fn remove(&self, name: &str) -> Option<Arc<Session>> {
        self.sessions.lock().remove(name)
    }

    /// Send one event to every admitted session except `exclude`
    ///
    /// The recipient list is copied under the lock; the sends themselves
    /// happen outside it. A failed send is logged and skipped, it never
    /// aborts delivery to the remaining recipients.
    pub async fn broadcast(&self, event: &Event, exclude: Option<&str>) {
        let recipients: Vec<Arc<Session>> = {
            let sessions = self.sessions.lock();
            sessions
                .values()
                .filter(|session| exclude != Some(session.name()))
                .cloned()
                .collect()
        };

        for session in recipients {
            if let Err(error) = session.send(event).await {
                tracing::warn!(
                    name = %session.name(),
                    peer_addr = %session.peer_addr(),
                    %error,
                    "dropping broadcast to unreachable session"
                );
            }
        }
    }

    /// Sorted names of all admitted sessions, for deterministic listings
    pub fn snapshot(&self) -> Vec<String> {
        let mut names: Vec<String> = self.sessions.lock().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of admitted sessions
    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    /// Whether no session is admitted
    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }
}

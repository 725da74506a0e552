//! Registry of live chat sessions.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info};

use chat_relay_core::{validate_name, Error, Result, SessionId};

use crate::session::Session;

/// Prefix of the names handed out on connect.
pub const DEFAULT_NAME_PREFIX: &str = "User";

/// Authoritative, ordered set of live sessions.
///
/// Sessions are kept in join order, which is also the order broadcasts are
/// delivered in. No two live sessions share a display name.
#[derive(Debug, Default)]
pub struct Registry {
    state: Mutex<RegistryState>,
}

#[derive(Debug, Default)]
struct RegistryState {
    sessions: Vec<Arc<Session>>,
    counter: u64,
}

impl RegistryState {
    fn is_taken(&self, name: &str, except: Option<&SessionId>) -> bool {
        self.sessions
            .iter()
            .any(|s| Some(s.id()) != except && s.name() == name)
    }

    fn next_default_name(&mut self) -> String {
        loop {
            self.counter += 1;
            let candidate = format!("{DEFAULT_NAME_PREFIX}{}", self.counter);
            if !self.is_taken(&candidate, None) {
                return candidate;
            }
        }
    }
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a session and return the name it is registered under.
    ///
    /// An unnamed session gets the next `User<N>` name. A session that asks
    /// for a name which is invalid or already taken gets a `User<N>` name
    /// instead. Registering a session twice leaves it in place.
    pub fn register(&self, session: &Arc<Session>) -> String {
        let mut state = self.state.lock();

        if state.sessions.iter().any(|s| s.id() == session.id()) {
            return session.name();
        }

        let requested = session.name();
        let name = if !requested.is_empty()
            && validate_name(&requested).is_ok()
            && !state.is_taken(&requested, None)
        {
            requested
        } else {
            state.next_default_name()
        };

        session.set_name(name.clone());
        state.sessions.push(Arc::clone(session));
        info!(
            "Session registered: id={}, name={}, total={}",
            session.id(),
            name,
            state.sessions.len()
        );
        name
    }

    /// Remove a session by identity.
    ///
    /// Returns the number of sessions left, or `None` if the session was not
    /// registered. The name counter restarts once the registry is empty.
    pub fn unregister(&self, session: &Session) -> Option<usize> {
        let mut state = self.state.lock();
        let index = state
            .sessions
            .iter()
            .position(|s| s.id() == session.id())?;
        state.sessions.remove(index);

        let remaining = state.sessions.len();
        if remaining == 0 {
            state.counter = 0;
            debug!("Registry empty, name counter reset");
        }
        info!(
            "Session unregistered: id={}, name={}, remaining={}",
            session.id(),
            session.name(),
            remaining
        );
        Some(remaining)
    }

    /// Find a live session by exact (case-sensitive) name.
    pub fn find(&self, name: &str) -> Option<Arc<Session>> {
        let state = self.state.lock();
        state.sessions.iter().find(|s| s.name() == name).cloned()
    }

    /// Change a session's display name.
    ///
    /// Returns the previous name.
    pub fn rename(&self, session: &Session, new_name: &str) -> Result<String> {
        let state = self.state.lock();
        let old_name = session.name();

        if new_name == old_name {
            return Err(Error::NameUnchanged(old_name));
        }
        validate_name(new_name)?;
        if state.is_taken(new_name, Some(session.id())) {
            return Err(Error::NameConflict(new_name.to_string()));
        }

        session.set_name(new_name.to_string());
        info!(
            "Session renamed: id={}, {} -> {}",
            session.id(),
            old_name,
            new_name
        );
        Ok(old_name)
    }

    /// Point-in-time copy of the live sessions, in join order.
    pub fn snapshot(&self) -> Vec<Arc<Session>> {
        self.state.lock().sessions.clone()
    }

    /// Whether the session is currently registered.
    pub fn contains(&self, id: &SessionId) -> bool {
        self.state.lock().sessions.iter().any(|s| s.id() == id)
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.state.lock().sessions.len()
    }

    /// Whether no sessions are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open() -> Arc<Session> {
        Session::open(None, 8).0
    }

    fn names(registry: &Registry) -> Vec<String> {
        registry.snapshot().iter().map(|s| s.name()).collect()
    }

    #[test]
    fn test_register_assigns_sequential_names() {
        let registry = Registry::new();
        assert!(registry.is_empty());

        let a = open();
        let b = open();
        let c = open();
        assert_eq!(registry.register(&a), "User1");
        assert_eq!(registry.register(&b), "User2");
        assert_eq!(registry.register(&c), "User3");
        assert_eq!(registry.len(), 3);
        assert_eq!(names(&registry), vec!["User1", "User2", "User3"]);
    }

    #[test]
    fn test_register_twice_is_noop() {
        let registry = Registry::new();
        let a = open();
        assert_eq!(registry.register(&a), "User1");
        assert_eq!(registry.register(&a), "User1");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_keeps_free_requested_name() {
        let registry = Registry::new();
        let (alice, _outbox) = Session::open_named("alice", None, 8);
        assert_eq!(registry.register(&alice), "alice");
    }

    #[test]
    fn test_register_replaces_taken_or_invalid_requested_name() {
        let registry = Registry::new();
        let (first, _o1) = Session::open_named("alice", None, 8);
        let (second, _o2) = Session::open_named("alice", None, 8);
        let (third, _o3) = Session::open_named("two words", None, 8);
        registry.register(&first);
        assert_eq!(registry.register(&second), "User1");
        assert_eq!(registry.register(&third), "User2");
    }

    #[test]
    fn test_counter_skips_names_taken_by_rename() {
        let registry = Registry::new();
        let a = open();
        registry.register(&a);
        registry.rename(&a, "User2").unwrap();

        let b = open();
        assert_eq!(registry.register(&b), "User3");
    }

    #[test]
    fn test_counter_resets_when_empty() {
        let registry = Registry::new();
        let a = open();
        let b = open();
        registry.register(&a);
        registry.register(&b);

        assert_eq!(registry.unregister(&a), Some(1));
        let c = open();
        assert_eq!(registry.register(&c), "User3");

        registry.unregister(&b);
        assert_eq!(registry.unregister(&c), Some(0));

        let d = open();
        assert_eq!(registry.register(&d), "User1");
    }

    #[test]
    fn test_unregister_is_idempotent() {
        let registry = Registry::new();
        let a = open();
        let b = open();
        registry.register(&a);
        registry.register(&b);

        assert_eq!(registry.unregister(&a), Some(1));
        assert_eq!(registry.unregister(&a), None);
        assert_eq!(names(&registry), vec!["User2"]);
        assert!(!registry.contains(a.id()));
        assert!(registry.contains(b.id()));
    }

    #[test]
    fn test_unregister_uses_identity_after_rename() {
        let registry = Registry::new();
        let a = open();
        registry.register(&a);
        registry.rename(&a, "alice").unwrap();

        assert_eq!(registry.unregister(&a), Some(0));
        assert!(registry.find("alice").is_none());
    }

    #[test]
    fn test_find_is_case_sensitive() {
        let registry = Registry::new();
        let a = open();
        registry.register(&a);

        assert_eq!(registry.find("User1").unwrap().id(), a.id());
        assert!(registry.find("user1").is_none());
        assert!(registry.find("User2").is_none());
    }

    #[test]
    fn test_rename_success_is_visible_immediately() {
        let registry = Registry::new();
        let a = open();
        registry.register(&a);

        assert_eq!(registry.rename(&a, "alice").unwrap(), "User1");
        assert_eq!(a.name(), "alice");
        assert!(registry.find("User1").is_none());
        assert_eq!(registry.find("alice").unwrap().id(), a.id());
    }

    #[test]
    fn test_rename_conflict_leaves_name_unchanged() {
        let registry = Registry::new();
        let a = open();
        let b = open();
        registry.register(&a);
        registry.register(&b);

        let err = registry.rename(&a, "User2").unwrap_err();
        assert!(matches!(err, Error::NameConflict(name) if name == "User2"));
        assert_eq!(a.name(), "User1");
    }

    #[test]
    fn test_rename_to_current_name_is_rejected() {
        let registry = Registry::new();
        let a = open();
        registry.register(&a);

        let err = registry.rename(&a, "User1").unwrap_err();
        assert!(matches!(err, Error::NameUnchanged(_)));
    }

    #[test]
    fn test_rename_invalid_name() {
        let registry = Registry::new();
        let a = open();
        registry.register(&a);

        for bad in ["", "two words", "Server", "/w"] {
            assert!(matches!(
                registry.rename(&a, bad),
                Err(Error::InvalidName { .. })
            ));
        }
        assert_eq!(a.name(), "User1");
    }

    #[test]
    fn test_snapshot_is_detached_copy() {
        let registry = Registry::new();
        let a = open();
        let b = open();
        registry.register(&a);
        registry.register(&b);

        let snapshot = registry.snapshot();
        registry.unregister(&a);
        assert_eq!(snapshot.len(), 2);
        assert_eq!(registry.len(), 1);
    }
}

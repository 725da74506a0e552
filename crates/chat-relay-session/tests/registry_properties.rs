//! Property-based tests for the session registry.
//!
//! Uses proptest to drive random connect/rename/disconnect sequences and
//! verify the registry invariants after every step.

use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

use chat_relay_session::{Registry, Session};

#[derive(Debug, Clone)]
enum Op {
    Connect,
    Disconnect(usize),
    Rename(usize, String),
}

/// Small name pool so that conflicts with each other and with the
/// `User<N>` defaults actually happen.
fn name() -> impl Strategy<Value = String> {
    prop_oneof![
        (1u8..6).prop_map(|n| format!("User{n}")),
        Just("alice".to_string()),
        Just("bob".to_string()),
        Just("Server".to_string()),
        Just("two words".to_string()),
    ]
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => Just(Op::Connect),
        2 => any::<usize>().prop_map(Op::Disconnect),
        2 => (any::<usize>(), name()).prop_map(|(i, n)| Op::Rename(i, n)),
    ]
}

fn assert_unique(registry: &Registry) {
    let names: Vec<String> = registry.snapshot().iter().map(|s| s.name()).collect();
    let unique: HashSet<&String> = names.iter().collect();
    assert_eq!(unique.len(), names.len(), "duplicate names in {names:?}");
}

proptest! {
    /// No two live sessions ever share a name.
    #[test]
    fn names_stay_unique(ops in prop::collection::vec(op(), 1..60)) {
        let registry = Registry::new();
        let mut live: Vec<Arc<Session>> = Vec::new();

        for op in ops {
            match op {
                Op::Connect => {
                    let (session, _outbox) = Session::open(None, 1);
                    registry.register(&session);
                    live.push(session);
                }
                Op::Disconnect(i) if !live.is_empty() => {
                    let session = live.remove(i % live.len());
                    prop_assert!(registry.unregister(&session).is_some());
                    prop_assert!(registry.unregister(&session).is_none());
                }
                Op::Rename(i, new_name) if !live.is_empty() => {
                    let session = &live[i % live.len()];
                    let before = session.name();
                    match registry.rename(session, &new_name) {
                        Ok(old) => {
                            prop_assert_eq!(old, before);
                            prop_assert_eq!(session.name(), new_name);
                        }
                        Err(_) => prop_assert_eq!(session.name(), before),
                    }
                }
                _ => {}
            }
            assert_unique(&registry);
            prop_assert_eq!(registry.len(), live.len());
        }
    }

    /// Once everyone has left, the next session is `User1` again.
    #[test]
    fn counter_restarts_after_registry_empties(count in 1usize..10) {
        let registry = Registry::new();
        let sessions: Vec<Arc<Session>> = (0..count)
            .map(|_| {
                let (session, _outbox) = Session::open(None, 1);
                registry.register(&session);
                session
            })
            .collect();

        for session in &sessions {
            registry.unregister(session);
        }
        prop_assert!(registry.is_empty());

        let (next, _outbox) = Session::open(None, 1);
        prop_assert_eq!(registry.register(&next), "User1");
    }
}

//! Delivery of chat, whisper and system lines.

use std::sync::Arc;

use tracing::trace;

use chat_relay_core::{format_line, SessionId, SERVER_SENDER};

use crate::registry::Registry;
use crate::session::Session;

/// Routes formatted lines to one, all-but-one, or all live sessions.
///
/// Delivery never blocks and never fails the caller; see
/// [`Session::deliver`] for what happens to slow clients.
#[derive(Debug, Clone)]
pub struct Router {
    registry: Arc<Registry>,
}

impl Router {
    /// Create a router over `registry`.
    pub fn new(registry: Arc<Registry>) -> Self {
        Self { registry }
    }

    /// Get the registry this router reads from.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Send `text` from `from` to a single session.
    ///
    /// Multi-line text becomes one `[from]` line per text line. Returns
    /// whether every line was queued.
    pub fn send_to(&self, session: &Session, text: &str, from: &str) -> bool {
        let mut delivered = true;
        for line in text.lines() {
            delivered &= session.deliver(format_line(from, line));
        }
        delivered
    }

    /// Send a system line to a single session.
    pub fn send_server(&self, session: &Session, text: &str) -> bool {
        self.send_to(session, text, SERVER_SENDER)
    }

    /// Send to every live session except `excluded`.
    ///
    /// Returns the number of sessions the text was queued for.
    pub fn broadcast_except(&self, excluded: &SessionId, text: &str, from: &str) -> usize {
        self.deliver_all(Some(excluded), text, from)
    }

    /// Send to every live session.
    pub fn broadcast_all(&self, text: &str, from: &str) -> usize {
        self.deliver_all(None, text, from)
    }

    fn deliver_all(&self, excluded: Option<&SessionId>, text: &str, from: &str) -> usize {
        let targets = self.registry.snapshot();
        let delivered = targets
            .iter()
            .filter(|session| Some(session.id()) != excluded)
            .filter(|session| self.send_to(session, text, from))
            .count();
        trace!("Broadcast from {} delivered to {} sessions", from, delivered);
        delivered
    }
}

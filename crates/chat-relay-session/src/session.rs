//! Chat session state and outbound delivery.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use chat_relay_core::{SessionId, SessionStatus};

/// One connected client.
///
/// The display name is owned by the [`Registry`](crate::Registry): only its
/// `register` and `rename` operations change it.
#[derive(Debug)]
pub struct Session {
    /// Stable identity
    id: SessionId,

    /// Current display name (empty until registered)
    name: RwLock<String>,

    /// Queue drained by the connection's writer
    outbound: mpsc::Sender<String>,

    /// Cancelled to force the connection closed
    shutdown: CancellationToken,

    /// Lifecycle status
    status: Mutex<SessionStatus>,

    /// Remote address, when the transport has one
    peer: Option<SocketAddr>,

    /// Connection time
    connected_at: SystemTime,
}

/// Receiving side of a session's outbound queue.
#[derive(Debug)]
pub struct Outbox {
    rx: mpsc::Receiver<String>,
    shutdown: CancellationToken,
}

impl Session {
    /// Create an unnamed session whose outbound queue holds `capacity` lines.
    pub fn open(peer: Option<SocketAddr>, capacity: usize) -> (Arc<Self>, Outbox) {
        Self::open_named(String::new(), peer, capacity)
    }

    /// Create a session that asks for `name` when it is registered.
    pub fn open_named(
        name: impl Into<String>,
        peer: Option<SocketAddr>,
        capacity: usize,
    ) -> (Arc<Self>, Outbox) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let shutdown = CancellationToken::new();
        let session = Arc::new(Self {
            id: SessionId::new(),
            name: RwLock::new(name.into()),
            outbound: tx,
            shutdown: shutdown.clone(),
            status: Mutex::new(SessionStatus::Connecting),
            peer,
            connected_at: SystemTime::now(),
        });
        debug!("Session opened: id={}, peer={:?}", session.id, peer);
        (session, Outbox { rx, shutdown })
    }

    /// Get the session ID.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Get the current display name.
    pub fn name(&self) -> String {
        self.name.read().clone()
    }

    pub(crate) fn set_name(&self, name: String) {
        *self.name.write() = name;
    }

    /// Get the remote address.
    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }

    /// Get the connection time.
    pub fn connected_at(&self) -> SystemTime {
        self.connected_at
    }

    /// Get the current lifecycle status.
    pub fn status(&self) -> SessionStatus {
        *self.status.lock()
    }

    /// Advance the lifecycle status.
    ///
    /// Returns `false` and leaves the status unchanged if the move would go
    /// backwards.
    pub fn set_status(&self, next: SessionStatus) -> bool {
        let mut status = self.status.lock();
        let old = *status;
        if !old.can_transition_to(next) {
            debug!(
                "Ignoring status change: id={}, {} -> {}",
                self.id, old, next
            );
            return false;
        }
        *status = next;
        debug!("Session status changed: id={}, {} -> {}", self.id, old, next);
        true
    }

    /// Queue one line for delivery without waiting.
    ///
    /// Returns `false` if the line was not queued. A client whose queue is
    /// full is too slow to keep up and gets disconnected.
    pub fn deliver(&self, line: String) -> bool {
        if self.is_closed() {
            return false;
        }
        match self.outbound.try_send(line) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                warn!(
                    "Outbound queue full, disconnecting: id={}, name={}",
                    self.id,
                    self.name()
                );
                self.close();
                false
            }
            Err(TrySendError::Closed(_)) => {
                debug!("Outbound queue closed: id={}", self.id);
                false
            }
        }
    }

    /// Force the connection closed.
    ///
    /// Lines already queued are still written before the transport shuts
    /// down. Safe to call more than once and from any task.
    pub fn close(&self) {
        if !self.shutdown.is_cancelled() {
            info!("Closing session: id={}, name={}", self.id, self.name());
            self.shutdown.cancel();
        }
    }

    /// Whether [`Session::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Resolves once the session has been closed.
    pub async fn closed(&self) {
        self.shutdown.cancelled().await;
    }
}

impl Outbox {
    /// Next queued line.
    ///
    /// After the session is closed, the lines that were already queued are
    /// returned and then `None`.
    pub async fn recv(&mut self) -> Option<String> {
        tokio::select! {
            biased;
            line = self.rx.recv() => line,
            _ = self.shutdown.cancelled() => self.rx.try_recv().ok(),
        }
    }

    /// Next queued line, if one is ready.
    pub fn try_recv(&mut self) -> Option<String> {
        self.rx.try_recv().ok()
    }

    /// Take every line that is ready.
    pub fn drain(&mut self) -> Vec<String> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}

//! Shared relay state handed to every connection task.

use std::sync::Arc;

use chat_relay_core::ServerConfig;
use chat_relay_session::{Registry, Router, Transcript};

/// Everything a connection needs: the registry, the router over it, the
/// transcript and the connection limits.
pub struct RelayState {
    registry: Arc<Registry>,
    router: Router,
    transcript: Arc<dyn Transcript>,
    admin_secret: String,
    max_line_length: usize,
    outbound_queue: usize,
}

impl RelayState {
    /// Build state from configuration.
    pub fn new(config: &ServerConfig, transcript: Arc<dyn Transcript>) -> Self {
        let registry = Arc::new(Registry::new());
        Self {
            router: Router::new(Arc::clone(&registry)),
            registry,
            transcript,
            admin_secret: config.admin.secret.clone(),
            max_line_length: config.server.max_line_length,
            outbound_queue: config.server.outbound_queue,
        }
    }

    /// Get the session registry.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Get the router.
    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Get the transcript.
    pub fn transcript(&self) -> &dyn Transcript {
        self.transcript.as_ref()
    }

    /// Whether `candidate` matches the configured admin secret.
    pub fn check_admin_secret(&self, candidate: &str) -> bool {
        candidate == self.admin_secret
    }

    /// Longest accepted inbound line, in bytes.
    pub fn max_line_length(&self) -> usize {
        self.max_line_length
    }

    /// Outbound queue capacity per session.
    pub fn outbound_queue(&self) -> usize {
        self.outbound_queue
    }
}

impl std::fmt::Debug for RelayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayState")
            .field("sessions", &self.registry.len())
            .field("max_line_length", &self.max_line_length)
            .field("outbound_queue", &self.outbound_queue)
            .finish_non_exhaustive()
    }
}

//! TCP accept loop.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing::{debug, error, info};

use chat_relay_core::{ServerConfig, SERVER_SENDER};
use chat_relay_session::Transcript;

use crate::connection::handle_connection;
use crate::error::ServerError;
use crate::state::RelayState;

/// Pause after a failed accept so a persistent error (e.g. out of file
/// descriptors) does not spin.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// The chat relay server: a bound listener plus the shared relay state.
pub struct ChatServer {
    listener: TcpListener,
    state: Arc<RelayState>,
}

impl ChatServer {
    /// Validate `config` and bind the listening socket.
    pub async fn bind(
        config: &ServerConfig,
        transcript: Arc<dyn Transcript>,
    ) -> Result<Self, ServerError> {
        config.validate()?;

        let addr = config.bind_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ServerError::Bind {
                addr: addr.clone(),
                source: e,
            })?;

        Ok(Self {
            listener,
            state: Arc::new(RelayState::new(config, transcript)),
        })
    }

    /// Get the address the server is listening on.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Get the shared relay state.
    pub fn state(&self) -> Arc<RelayState> {
        Arc::clone(&self.state)
    }

    /// Accept connections forever.
    pub async fn run(self) {
        self.run_until(std::future::pending()).await;
    }

    /// Accept connections until `shutdown` resolves.
    ///
    /// Connections still open at shutdown are not drained.
    pub async fn run_until<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let port = self.local_addr().map(|addr| addr.port()).unwrap_or_default();
        info!("Chat relay listening on {:?}", self.local_addr());
        self.state.transcript().record(
            SERVER_SENDER,
            &format!("Chat server is up and listening for clients on port {port}"),
        );

        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Accept loop stopping");
                    break;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        debug!("Accepted connection from {}", peer);
                        tokio::spawn(handle_connection(stream, Arc::clone(&self.state)));
                    }
                    Err(e) => {
                        error!("Failed to accept connection: {}", e);
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                    }
                },
            }
        }
    }
}

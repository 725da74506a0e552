//! Shared test utilities for chat-relay integration tests

pub mod client;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chat_relay::{ChatServer, RelayState};
use chat_relay_core::ServerConfig;
use chat_relay_session::MemoryTranscript;

pub use client::TestClient;

/// Admin secret configured on test servers.
pub const ADMIN_SECRET: &str = "s3cret";

/// A relay running on an ephemeral localhost port.
#[allow(dead_code)]
pub struct TestServer {
    pub addr: SocketAddr,
    pub state: Arc<RelayState>,
    pub transcript: Arc<MemoryTranscript>,
}

impl TestServer {
    /// Start a relay with the test admin secret.
    pub async fn start() -> Self {
        let mut config = ServerConfig::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 0;
        config.admin.secret = ADMIN_SECRET.to_string();

        let transcript = Arc::new(MemoryTranscript::new());
        let server = ChatServer::bind(&config, transcript.clone())
            .await
            .expect("Failed to bind test server");
        let addr = server.local_addr().unwrap();
        let state = server.state();
        tokio::spawn(server.run());

        Self {
            addr,
            state,
            transcript,
        }
    }

    /// Connect `count` clients in order, consuming every welcome and join
    /// announcement so each client starts with an empty inbox.
    pub async fn join_all(&self, count: usize) -> Vec<TestClient> {
        let mut clients: Vec<TestClient> = Vec::new();
        for n in 1..=count {
            let name = format!("User{n}");
            let client = TestClient::join(self.addr, &name).await;
            for earlier in clients.iter_mut() {
                earlier
                    .expect(&format!("[Server] {name} has joined the chat"))
                    .await;
            }
            clients.push(client);
        }
        clients
    }

    /// Wait until the registry holds exactly `count` sessions.
    #[allow(dead_code)]
    pub async fn wait_for_sessions(&self, count: usize) {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while self.state.registry().len() != count {
            assert!(
                tokio::time::Instant::now() < deadline,
                "expected {count} sessions, have {}",
                self.state.registry().len()
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }
}

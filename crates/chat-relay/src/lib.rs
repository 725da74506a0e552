//! Chat Relay Server Library
//!
//! This library contains the connection handling, command dispatch and
//! accept loop of the relay. The server binary is in main.rs and a small
//! interactive client is in bin/chat-client.rs.

pub mod codec;
pub mod connection;
pub mod dispatch;
pub mod error;
pub mod server;
pub mod state;

// Re-export commonly used types
pub use codec::{ChatLineCodec, Inbound};
pub use connection::{handle_connection, run_session};
pub use error::ServerError;
pub use server::ChatServer;
pub use state::RelayState;

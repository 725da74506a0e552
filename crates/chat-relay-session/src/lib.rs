//! # chat-relay-session
//!
//! Session registry and message routing for the chat relay.
//!
//! This crate provides:
//! - Per-connection sessions with a bounded outbound queue
//! - The registry of live sessions and display-name uniqueness
//! - Routing of chat, whisper and system lines to one or many sessions
//! - The transcript (chat log) collaborator
//!
//! ## Architecture
//!
//! This is Layer 1 in the architecture - it depends on chat-relay-core and
//! knows nothing about sockets; the server crate wires sessions to
//! connections.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod registry;
pub mod router;
pub mod session;
pub mod transcript;

// Re-export commonly used types
pub use registry::Registry;
pub use router::Router;
pub use session::{Outbox, Session};
pub use transcript::{FileTranscript, MemoryTranscript, NullTranscript, Transcript};

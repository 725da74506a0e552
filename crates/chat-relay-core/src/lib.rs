//! # chat-relay-core
//!
//! Core types for the chat relay.
//!
//! This crate contains all fundamental types with **no internal dependencies**
//! on other chat-relay crates. It provides:
//!
//! - Session identity and lifecycle status (SessionId, SessionStatus)
//! - Slash-command parsing (Command, CommandKind)
//! - Wire formatting for server-to-client lines
//! - Server configuration
//! - Error types
//!
//! ## Architecture
//!
//! This is Layer 0 in the architecture - all other crates depend on this one,
//! but this crate has no dependencies on other chat-relay crates.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod command;
pub mod config;
pub mod error;
pub mod message;
pub mod session;

// Re-export commonly used types
pub use command::{Command, CommandKind};
pub use config::{AdminSettings, ServerConfig, ServerSettings, TranscriptSettings};
pub use error::{CommandError, Error, Result};
pub use message::{attached_count, format_line, SERVER_SENDER};
pub use session::{validate_name, SessionId, SessionStatus, MAX_NAME_LEN};

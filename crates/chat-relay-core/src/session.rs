//! Session identity and lifecycle types.

use uuid::Uuid;

use crate::{Error, Result, SERVER_SENDER};

/// Maximum length of a display name, in characters.
pub const MAX_NAME_LEN: usize = 32;

/// Stable identity of a connected session.
///
/// Display names change through `/username`; this key never does, so it is
/// what the registry uses to remove a session or exclude it from a broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new random session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of a chat session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionStatus {
    /// Connection accepted, not yet registered
    Connecting,
    /// Registered and reading lines
    Active,
    /// Connection ended, being removed and announced
    Closing,
    /// Fully removed
    Closed,
}

impl SessionStatus {
    /// Whether moving from `self` to `next` follows the lifecycle order.
    ///
    /// Status only moves forward; `Connecting` may go straight to `Closing`
    /// when the peer disconnects before registration completes.
    pub fn can_transition_to(self, next: SessionStatus) -> bool {
        use SessionStatus::*;
        matches!(
            (self, next),
            (Connecting, Active) | (Connecting, Closing) | (Active, Closing) | (Closing, Closed)
        )
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SessionStatus::Connecting => "connecting",
            SessionStatus::Active => "active",
            SessionStatus::Closing => "closing",
            SessionStatus::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Check that `name` can be used as a display name.
///
/// Names travel as a single protocol token (`/w <name> ...`), so they must
/// not contain whitespace. The server's own sender label is reserved.
pub fn validate_name(name: &str) -> Result<()> {
    let invalid = |reason| {
        Err(Error::InvalidName {
            name: name.to_string(),
            reason,
        })
    };

    if name.is_empty() {
        return invalid("name cannot be empty");
    }
    if name.chars().count() > MAX_NAME_LEN {
        return invalid("name is too long (max 32 characters)");
    }
    if name.chars().any(char::is_whitespace) {
        return invalid("name must be a single word");
    }
    if name.chars().any(char::is_control) {
        return invalid("name cannot contain control characters");
    }
    if name.starts_with('/') {
        return invalid("name cannot start with '/'");
    }
    if name.eq_ignore_ascii_case(SERVER_SENDER) {
        return invalid("name is reserved");
    }
    Ok(())
}

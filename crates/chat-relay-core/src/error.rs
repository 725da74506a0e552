//! Error types for the chat relay.

use thiserror::Error;

use crate::CommandKind;

/// Main error type for chat relay operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Requested display name belongs to another live session
    #[error("The username '{0}' is already taken")]
    NameConflict(String),

    /// Requested display name equals the current one
    #[error("You are already known as '{0}'")]
    NameUnchanged(String),

    /// Requested display name is not a valid single token
    #[error("Invalid username '{name}': {reason}")]
    InvalidName {
        /// The rejected name
        name: String,
        /// Why it was rejected
        reason: &'static str,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Usage errors produced while parsing or executing a slash command.
///
/// These are always recoverable: the dispatcher reports them to the
/// requesting client and the connection stays open.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Line was just `/`
    #[error("Empty command. Type /help for a list of commands.")]
    Empty,

    /// Command name not in the command table
    #[error("Unknown command '/{0}'. Type /help for a list of commands.")]
    Unknown(String),

    /// Too few or too many arguments
    #[error("Invalid number of arguments for /{}: expected {expected}, got {got}.", .kind.name())]
    Arity {
        /// Command that was invoked
        kind: CommandKind,
        /// Human-readable expected count
        expected: &'static str,
        /// Number of arguments supplied
        got: usize,
    },

    /// Target name is not a live session
    #[error("User '{0}' is not connected")]
    TargetNotConnected(String),

    /// Command cannot target the requester
    #[error("You cannot use /{} on yourself", .0.name())]
    SelfTarget(CommandKind),

    /// Wrong admin secret for a privileged command
    #[error("Not authorized: incorrect admin password for /{}", .0.name())]
    Unauthorized(CommandKind),

    /// Rename rejected by the registry
    #[error(transparent)]
    Rename(#[from] Error),
}

impl CommandError {
    /// Full multi-line explanation sent back to the requesting client.
    ///
    /// Argument-count errors carry the usage line and examples of the
    /// command so the user can correct the call.
    pub fn describe(&self) -> String {
        match self {
            CommandError::Arity { kind, .. } => {
                let mut text = format!("{self}\nUsage: {}", kind.usage());
                for example in kind.examples() {
                    text.push_str("\nExample: ");
                    text.push_str(example);
                }
                text
            }
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_conflict_error() {
        let err = Error::NameConflict("User2".to_string());
        assert_eq!(err.to_string(), "The username 'User2' is already taken");
    }

    #[test]
    fn test_name_unchanged_error() {
        let err = Error::NameUnchanged("User1".to_string());
        assert_eq!(err.to_string(), "You are already known as 'User1'");
    }

    #[test]
    fn test_invalid_name_error() {
        let err = Error::InvalidName {
            name: "".to_string(),
            reason: "name cannot be empty",
        };
        assert_eq!(err.to_string(), "Invalid username '': name cannot be empty");
    }

    #[test]
    fn test_config_error() {
        let err = Error::Config("server.port is invalid".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: server.port is invalid"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_unknown_command_error() {
        let err = CommandError::Unknown("dance".to_string());
        assert_eq!(
            err.to_string(),
            "Unknown command '/dance'. Type /help for a list of commands."
        );
    }

    #[test]
    fn test_arity_error_describe_is_multi_line() {
        let err = CommandError::Arity {
            kind: CommandKind::Whisper,
            expected: "at least 2",
            got: 1,
        };
        let text = err.describe();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines.len() >= 3);
        assert_eq!(
            lines[0],
            "Invalid number of arguments for /w: expected at least 2, got 1."
        );
        assert!(lines[1].starts_with("Usage: /w"));
        assert!(lines[2].starts_with("Example: /w"));
    }

    #[test]
    fn test_self_target_and_unauthorized() {
        assert_eq!(
            CommandError::SelfTarget(CommandKind::Whisper).to_string(),
            "You cannot use /w on yourself"
        );
        assert_eq!(
            CommandError::Unauthorized(CommandKind::Kick).to_string(),
            "Not authorized: incorrect admin password for /kick"
        );
    }

    #[test]
    fn test_rename_error_is_transparent() {
        let err: CommandError = Error::NameConflict("bob".to_string()).into();
        assert_eq!(err.to_string(), "The username 'bob' is already taken");
        assert_eq!(err.describe(), err.to_string());
    }

    #[test]
    fn test_result_type() {
        let success: Result<i32> = Ok(42);
        assert!(success.is_ok());

        let failure: Result<i32> = Err(Error::Config("bad".to_string()));
        assert!(failure.is_err());
    }
}

//! Slash-command parsing.
//!
//! A command line starts with `/`, followed by a case-insensitive command
//! name and space-separated arguments. Parsing yields a closed [`Command`]
//! enum whose variants carry typed arguments, or a [`CommandError`]
//! describing why the line was rejected.

use crate::CommandError;

/// Prefix that marks a line as a command rather than chat.
pub const COMMAND_PREFIX: char = '/';

/// The set of commands understood by the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// `/help`
    Help,
    /// `/clientlist`, alias `/userlist`
    ClientList,
    /// `/username [newName]`
    Username,
    /// `/w <target> <message...>`
    Whisper,
    /// `/kick <target> <secret>`
    Kick,
}

impl CommandKind {
    /// All commands, in the order `/help` lists them.
    pub const ALL: [CommandKind; 5] = [
        CommandKind::Help,
        CommandKind::ClientList,
        CommandKind::Username,
        CommandKind::Whisper,
        CommandKind::Kick,
    ];

    /// Look up a command by name or alias, ignoring case.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == name || kind.aliases().contains(&name.as_str()))
    }

    /// Canonical command name, without the leading `/`.
    pub fn name(self) -> &'static str {
        match self {
            CommandKind::Help => "help",
            CommandKind::ClientList => "clientlist",
            CommandKind::Username => "username",
            CommandKind::Whisper => "w",
            CommandKind::Kick => "kick",
        }
    }

    /// Alternative names accepted for this command.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            CommandKind::ClientList => &["userlist"],
            _ => &[],
        }
    }

    /// One-line description shown by `/help`.
    pub fn description(self) -> &'static str {
        match self {
            CommandKind::Help => "Show this list of commands",
            CommandKind::ClientList => "List everyone connected to the chat",
            CommandKind::Username => "Show your username, or change it",
            CommandKind::Whisper => "Send a private message to one user",
            CommandKind::Kick => "Disconnect a user (requires the admin password)",
        }
    }

    /// Usage synopsis.
    pub fn usage(self) -> &'static str {
        match self {
            CommandKind::Help => "/help",
            CommandKind::ClientList => "/clientlist",
            CommandKind::Username => "/username [newName]",
            CommandKind::Whisper => "/w <username> <message>",
            CommandKind::Kick => "/kick <username> <adminPassword>",
        }
    }

    /// Example invocations.
    pub fn examples(self) -> &'static [&'static str] {
        match self {
            CommandKind::Help => &["/help"],
            CommandKind::ClientList => &["/clientlist", "/userlist"],
            CommandKind::Username => &["/username", "/username alice"],
            CommandKind::Whisper => &["/w User2 are you there?"],
            CommandKind::Kick => &["/kick User3 s3cret"],
        }
    }

    /// Accepted argument count as `(min, max)`; `None` means unbounded.
    pub fn arity(self) -> (usize, Option<usize>) {
        match self {
            CommandKind::Help | CommandKind::ClientList => (0, Some(0)),
            CommandKind::Username => (0, Some(1)),
            CommandKind::Whisper => (2, None),
            CommandKind::Kick => (2, Some(2)),
        }
    }

    fn expected_args(self) -> &'static str {
        match self {
            CommandKind::Help | CommandKind::ClientList => "no arguments",
            CommandKind::Username => "0 or 1",
            CommandKind::Whisper => "at least 2",
            CommandKind::Kick => "exactly 2",
        }
    }

    /// Validate an argument count against [`CommandKind::arity`].
    pub fn check_arity(self, got: usize) -> Result<(), CommandError> {
        let (min, max) = self.arity();
        if got < min || max.is_some_and(|max| got > max) {
            return Err(CommandError::Arity {
                kind: self,
                expected: self.expected_args(),
                got,
            });
        }
        Ok(())
    }

    /// Full `/help` listing: every command with its description, usage and examples.
    pub fn help_text() -> String {
        let mut text = String::from("Available commands:");
        for kind in Self::ALL {
            text.push_str(&format!("\n/{}", kind.name()));
            for alias in kind.aliases() {
                text.push_str(&format!(" (alias: /{alias})"));
            }
            text.push_str(&format!(" - {}", kind.description()));
            text.push_str(&format!("\n  Usage: {}", kind.usage()));
            for example in kind.examples() {
                text.push_str(&format!("\n  Example: {example}"));
            }
        }
        text
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}", self.name())
    }
}

/// A parsed command with its typed arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List all commands
    Help,
    /// List connected users
    ClientList,
    /// Show (`None`) or change the requester's name
    Username(Option<String>),
    /// Private message
    Whisper {
        /// Recipient name
        target: String,
        /// Message words joined with single spaces
        message: String,
    },
    /// Forced disconnect
    Kick {
        /// Name of the session to disconnect
        target: String,
        /// Admin secret supplied by the requester
        secret: String,
    },
}

impl Command {
    /// Whether a (trimmed) line should be handled as a command.
    pub fn is_command(line: &str) -> bool {
        line.starts_with(COMMAND_PREFIX)
    }

    /// Parse a command line such as `/w User2 hello there`.
    ///
    /// Arguments are separated by spaces; runs of spaces do not produce
    /// empty arguments.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let body = line.strip_prefix(COMMAND_PREFIX).unwrap_or(line);
        let mut tokens = body.split(' ').filter(|token| !token.is_empty());

        let name = tokens.next().ok_or(CommandError::Empty)?;
        let kind =
            CommandKind::from_name(name).ok_or_else(|| CommandError::Unknown(name.to_string()))?;

        let args: Vec<&str> = tokens.collect();
        kind.check_arity(args.len())?;

        let command = match kind {
            CommandKind::Help => Command::Help,
            CommandKind::ClientList => Command::ClientList,
            CommandKind::Username => Command::Username(args.first().map(|s| s.to_string())),
            CommandKind::Whisper => Command::Whisper {
                target: args[0].to_string(),
                message: args[1..].join(" "),
            },
            CommandKind::Kick => Command::Kick {
                target: args[0].to_string(),
                secret: args[1].to_string(),
            },
        };
        Ok(command)
    }

    /// The kind of this command.
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Help => CommandKind::Help,
            Command::ClientList => CommandKind::ClientList,
            Command::Username(_) => CommandKind::Username,
            Command::Whisper { .. } => CommandKind::Whisper,
            Command::Kick { .. } => CommandKind::Kick,
        }
    }
}

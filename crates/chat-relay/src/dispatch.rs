//! Slash-command dispatch.
//!
//! Each handler returns `Result<(), CommandError>`. Errors are usage
//! problems: [`handle_command`] reports them to the requesting client only
//! and logs a warning. The connection always stays open.

use std::sync::Arc;

use tracing::{debug, info, warn};

use chat_relay_core::{Command, CommandError, CommandKind, SERVER_SENDER};
use chat_relay_session::Session;

use crate::state::RelayState;

/// Run a command line for `session` and report any error back to it.
pub fn handle_command(state: &RelayState, session: &Arc<Session>, line: &str) {
    if let Err(err) = dispatch(state, session, line) {
        warn!(
            "Command rejected: id={}, name={}, command={}, error={}",
            session.id(),
            session.name(),
            command_word(line),
            err
        );
        state.router().send_server(session, &err.describe());
    }
}

/// The command word of `line`, without arguments.
///
/// Arguments can hold the admin secret, so they never reach the log.
fn command_word(line: &str) -> &str {
    line.split_whitespace().next().unwrap_or_default()
}

/// Parse and execute a command line.
pub fn dispatch(
    state: &RelayState,
    session: &Arc<Session>,
    line: &str,
) -> Result<(), CommandError> {
    let command = Command::parse(line)?;
    debug!(
        "Dispatching {}: id={}, name={}",
        command.kind(),
        session.id(),
        session.name()
    );

    match command {
        Command::Help => help(state, session),
        Command::ClientList => client_list(state, session),
        Command::Username(None) => show_username(state, session),
        Command::Username(Some(new_name)) => rename(state, session, &new_name),
        Command::Whisper { target, message } => whisper(state, session, &target, &message),
        Command::Kick { target, secret } => kick(state, session, &target, &secret),
    }
}

fn help(state: &RelayState, session: &Session) -> Result<(), CommandError> {
    state
        .router()
        .send_server(session, &CommandKind::help_text());
    Ok(())
}

fn client_list(state: &RelayState, session: &Session) -> Result<(), CommandError> {
    let sessions = state.registry().snapshot();
    let mut text = format!("Connected users ({}):", sessions.len());
    for other in &sessions {
        text.push_str("\n  ");
        text.push_str(&other.name());
        if other.id() == session.id() {
            text.push_str(" (you)");
        }
    }
    state.router().send_server(session, &text);
    Ok(())
}

fn show_username(state: &RelayState, session: &Session) -> Result<(), CommandError> {
    let text = format!(
        "Your username is {}\nTo change it, type {}",
        session.name(),
        CommandKind::Username.usage()
    );
    state.router().send_server(session, &text);
    Ok(())
}

fn rename(state: &RelayState, session: &Session, new_name: &str) -> Result<(), CommandError> {
    let old_name = state.registry().rename(session, new_name)?;

    let announcement = format!("{old_name} is now known as {new_name}");
    state
        .router()
        .send_server(session, &format!("You are now known as {new_name}"));
    state
        .router()
        .broadcast_except(session.id(), &announcement, SERVER_SENDER);
    state.transcript().record(SERVER_SENDER, &announcement);
    Ok(())
}

fn whisper(
    state: &RelayState,
    session: &Session,
    target: &str,
    message: &str,
) -> Result<(), CommandError> {
    let recipient = state
        .registry()
        .find(target)
        .ok_or_else(|| CommandError::TargetNotConnected(target.to_string()))?;
    if recipient.id() == session.id() {
        return Err(CommandError::SelfTarget(CommandKind::Whisper));
    }

    let sender = session.name();
    state
        .router()
        .send_to(&recipient, &format!("(private) {message}"), &sender);
    debug!("Whisper delivered: from={}, to={}", sender, target);
    state.transcript().record(
        SERVER_SENDER,
        &format!("{sender} sent a private message to {target}"),
    );
    Ok(())
}

fn kick(
    state: &RelayState,
    session: &Session,
    target: &str,
    secret: &str,
) -> Result<(), CommandError> {
    let victim = state
        .registry()
        .find(target)
        .ok_or_else(|| CommandError::TargetNotConnected(target.to_string()))?;
    if !state.check_admin_secret(secret) {
        return Err(CommandError::Unauthorized(CommandKind::Kick));
    }
    if victim.id() == session.id() {
        return Err(CommandError::SelfTarget(CommandKind::Kick));
    }

    let requester = session.name();
    state.router().send_server(
        &victim,
        &format!("You have been kicked from the chat by {requester}"),
    );
    victim.close();

    info!(
        "Session kicked: id={}, name={}, by={}",
        victim.id(),
        target,
        requester
    );
    state
        .transcript()
        .record(SERVER_SENDER, &format!("{requester} kicked {target}"));
    Ok(())
}

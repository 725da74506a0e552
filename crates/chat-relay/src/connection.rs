//! Per-connection session lifecycle.
//!
//! A connection moves through `Connecting -> Active -> Closing -> Closed`:
//! it is registered and announced, then reads lines until the peer leaves,
//! a read fails, or the session is force-closed (`/kick` or a full outbound
//! queue). Every way out takes the same disconnect path.

use std::net::SocketAddr;
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, info, warn};

use chat_relay_core::{attached_count, Command, SessionStatus, SERVER_SENDER};
use chat_relay_session::{Outbox, Session};

use crate::codec::{ChatLineCodec, Inbound};
use crate::dispatch;
use crate::state::RelayState;

/// Handle an accepted TCP connection until it closes.
pub async fn handle_connection(stream: TcpStream, state: Arc<RelayState>) {
    let peer = stream.peer_addr().ok();
    if let Err(e) = stream.set_nodelay(true) {
        debug!("Failed to set TCP_NODELAY for {:?}: {}", peer, e);
    }
    let (reader, writer) = stream.into_split();
    run_session(reader, writer, peer, state).await;
}

/// Run one chat session over any byte stream halves.
pub async fn run_session<R, W>(
    reader: R,
    writer: W,
    peer: Option<SocketAddr>,
    state: Arc<RelayState>,
) where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let codec = ChatLineCodec::new(state.max_line_length());
    let mut lines = FramedRead::new(reader, codec.clone());
    let sink = FramedWrite::new(writer, codec);

    let (session, outbox) = Session::open(peer, state.outbound_queue());
    let writer_task = tokio::spawn(write_loop(sink, outbox, Arc::clone(&session)));

    connect(&state, &session);
    read_loop(&state, &session, &mut lines).await;
    disconnect(&state, &session);

    session.close();
    if let Err(e) = writer_task.await {
        warn!("Writer task failed: id={}, error={}", session.id(), e);
    }
    session.set_status(SessionStatus::Closed);
    debug!("Session finished: id={}", session.id());
}

fn connect(state: &RelayState, session: &Arc<Session>) {
    let name = state.registry().register(session);
    session.set_status(SessionStatus::Active);
    info!(
        "Client connected: id={}, name={}, peer={:?}",
        session.id(),
        name,
        session.peer()
    );

    state.router().send_server(
        session,
        &format!("Welcome to the chat, {name}\nType /help for a list of commands."),
    );

    let joined = format!("{name} has joined the chat");
    state
        .router()
        .broadcast_except(session.id(), &joined, SERVER_SENDER);
    state.transcript().record(SERVER_SENDER, &joined);
    state
        .transcript()
        .record(SERVER_SENDER, &attached_count(state.registry().len()));
}

async fn read_loop<R>(
    state: &RelayState,
    session: &Arc<Session>,
    lines: &mut FramedRead<R, ChatLineCodec>,
) where
    R: AsyncRead + Unpin,
{
    loop {
        let frame = tokio::select! {
            biased;
            _ = session.closed() => {
                debug!("Session closed by server: id={}", session.id());
                break;
            }
            frame = lines.next() => frame,
        };

        match frame {
            Some(Ok(Inbound::Line(raw))) => handle_line(state, session, &raw),
            Some(Ok(Inbound::Overlong)) => {
                warn!(
                    "Discarded overlong line: id={}, limit={}",
                    session.id(),
                    state.max_line_length()
                );
                state.router().send_server(
                    session,
                    &format!(
                        "Line too long (max {} bytes); message discarded",
                        state.max_line_length()
                    ),
                );
            }
            Some(Err(e)) => {
                warn!("Read error: id={}, error={}", session.id(), e);
                break;
            }
            None => {
                debug!("Peer closed connection: id={}", session.id());
                break;
            }
        }
    }
}

fn handle_line(state: &RelayState, session: &Arc<Session>, raw: &str) {
    let line = raw.trim();
    if line.is_empty() {
        return;
    }

    if Command::is_command(line) {
        dispatch::handle_command(state, session, line);
        return;
    }

    let name = session.name();
    state.transcript().record(&name, line);
    state.router().broadcast_except(session.id(), line, &name);
}

/// Remove the session and announce the departure.
///
/// Only the call that actually removes the session announces it, so a
/// close racing a kick produces one announcement.
fn disconnect(state: &RelayState, session: &Session) {
    session.set_status(SessionStatus::Closing);
    let Some(remaining) = state.registry().unregister(session) else {
        return;
    };

    let name = session.name();
    let duration = session.connected_at().elapsed().unwrap_or_default();
    info!(
        "Client disconnected: id={}, name={}, duration={}s",
        session.id(),
        name,
        duration.as_secs()
    );

    let left = format!("{name} has left the chat");
    state.transcript().record(SERVER_SENDER, &left);
    state.router().broadcast_all(&left, SERVER_SENDER);
    state
        .transcript()
        .record(SERVER_SENDER, &attached_count(remaining));
}

async fn write_loop<W>(
    mut sink: FramedWrite<W, ChatLineCodec>,
    mut outbox: Outbox,
    session: Arc<Session>,
) where
    W: AsyncWrite + Unpin,
{
    while let Some(line) = outbox.recv().await {
        if let Err(e) = sink.send(line).await {
            debug!("Write error: id={}, error={}", session.id(), e);
            session.close();
            return;
        }
    }
    if let Err(e) = sink.close().await {
        debug!("Shutdown error: id={}, error={}", session.id(), e);
    }
}

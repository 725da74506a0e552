//! Line-oriented TCP test client.
//!
//! Note: Some methods may appear unused because they're only used in specific
//! test files and clippy checks each test independently.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);
const SILENCE_WINDOW: Duration = Duration::from_millis(200);

/// A chat client driven by the test.
pub struct TestClient {
    lines: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

#[allow(dead_code)]
impl TestClient {
    /// Open a raw connection.
    pub async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.expect("Failed to connect");
        let (reader, writer) = stream.into_split();
        Self {
            lines: BufReader::new(reader).lines(),
            writer,
        }
    }

    /// Connect and consume the welcome lines, checking the assigned name.
    pub async fn join(addr: SocketAddr, expected_name: &str) -> Self {
        let mut client = Self::connect(addr).await;
        client
            .expect(&format!("[Server] Welcome to the chat, {expected_name}"))
            .await;
        client
            .expect("[Server] Type /help for a list of commands.")
            .await;
        client
    }

    /// Send one line.
    pub async fn send(&mut self, line: &str) {
        self.writer
            .write_all(format!("{line}\n").as_bytes())
            .await
            .expect("Failed to send");
    }

    /// Receive with timeout; `None` if nothing arrived.
    pub async fn recv_timeout(&mut self, duration: Duration) -> Option<String> {
        match tokio::time::timeout(duration, self.lines.next_line()).await {
            Ok(Ok(Some(line))) => Some(line),
            Ok(Ok(None)) => panic!("Connection closed"),
            Ok(Err(e)) => panic!("Read error: {e}"),
            Err(_) => None,
        }
    }

    /// Receive the next line.
    pub async fn recv(&mut self) -> String {
        self.recv_timeout(RECV_TIMEOUT)
            .await
            .expect("Timed out waiting for a line")
    }

    /// Receive the next line and compare it.
    pub async fn expect(&mut self, expected: &str) {
        assert_eq!(self.recv().await, expected);
    }

    /// Assert that nothing arrives for a short while.
    pub async fn expect_silence(&mut self) {
        if let Some(line) = self.recv_timeout(SILENCE_WINDOW).await {
            panic!("Expected no message, got {line:?}");
        }
    }

    /// Assert that the server closes the connection.
    pub async fn expect_closed(&mut self) {
        match tokio::time::timeout(RECV_TIMEOUT, self.lines.next_line()).await {
            Ok(Ok(None)) | Ok(Err(_)) => {}
            Ok(Ok(Some(line))) => panic!("Expected close, got {line:?}"),
            Err(_) => panic!("Timed out waiting for close"),
        }
    }

    /// Close our side of the connection.
    pub async fn leave(mut self) {
        self.writer.shutdown().await.expect("Failed to shut down");
    }
}

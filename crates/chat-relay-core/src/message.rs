//! Wire formatting for server-to-client lines.
//!
//! Every line the server writes has the shape `[<sender>] <text>`; the
//! trailing newline is added by the transport codec.

/// Sender label used for system and command-reply lines.
pub const SERVER_SENDER: &str = "Server";

/// Format one outbound line from `from`.
pub fn format_line(from: &str, text: &str) -> String {
    format!("[{from}] {text}")
}

/// Pluralized attached-client count, e.g. `1 client attached`.
pub fn attached_count(count: usize) -> String {
    let noun = if count == 1 { "client" } else { "clients" };
    format!("{count} {noun} attached")
}

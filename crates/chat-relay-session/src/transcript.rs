//! Chat transcript: the durable record of chat lines and server events.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{info, warn};

use chat_relay_core::{format_line, Result};

/// Sender label of the transcript's own header line.
pub const LOGGER_SENDER: &str = "Logger";

/// Sink for chat lines and lifecycle events.
///
/// Recording never fails the caller.
pub trait Transcript: Send + Sync {
    /// Record `text` as sent by `sender`.
    fn record(&self, sender: &str, text: &str);

    /// Push buffered records to durable storage.
    fn flush(&self) {}
}

/// Transcript written to a file, one timestamped line per record.
///
/// Lines look like `2024-05-01 13:37:00 [User1] hello`. When echo is on,
/// each record is also logged to the operator console as `[User1] hello`.
///
/// Writes are buffered and reach the file on [`Transcript::flush`] or drop,
/// so the lock is held for a memory copy rather than a disk write.
#[derive(Debug)]
pub struct FileTranscript {
    path: PathBuf,
    file: Mutex<BufWriter<File>>,
    echo: bool,
}

impl FileTranscript {
    /// Create (or truncate) the transcript file and write its header line.
    pub fn create<P: AsRef<Path>>(path: P, echo: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)?;
        let transcript = Self {
            path,
            file: Mutex::new(BufWriter::new(file)),
            echo,
        };
        transcript.write_line(LOGGER_SENDER, "Starting new log");
        transcript.flush();
        Ok(transcript)
    }

    /// Get the transcript file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_line(&self, sender: &str, text: &str) {
        let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        let line = format!("{timestamp} {}\n", format_line(sender, text.trim_end()));
        if let Err(e) = self.file.lock().write_all(line.as_bytes()) {
            warn!("Failed to write transcript {}: {}", self.path.display(), e);
        }
    }
}

impl Transcript for FileTranscript {
    fn record(&self, sender: &str, text: &str) {
        self.write_line(sender, text);
        if self.echo {
            info!(target: "chat", "{}", format_line(sender, text.trim_end()));
        }
    }

    fn flush(&self) {
        if let Err(e) = self.file.lock().flush() {
            warn!("Failed to flush transcript {}: {}", self.path.display(), e);
        }
    }
}

/// In-memory transcript, mostly useful in tests.
#[derive(Debug, Default)]
pub struct MemoryTranscript {
    entries: Mutex<Vec<(String, String)>>,
}

impl MemoryTranscript {
    /// Create an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// All `(sender, text)` records so far.
    pub fn entries(&self) -> Vec<(String, String)> {
        self.entries.lock().clone()
    }

    /// Whether `sender` recorded exactly `text`.
    pub fn contains(&self, sender: &str, text: &str) -> bool {
        self.entries
            .lock()
            .iter()
            .any(|(s, t)| s == sender && t == text)
    }
}

impl Transcript for MemoryTranscript {
    fn record(&self, sender: &str, text: &str) {
        self.entries
            .lock()
            .push((sender.to_string(), text.trim_end().to_string()));
    }
}

/// Transcript that discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTranscript;

impl Transcript for NullTranscript {
    fn record(&self, _sender: &str, _text: &str) {}
}

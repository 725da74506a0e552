//! Configuration types for the chat relay.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::Error;

/// Admin secret used when none is configured.
pub const DEFAULT_ADMIN_SECRET: &str = "changeme";

/// Environment variable holding a config file path.
pub const ENV_CONFIG: &str = "CHAT_RELAY_CONFIG";

/// Environment variable overriding the admin secret.
pub const ENV_ADMIN_SECRET: &str = "CHAT_RELAY_ADMIN_SECRET";

/// Environment variables overriding the listening port, in lookup order.
pub const ENV_PORT: [&str; 2] = ["PORT", "port"];

/// Server configuration loaded from YAML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener and connection settings
    pub server: ServerSettings,
    /// Privileged command settings
    pub admin: AdminSettings,
    /// Transcript (chat log) settings
    pub transcript: TranscriptSettings,
}

impl ServerConfig {
    /// Load configuration from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML string.
    pub fn from_yaml(yaml: &str) -> crate::Result<Self> {
        let config: ServerConfig =
            serde_yaml::from_str(yaml).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) -> crate::Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides using `lookup` to read variables.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> crate::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = ENV_PORT.iter().find_map(|&key| lookup(key)) {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("invalid port '{port}'")))?;
        }
        if let Some(secret) = lookup(ENV_ADMIN_SECRET) {
            self.admin.secret = secret;
        }
        self.validate()
    }

    /// Validate configuration values.
    pub fn validate(&self) -> crate::Result<()> {
        if self.server.max_line_length == 0 {
            return Err(Error::Config(
                "server.max_line_length must be > 0".to_string(),
            ));
        }

        if self.server.outbound_queue == 0 {
            return Err(Error::Config("server.outbound_queue must be > 0".to_string()));
        }

        // The secret is passed as a single /kick argument
        if self.admin.secret.is_empty() || self.admin.secret.chars().any(char::is_whitespace) {
            return Err(Error::Config(
                "admin.secret must be a single non-empty word".to_string(),
            ));
        }

        if self.transcript.path.as_os_str().is_empty() {
            return Err(Error::Config("transcript.path cannot be empty".to_string()));
        }

        Ok(())
    }

    /// Address string to bind, e.g. `0.0.0.0:3000`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Whether the admin secret is still the built-in default.
    pub fn uses_default_secret(&self) -> bool {
        self.admin.secret == DEFAULT_ADMIN_SECRET
    }
}

/// Listener and connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Interface to bind
    pub host: String,
    /// TCP port (0 = pick an ephemeral port)
    pub port: u16,
    /// Longest accepted inbound line, in bytes
    pub max_line_length: usize,
    /// Outbound lines queued per client before it is disconnected
    pub outbound_queue: usize,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            max_line_length: 4096,
            outbound_queue: 256,
            log_level: "info".to_string(),
        }
    }
}

/// Privileged command settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminSettings {
    /// Shared secret required by `/kick`
    pub secret: String,
}

impl Default for AdminSettings {
    fn default() -> Self {
        Self {
            secret: DEFAULT_ADMIN_SECRET.to_string(),
        }
    }
}

/// Transcript settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptSettings {
    /// Chat log file, truncated at startup
    pub path: PathBuf,
    /// Echo transcript lines to the operator console
    pub echo_to_console: bool,
}

impl Default for TranscriptSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("chat.log"),
            echo_to_console: true,
        }
    }
}

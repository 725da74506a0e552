//! # Chat Relay Server
//!
//! Multi-user chat over plain TCP. Clients send newline-delimited text;
//! every line is relayed to the other connected clients, and lines starting
//! with `/` are commands (`/help`, `/clientlist`, `/username`, `/w`, `/kick`).
//!
//! ## Architecture
//!
//! This is Layer 2 - the server binary that ties together:
//! - chat-relay-core: Core types, commands and configuration
//! - chat-relay-session: Registry, routing and transcript
//! - chat-relay (lib): Framing, lifecycle and command dispatch

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use chat_relay::ChatServer;
use chat_relay_core::config::ENV_CONFIG;
use chat_relay_core::{ServerConfig, SERVER_SENDER};
use chat_relay_session::{FileTranscript, Transcript};

const USAGE: &str = "Usage: chat-relay [--config <path>] [--port <port>]";

/// Command line options.
#[derive(Debug, Default, PartialEq, Eq)]
struct CliOptions {
    config: Option<PathBuf>,
    port: Option<u16>,
    help: bool,
}

fn parse_args(args: &[String]) -> anyhow::Result<CliOptions> {
    let mut options = CliOptions::default();
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = iter.next().context("--config requires a path")?;
                options.config = Some(PathBuf::from(path));
            }
            "--port" | "-p" => {
                let port = iter.next().context("--port requires a value")?;
                options.port = Some(
                    port.parse()
                        .with_context(|| format!("invalid port '{port}'"))?,
                );
            }
            "--help" | "-h" => options.help = true,
            other => bail!("unknown argument '{other}'\n{USAGE}"),
        }
    }
    Ok(options)
}

fn load_config(options: &CliOptions) -> anyhow::Result<ServerConfig> {
    let path = options
        .config
        .clone()
        .or_else(|| std::env::var_os(ENV_CONFIG).map(PathBuf::from));

    let mut config = match path {
        Some(path) => ServerConfig::from_file(&path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => ServerConfig::default(),
    };
    config.apply_env()?;
    if let Some(port) = options.port {
        config.server.port = port;
    }
    Ok(config)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let options = parse_args(&args)?;
    if options.help {
        println!("{USAGE}");
        return Ok(());
    }

    let config = load_config(&options)?;

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.server.log_level)),
        )
        .init();

    let transcript = Arc::new(
        FileTranscript::create(&config.transcript.path, config.transcript.echo_to_console)
            .with_context(|| {
                format!(
                    "failed to create transcript {}",
                    config.transcript.path.display()
                )
            })?,
    );
    transcript.record(SERVER_SENDER, "Starting Chat Server...");

    if config.uses_default_secret() {
        tracing::warn!(
            "Using the built-in admin secret for /kick; set admin.secret or CHAT_RELAY_ADMIN_SECRET"
        );
    }

    let server = ChatServer::bind(&config, transcript.clone())
        .await
        .map_err(|e| {
            tracing::error!("Error starting server: {}", e);
            e
        })?;

    server.run_until(shutdown_signal()).await;

    transcript.record(SERVER_SENDER, "Received SIGINT.  Shutting down chat server");
    transcript.record(SERVER_SENDER, "Goodbye.");
    transcript.flush();

    Ok(())
}

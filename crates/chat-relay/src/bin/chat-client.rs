//! Interactive chat client.
//!
//! Connects to a chat relay, sends each line typed on stdin and prints every
//! line received from the server.
//!
//! Usage: `chat-client [host] [port]` (defaults: `localhost`, `$PORT` or 3000)

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 3000;

fn target_addr(args: &[String]) -> anyhow::Result<String> {
    let host = args.get(1).map(String::as_str).unwrap_or(DEFAULT_HOST);
    let port: u16 = match args.get(2) {
        Some(port) => port
            .parse()
            .with_context(|| format!("invalid port '{port}'"))?,
        None => std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT),
    };
    Ok(format!("{host}:{port}"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let addr = target_addr(&args)?;

    let stream = TcpStream::connect(&addr)
        .await
        .with_context(|| format!("failed to connect to {addr}"))?;
    println!("Successfully connected to server {addr}.  Ctrl+C to disconnect.");

    let (reader, mut writer) = stream.into_split();
    let mut server_lines = BufReader::new(reader).lines();
    let mut input_lines = BufReader::new(tokio::io::stdin()).lines();
    let mut input_open = true;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                println!("Received termination signal...");
                println!("Leaving the chat...");
                println!("Bye.");
                break;
            }
            received = server_lines.next_line() => match received {
                Ok(Some(line)) => println!("{}", line.trim()),
                Ok(None) => {
                    println!("The connection to the server has been terminated.");
                    break;
                }
                Err(e) => {
                    println!("Client error: {e}");
                    break;
                }
            },
            typed = input_lines.next_line(), if input_open => match typed {
                Ok(Some(line)) => {
                    if let Err(e) = writer.write_all(format!("{line}\n").as_bytes()).await {
                        println!("Client error: {e}");
                        break;
                    }
                }
                Ok(None) => {
                    // stdin closed: stop sending but keep printing until the server hangs up
                    input_open = false;
                    if let Err(e) = writer.shutdown().await {
                        tracing::debug!("Failed to shut down write half: {}", e);
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to read stdin: {}", e);
                    input_open = false;
                }
            },
        }
    }

    Ok(())
}

//! Standalone server binary.
//!
//! Usage:
//!   cargo run -p skidrow_server -- [--config server.json] [--addr 127.0.0.1:3001] [--tick-hz 30]
//!   cargo run -p skidrow_server -- --print-config   # dump the effective config as JSON
//!
//! The server accepts TCP clients, hosts lobbies, and runs one fixed-rate
//! simulation task per started game. `RUST_LOG` controls log filtering.

use std::env;

use anyhow::Context;
use skidrow_server::GameServer;
use skidrow_shared::config::ServerConfig;
use tracing::info;

fn parse_args() -> anyhow::Result<ServerConfig> {
    let args: Vec<String> = env::args().collect();

    let mut cfg = match args.iter().position(|a| a == "--config") {
        Some(i) if i + 1 < args.len() => {
            let path = &args[i + 1];
            let text = std::fs::read_to_string(path).with_context(|| format!("read config {path}"))?;
            ServerConfig::from_json_str(&text).with_context(|| format!("parse config {path}"))?
        }
        _ => ServerConfig::default(),
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--addr" if i + 1 < args.len() => {
                cfg.server_addr = args[i + 1].clone();
                i += 2;
            }
            "--tick-hz" if i + 1 < args.len() => {
                cfg.tick_hz = args[i + 1].parse().unwrap_or(30);
                i += 2;
            }
            _ => i += 1,
        }
    }
    Ok(cfg)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cfg = parse_args()?;
    if env::args().any(|a| a == "--print-config") {
        println!("{}", serde_json::to_string_pretty(&cfg).context("serialize config")?);
        return Ok(());
    }
    info!(
        addr = %cfg.server_addr,
        tick_hz = cfg.tick_hz,
        max_players = cfg.max_players_per_lobby,
        "Starting server"
    );

    let server = GameServer::bind(cfg).await.context("create server")?;
    let local = server.local_addr()?;
    info!(%local, "Server listening");

    server.run().await
}

//! Configuration system.
//!
//! Loads server configuration from JSON strings (file IO left to the binary).

use serde::{Deserialize, Serialize};

/// Root configuration for the game host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address, e.g. `127.0.0.1:3001`.
    pub server_addr: String,
    /// Fixed simulation tick rate shared by every room.
    pub tick_hz: u32,
    /// Seats per lobby.
    #[serde(default = "default_max_players")]
    pub max_players_per_lobby: usize,
    /// Depth of each room's inbound command queue.
    #[serde(default = "default_command_queue")]
    pub command_queue: usize,
}

fn default_max_players() -> usize {
    4
}

fn default_command_queue() -> usize {
    256
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:3001".to_string(),
            tick_hz: 30,
            max_players_per_lobby: default_max_players(),
            command_queue: default_command_queue(),
        }
    }
}

impl ServerConfig {
    /// Parses config from JSON.
    pub fn from_json_str(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_fills_defaults() {
        let cfg = ServerConfig::from_json_str(r#"{"server_addr":"0.0.0.0:9000","tick_hz":20}"#)
            .unwrap();
        assert_eq!(cfg.tick_hz, 20);
        assert_eq!(cfg.max_players_per_lobby, 4);
        assert_eq!(cfg.command_queue, 256);
    }
}

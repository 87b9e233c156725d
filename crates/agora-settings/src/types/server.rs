//! Server, database and logging settings.

use serde::{Deserialize, Serialize};

/// Network and viewer-connection settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// Bind port (`0` picks a free port).
    pub port: u16,
    /// Maximum concurrently connected viewers across all rooms.
    pub max_viewers: usize,
    /// Bounded outbound queue per viewer; a full queue disconnects the viewer.
    pub outbound_queue_capacity: usize,
    /// Interval between server Ping frames.
    pub ping_interval_secs: u64,
    /// Disconnect a viewer after this long without any inbound frame.
    pub pong_timeout_secs: u64,
    /// How long to wait for tasks to drain on shutdown.
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            max_viewers: 4096,
            outbound_queue_capacity: 64,
            ping_interval_secs: 30,
            pong_timeout_secs: 60,
            shutdown_timeout_secs: 10,
        }
    }
}

/// `SQLite` settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatabaseSettings {
    /// Database file. Relative paths resolve against `~/.agora`.
    pub path: String,
    /// `PRAGMA busy_timeout` in milliseconds.
    pub busy_timeout_ms: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: "agora.db".to_string(),
            busy_timeout_ms: 5_000,
        }
    }
}

/// Log output settings. `RUST_LOG` takes precedence over `level`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Default filter directive, e.g. `info` or `agora_server=debug`.
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

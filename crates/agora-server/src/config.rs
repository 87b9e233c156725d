//! Server configuration.

use std::time::Duration;

use agora_settings::ServerSettings;
use serde::{Deserialize, Serialize};

use crate::websocket::SessionConfig;

/// Configuration for the Agora server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind (default `"127.0.0.1"`).
    pub host: String,
    /// Port to bind (default `0` for auto-assign).
    pub port: u16,
    /// Maximum concurrent viewers across all rooms.
    pub max_viewers: usize,
    /// Bounded outbound queue per viewer.
    pub outbound_queue_capacity: usize,
    /// Interval between server Ping frames, in seconds.
    pub ping_interval_secs: u64,
    /// Idle seconds before a silent viewer is dropped.
    pub pong_timeout_secs: u64,
    /// Seconds to wait for tasks on shutdown.
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            max_viewers: 4096,
            outbound_queue_capacity: 64,
            ping_interval_secs: 30,
            pong_timeout_secs: 60,
            shutdown_timeout_secs: 10,
        }
    }
}

impl ServerConfig {
    /// Build from loaded settings. Zero sizes and intervals are raised to one.
    pub fn from_settings(settings: &ServerSettings) -> Self {
        Self {
            host: settings.host.clone(),
            port: settings.port,
            max_viewers: settings.max_viewers,
            outbound_queue_capacity: settings.outbound_queue_capacity.max(1),
            ping_interval_secs: settings.ping_interval_secs.max(1),
            pong_timeout_secs: settings.pong_timeout_secs.max(1),
            shutdown_timeout_secs: settings.shutdown_timeout_secs,
        }
    }

    /// `host:port` for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Shutdown drain timeout.
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout_secs)
    }

    /// Per-viewer socket settings.
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            outbound_queue_capacity: self.outbound_queue_capacity.max(1),
            ping_interval: Duration::from_secs(self.ping_interval_secs.max(1)),
            pong_timeout: Duration::from_secs(self.pong_timeout_secs.max(1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.port, 0);
        assert_eq!(cfg.bind_addr(), "127.0.0.1:0");
        assert_eq!(cfg.shutdown_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn from_settings_copies_values() {
        let settings = ServerSettings {
            host: "0.0.0.0".into(),
            port: 9000,
            max_viewers: 7,
            outbound_queue_capacity: 3,
            ping_interval_secs: 5,
            pong_timeout_secs: 12,
            shutdown_timeout_secs: 4,
        };
        let cfg = ServerConfig::from_settings(&settings);
        assert_eq!(cfg.bind_addr(), "0.0.0.0:9000");
        assert_eq!(cfg.max_viewers, 7);

        let session = cfg.session_config();
        assert_eq!(session.outbound_queue_capacity, 3);
        assert_eq!(session.ping_interval, Duration::from_secs(5));
        assert_eq!(session.pong_timeout, Duration::from_secs(12));
    }

    #[test]
    fn zero_values_are_raised() {
        let settings = ServerSettings {
            outbound_queue_capacity: 0,
            ping_interval_secs: 0,
            ..ServerSettings::default()
        };
        let session = ServerConfig::from_settings(&settings).session_config();
        assert_eq!(session.outbound_queue_capacity, 1);
        assert_eq!(session.ping_interval, Duration::from_secs(1));
    }
}

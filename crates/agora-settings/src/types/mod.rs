//! Settings types.
//!
//! Every struct uses `#[serde(default)]` so a partial settings file only
//! needs to name the keys it changes.

mod server;

pub use server::{DatabaseSettings, LoggingSettings, ServerSettings};

use serde::{Deserialize, Serialize};

/// Root settings object.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgoraSettings {
    /// HTTP/WebSocket server.
    pub server: ServerSettings,
    /// `SQLite` store.
    pub database: DatabaseSettings,
    /// Log output.
    pub logging: LoggingSettings,
}

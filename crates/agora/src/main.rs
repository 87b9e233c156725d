//! # agora
//!
//! Agora server binary: loads settings, opens the store and serves the HTTP
//! and WebSocket API until Ctrl-C.

#![deny(unsafe_code)]

mod logging;

use std::path::{Path, PathBuf};
use std::time::Duration;

use agora_server::{AgoraServer, ServerConfig};
use agora_settings::{AgoraSettings, agora_home, load_settings_from_path, settings_path};
use agora_store::Database;
use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

/// Real-time room message board server.
#[derive(Parser, Debug)]
#[command(name = "agora", about = "Real-time room message board server")]
struct Cli {
    /// Host to bind (overrides settings).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind, 0 for auto-assign (overrides settings).
    #[arg(long)]
    port: Option<u16>,

    /// Path to the `SQLite` database (overrides settings).
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Settings file (default `~/.agora/settings.json`).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Emit JSON log lines.
    #[arg(long)]
    log_json: bool,
}

impl Cli {
    /// Apply command-line overrides on top of loaded settings.
    fn apply(&self, settings: &mut AgoraSettings) {
        if let Some(host) = &self.host {
            settings.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        if let Some(path) = &self.db_path {
            settings.database.path = path.to_string_lossy().into_owned();
        }
        if self.log_json {
            settings.logging.json = true;
        }
    }
}

/// Relative database paths live under the Agora home directory.
fn resolve_db_path(configured: &str, home: &Path) -> PathBuf {
    let path = PathBuf::from(configured);
    if path.is_absolute() {
        path
    } else {
        home.join(path)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    let settings_file = args.settings.clone().unwrap_or_else(settings_path);
    let mut settings = load_settings_from_path(&settings_file)
        .with_context(|| format!("Failed to load settings from {}", settings_file.display()))?;
    args.apply(&mut settings);

    logging::init(&settings.logging);

    let db_path = resolve_db_path(&settings.database.path, &agora_home());
    let db = Database::open_with_busy_timeout(
        &db_path,
        Duration::from_millis(settings.database.busy_timeout_ms.into()),
    )
    .with_context(|| format!("Failed to open database at {}", db_path.display()))?;

    let metrics = match agora_server::metrics::install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!(error = %e, "metrics recorder unavailable, /metrics disabled");
            None
        }
    };

    let config = ServerConfig::from_settings(&settings.server);
    let shutdown_timeout = config.shutdown_timeout();
    let server = AgoraServer::new(config, db, metrics);

    let (addr, handle) = server.listen().await.context("Failed to bind server")?;
    info!("Agora listening on http://{addr}");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    info!("Shutting down...");
    server
        .shutdown()
        .graceful_shutdown(vec![handle], Some(shutdown_timeout))
        .await;

    info!("Shutdown complete");
    Ok(())
}

//! `/health` endpoint.

use serde::Serialize;
use std::time::Instant;

/// Health check response body.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// `"ok"` while the store answers, `"degraded"` otherwise.
    pub status: String,
    /// Seconds since the server started.
    pub uptime_secs: u64,
    /// Connected viewers across all rooms.
    pub viewers: usize,
    /// Rooms with at least one viewer.
    pub rooms: usize,
}

/// Build a health response from live counters.
pub fn health_check(
    start_time: Instant,
    store_ok: bool,
    viewers: usize,
    rooms: usize,
) -> HealthResponse {
    HealthResponse {
        status: if store_ok { "ok" } else { "degraded" }.into(),
        uptime_secs: start_time.elapsed().as_secs(),
        viewers,
        rooms,
    }
}

//! `GET /subscribe/{room_id}`: upgrade and run a viewer session.

use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::{IntoResponse, Response};
use metrics::counter;
use tracing::{info, warn};

use super::errors::ApiError;
use super::load_room;
use crate::metrics::WS_REJECTED_TOTAL;
use crate::server::AppState;
use crate::websocket::run_viewer_session;

/// The room is validated before the handshake so an unknown room never
/// upgrades.
pub async fn subscribe(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    upgrade: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Result<Response, ApiError> {
    let room_id = load_room(&state, &room_id)?;

    let upgrade = upgrade.map_err(|e| {
        warn!(%room_id, error = %e, "failed to upgrade connection");
        ApiError::UpgradeFailed
    })?;

    let viewers = state.registry.connection_count();
    if viewers >= state.config.max_viewers {
        counter!(WS_REJECTED_TOTAL).increment(1);
        warn!(%room_id, viewers, "viewer limit reached");
        return Err(ApiError::TooManyViewers);
    }

    info!(%room_id, "upgrading viewer connection");
    let registry = state.registry.clone();
    let cancel = state.shutdown.child_token();
    let session = state.config.session_config();
    Ok(upgrade
        .on_failed_upgrade(|e| warn!(error = %e, "websocket handshake failed"))
        .on_upgrade(move |ws| run_viewer_session(ws, room_id, registry, cancel, session))
        .into_response())
}

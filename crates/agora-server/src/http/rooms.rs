//! `/api/rooms`

use agora_store::RoomRow;
use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use serde::Deserialize;
use tracing::info;

use super::errors::{ApiError, decode_json};
use super::IdResponse;
use crate::server::AppState;

#[derive(Debug, Deserialize)]
struct CreateRoomBody {
    #[serde(default)]
    theme: String,
}

/// POST /api/rooms
pub async fn create_room(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<IdResponse>, ApiError> {
    let body: CreateRoomBody = decode_json(&body)?;
    let id = state.rooms.create(&body.theme)?;
    info!(room_id = %id, "room created");
    Ok(Json(IdResponse { id: id.to_string() }))
}

/// GET /api/rooms
pub async fn list_rooms(State(state): State<AppState>) -> Result<Json<Vec<RoomRow>>, ApiError> {
    Ok(Json(state.rooms.list()?))
}

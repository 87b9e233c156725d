//! `/api/rooms/{room_id}/messages`
//!
//! Every successful mutation hands an event to the bridge after the store
//! write and before the response is returned. The response never waits for
//! fan-out.

use agora_core::RoomEvent;
use agora_store::MessageRow;
use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use tracing::debug;

use super::errors::{ApiError, decode_json};
use super::{CountResponse, IdResponse, load_message, load_room};
use crate::server::AppState;

#[derive(Debug, Deserialize)]
struct CreateMessageBody {
    #[serde(default)]
    message: String,
}

/// GET /api/rooms/{room_id}/messages
pub async fn list_messages(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<Vec<MessageRow>>, ApiError> {
    let room_id = load_room(&state, &room_id)?;
    Ok(Json(state.messages.list_for_room(&room_id)?))
}

/// POST /api/rooms/{room_id}/messages
pub async fn create_message(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
    body: Bytes,
) -> Result<Json<IdResponse>, ApiError> {
    let room_id = load_room(&state, &room_id)?;
    let body: CreateMessageBody = decode_json(&body)?;
    let id = state.messages.create(&room_id, &body.message)?;
    debug!(%room_id, message_id = %id, "message created");

    let _ = state
        .events
        .emit(RoomEvent::message_created(room_id, id.clone(), body.message));
    Ok(Json(IdResponse { id: id.to_string() }))
}

/// GET /api/rooms/{room_id}/messages/{message_id}
pub async fn get_message(
    State(state): State<AppState>,
    Path((room_id, message_id)): Path<(String, String)>,
) -> Result<Json<MessageRow>, ApiError> {
    let room_id = load_room(&state, &room_id)?;
    Ok(Json(load_message(&state, &room_id, &message_id)?))
}

/// PATCH /api/rooms/{room_id}/messages/{message_id}/react
pub async fn react(
    State(state): State<AppState>,
    Path((room_id, message_id)): Path<(String, String)>,
) -> Result<Json<CountResponse>, ApiError> {
    let room_id = load_room(&state, &room_id)?;
    let message = load_message(&state, &room_id, &message_id)?;
    let count = state.messages.react(&message.id)?;

    let _ = state
        .events
        .emit(RoomEvent::reaction_increased(room_id, message.id, count));
    Ok(Json(CountResponse { count }))
}

/// DELETE /api/rooms/{room_id}/messages/{message_id}/react
pub async fn remove_reaction(
    State(state): State<AppState>,
    Path((room_id, message_id)): Path<(String, String)>,
) -> Result<Json<CountResponse>, ApiError> {
    let room_id = load_room(&state, &room_id)?;
    let message = load_message(&state, &room_id, &message_id)?;
    let count = state.messages.remove_reaction(&message.id)?;

    let _ = state
        .events
        .emit(RoomEvent::reaction_decreased(room_id, message.id, count));
    Ok(Json(CountResponse { count }))
}

/// PATCH /api/rooms/{room_id}/messages/{message_id}/answer
pub async fn mark_answered(
    State(state): State<AppState>,
    Path((room_id, message_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let room_id = load_room(&state, &room_id)?;
    let message = load_message(&state, &room_id, &message_id)?;
    state.messages.mark_answered(&message.id)?;

    let _ = state
        .events
        .emit(RoomEvent::message_answered(room_id, message.id));
    Ok(StatusCode::OK)
}

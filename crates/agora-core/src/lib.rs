//! # agora-core
//!
//! Shared vocabulary for the Agora message board crates:
//!
//! - **Ids**: `RoomId`, `MessageId`, `ConnectionId` as string newtypes
//! - **Events**: `RoomEvent` routed by room, serialized as `{"kind", "value"}`

#![deny(unsafe_code)]

pub mod events;
pub mod ids;

pub use events::{EventKind, EventPayload, RoomEvent};
pub use ids::{ConnectionId, MessageId, RoomId};

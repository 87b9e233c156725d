//! # agora-server
//!
//! HTTP API for rooms and messages plus live per-room fan-out over
//! WebSocket.
//!
//! - `GET /subscribe/{room_id}` upgrades to a receive-only viewer socket
//! - mutations under `/api/rooms` persist first, then publish a room event
//!   on a detached task
//! - each viewer has a bounded outbound queue; a viewer that cannot keep up
//!   is disconnected without affecting the rest of the room

#![deny(unsafe_code)]

pub mod config;
pub mod health;
pub mod http;
pub mod metrics;
pub mod server;
pub mod shutdown;
pub mod websocket;

pub use config::ServerConfig;
pub use server::{AgoraServer, AppState};
pub use shutdown::ShutdownCoordinator;

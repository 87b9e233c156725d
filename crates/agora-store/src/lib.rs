//! # agora-store
//!
//! `SQLite` persistence for rooms and messages.
//!
//! One connection behind a mutex, shared by cheap [`Database`] clones.
//! Repositories are synchronous; callers on the async side hold the lock only
//! for the duration of a single statement.

#![deny(unsafe_code)]

pub mod database;
pub mod error;
pub mod messages;
pub mod rooms;
pub mod schema;

pub use database::Database;
pub use error::StoreError;
pub use messages::{MessageRepo, MessageRow};
pub use rooms::{RoomRepo, RoomRow};

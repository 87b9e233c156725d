//! Viewer connection state.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use agora_core::{ConnectionId, RoomId};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

/// Lifecycle state of a viewer connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ViewerState {
    /// Handshake done, not yet registered.
    Connecting = 0,
    /// Registered and receiving room events.
    Active = 1,
    /// Cancelled, leaving the registry.
    Closing = 2,
    /// Terminal.
    Closed = 3,
}

impl ViewerState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Self::Connecting,
            1 => Self::Active,
            2 => Self::Closing,
            _ => Self::Closed,
        }
    }
}

/// One live viewer bound to one room.
///
/// Outbound frames go through a bounded queue drained by the socket writer.
/// Anything that wants the viewer gone cancels its token; only the lifecycle
/// loop removes it from the registry.
#[derive(Debug)]
pub struct ViewerConnection {
    /// Unique connection ID.
    pub id: ConnectionId,
    /// Room the viewer subscribed to.
    pub room_id: RoomId,
    tx: mpsc::Sender<Arc<String>>,
    cancel: CancellationToken,
    /// When this connection was established.
    pub connected_at: Instant,
    /// Whether any frame arrived since the last heartbeat check.
    pub is_alive: AtomicBool,
    last_pong: Mutex<Instant>,
    /// Count of messages dropped due to a full or closed queue.
    pub dropped_messages: AtomicU64,
    state: AtomicU8,
}

impl ViewerConnection {
    /// Create a connection in the `Connecting` state.
    pub fn new(
        id: ConnectionId,
        room_id: RoomId,
        tx: mpsc::Sender<Arc<String>>,
        cancel: CancellationToken,
    ) -> Self {
        let now = Instant::now();
        Self {
            id,
            room_id,
            tx,
            cancel,
            connected_at: now,
            is_alive: AtomicBool::new(true),
            last_pong: Mutex::new(now),
            dropped_messages: AtomicU64::new(0),
            state: AtomicU8::new(ViewerState::Connecting as u8),
        }
    }

    /// Enqueue a text frame without waiting.
    ///
    /// Returns `false` if the queue is full or closed, and increments
    /// the dropped message counter.
    pub fn send(&self, message: Arc<String>) -> bool {
        if self.tx.try_send(message).is_ok() {
            true
        } else {
            let _ = self.dropped_messages.fetch_add(1, Ordering::Relaxed);
            false
        }
    }

    /// Total messages dropped for this connection.
    pub fn drop_count(&self) -> u64 {
        self.dropped_messages.load(Ordering::Relaxed)
    }

    /// Ask the lifecycle loop to close this viewer. Idempotent.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the viewer has been asked to close.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolves once the viewer is cancelled.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.cancel.cancelled()
    }

    /// Mark the connection as alive (any inbound frame).
    pub fn mark_alive(&self) {
        self.is_alive.store(true, Ordering::Relaxed);
        *self.last_pong.lock() = Instant::now();
    }

    /// Duration since the last inbound frame (or connection establishment).
    pub fn last_pong_elapsed(&self) -> Duration {
        self.last_pong.lock().elapsed()
    }

    /// Check and reset the alive flag for heartbeat.
    ///
    /// Returns `true` if the connection was alive since the last check.
    pub fn check_alive(&self) -> bool {
        self.is_alive.swap(false, Ordering::Relaxed)
    }

    /// Connection age.
    pub fn age(&self) -> Duration {
        self.connected_at.elapsed()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ViewerState {
        ViewerState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub(crate) fn set_state(&self, state: ViewerState) {
        self.state.store(state as u8, Ordering::Release);
    }
}

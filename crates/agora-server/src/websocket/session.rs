//! Viewer session: one subscribed WebSocket from upgrade through close.

use std::sync::Arc;
use std::time::Duration;

use agora_core::{ConnectionId, RoomId};
use axum::body::Bytes;
use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use metrics::{counter, gauge, histogram};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use super::connection::{ViewerConnection, ViewerState};
use super::registry::RoomRegistry;
use crate::metrics::{
    WS_DISCONNECTIONS_TOTAL, WS_VIEWER_DURATION_SECONDS, WS_VIEWERS_ACTIVE, WS_VIEWERS_TOTAL,
};

/// How long the writer gets to flush a close frame before it is aborted.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

/// Per-viewer socket settings.
#[derive(Clone, Copy, Debug)]
pub struct SessionConfig {
    /// Bounded outbound queue size.
    pub outbound_queue_capacity: usize,
    /// Interval between server Ping frames.
    pub ping_interval: Duration,
    /// Idle time after which a silent viewer is dropped.
    pub pong_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            outbound_queue_capacity: 64,
            ping_interval: Duration::from_secs(30),
            pong_timeout: Duration::from_secs(60),
        }
    }
}

/// Register, wait for cancellation, deregister.
///
/// The viewer is visible to publishes exactly while this future is parked on
/// its cancellation token.
#[instrument(skip_all, fields(room_id = %connection.room_id, conn_id = %connection.id))]
pub async fn run_lifecycle(registry: Arc<RoomRegistry>, connection: Arc<ViewerConnection>) {
    registry.register(Arc::clone(&connection));
    connection.set_state(ViewerState::Active);

    connection.cancelled().await;

    connection.set_state(ViewerState::Closing);
    registry.deregister(&connection.room_id, &connection.id);
    connection.set_state(ViewerState::Closed);
}

/// Run a subscribed viewer until it disconnects or is cancelled.
///
/// 1. Spawns a writer that drains the outbound queue and sends periodic Pings
/// 2. Spawns a reader that watches for close frames and liveness
/// 3. Runs the lifecycle loop in place
/// 4. Stops both pumps and records metrics
pub async fn run_viewer_session(
    ws: WebSocket,
    room_id: RoomId,
    registry: Arc<RoomRegistry>,
    cancel: CancellationToken,
    config: SessionConfig,
) {
    let (mut ws_tx, mut ws_rx) = ws.split();
    let (send_tx, mut send_rx) = mpsc::channel::<Arc<String>>(config.outbound_queue_capacity);
    let connection = Arc::new(ViewerConnection::new(
        ConnectionId::new(),
        room_id,
        send_tx,
        cancel,
    ));

    info!(room_id = %connection.room_id, conn_id = %connection.id, "viewer connected");
    counter!(WS_VIEWERS_TOTAL).increment(1);
    gauge!(WS_VIEWERS_ACTIVE).increment(1.0);

    let outbound_conn = Arc::clone(&connection);
    let mut outbound = tokio::spawn(async move {
        let mut ping_interval = tokio::time::interval(config.ping_interval);
        let _ = ping_interval.tick().await;

        loop {
            tokio::select! {
                () = outbound_conn.cancelled() => break,
                msg = send_rx.recv() => {
                    let Some(text) = msg else { break };
                    if ws_tx.send(Message::Text(String::clone(&text).into())).await.is_err() {
                        debug!(conn_id = %outbound_conn.id, "socket write failed");
                        break;
                    }
                }
                _ = ping_interval.tick() => {
                    if !outbound_conn.check_alive()
                        && outbound_conn.last_pong_elapsed() > config.pong_timeout
                    {
                        warn!(
                            conn_id = %outbound_conn.id,
                            "viewer unresponsive for {:?}, disconnecting",
                            config.pong_timeout
                        );
                        break;
                    }
                    if ws_tx.send(Message::Ping(Bytes::new())).await.is_err() {
                        break;
                    }
                }
            }
        }
        outbound_conn.cancel();
        let _ = ws_tx.send(Message::Close(None)).await;
    });

    let inbound_conn = Arc::clone(&connection);
    let inbound = tokio::spawn(async move {
        loop {
            tokio::select! {
                () = inbound_conn.cancelled() => break,
                frame = ws_rx.next() => match frame {
                    Some(Ok(Message::Close(_))) => {
                        debug!(conn_id = %inbound_conn.id, "viewer sent close frame");
                        break;
                    }
                    // Viewers are receive-only; any frame still proves liveness.
                    Some(Ok(_)) => inbound_conn.mark_alive(),
                    Some(Err(e)) => {
                        debug!(conn_id = %inbound_conn.id, error = %e, "socket read failed");
                        break;
                    }
                    None => break,
                },
            }
        }
        inbound_conn.cancel();
    });

    run_lifecycle(Arc::clone(&registry), Arc::clone(&connection)).await;

    inbound.abort();
    if tokio::time::timeout(CLOSE_TIMEOUT, &mut outbound).await.is_err() {
        outbound.abort();
    }

    info!(
        room_id = %connection.room_id,
        conn_id = %connection.id,
        dropped = connection.drop_count(),
        "viewer disconnected"
    );
    counter!(WS_DISCONNECTIONS_TOTAL).increment(1);
    gauge!(WS_VIEWERS_ACTIVE).decrement(1.0);
    histogram!(WS_VIEWER_DURATION_SECONDS).record(connection.age().as_secs_f64());
}

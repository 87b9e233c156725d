//! `AgoraServer`: Axum HTTP + WebSocket server.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use agora_store::{Database, MessageRepo, RoomRepo};
use axum::extract::State;
use axum::http::{HeaderName, HeaderValue, Method, StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, patch};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::health::{self, HealthResponse};
use crate::http::{messages, rooms, subscribe};
use crate::shutdown::ShutdownCoordinator;
use crate::websocket::{Broadcaster, EventBridge, RoomRegistry};

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Room persistence.
    pub rooms: RoomRepo,
    /// Message persistence.
    pub messages: MessageRepo,
    /// Underlying database, for health probes.
    pub db: Database,
    /// Live viewers by room.
    pub registry: Arc<RoomRegistry>,
    /// Detached publisher for mutation events.
    pub events: EventBridge,
    /// Shutdown coordinator.
    pub shutdown: Arc<ShutdownCoordinator>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// When the server started.
    pub start_time: Instant,
    /// Prometheus handle, when a recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

/// The main Agora server.
pub struct AgoraServer {
    config: Arc<ServerConfig>,
    db: Database,
    registry: Arc<RoomRegistry>,
    broadcaster: Arc<Broadcaster>,
    shutdown: Arc<ShutdownCoordinator>,
    start_time: Instant,
    metrics: Option<PrometheusHandle>,
}

impl AgoraServer {
    /// Create a new server over an open database.
    pub fn new(config: ServerConfig, db: Database, metrics: Option<PrometheusHandle>) -> Self {
        let registry = Arc::new(RoomRegistry::new());
        Self {
            config: Arc::new(config),
            db,
            broadcaster: Arc::new(Broadcaster::new(Arc::clone(&registry))),
            registry,
            shutdown: Arc::new(ShutdownCoordinator::new()),
            start_time: Instant::now(),
            metrics,
        }
    }

    /// Build the Axum router with all routes and middleware.
    pub fn router(&self) -> Router {
        let state = AppState {
            rooms: RoomRepo::new(self.db.clone()),
            messages: MessageRepo::new(self.db.clone()),
            db: self.db.clone(),
            registry: Arc::clone(&self.registry),
            events: EventBridge::new(Arc::clone(&self.broadcaster)),
            shutdown: Arc::clone(&self.shutdown),
            config: Arc::clone(&self.config),
            start_time: self.start_time,
            metrics: self.metrics.clone(),
        };

        let api = Router::new()
            .route("/rooms", get(rooms::list_rooms).post(rooms::create_room))
            .route(
                "/rooms/{room_id}/messages",
                get(messages::list_messages).post(messages::create_message),
            )
            .route(
                "/rooms/{room_id}/messages/{message_id}",
                get(messages::get_message),
            )
            .route(
                "/rooms/{room_id}/messages/{message_id}/react",
                patch(messages::react).delete(messages::remove_reaction),
            )
            .route(
                "/rooms/{room_id}/messages/{message_id}/answer",
                patch(messages::mark_answered),
            );

        let x_request_id = HeaderName::from_static("x-request-id");

        Router::new()
            .route("/health", get(health_handler))
            .route("/metrics", get(metrics_handler))
            .route("/subscribe/{room_id}", get(subscribe::subscribe))
            .nest("/api", api)
            .with_state(state)
            .layer(cors_layer())
            .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::new(x_request_id, MakeRequestUuid))
            .layer(CatchPanicLayer::new())
    }

    /// Bind and serve until shutdown. Returns the bound address and the
    /// serve task.
    pub async fn listen(&self) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
        let listener = TcpListener::bind(self.config.bind_addr()).await?;
        let addr = listener.local_addr()?;
        let app = self.router();
        let token = self.shutdown.token();

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app)
                .with_graceful_shutdown(token.cancelled_owned())
                .await
            {
                error!(error = %e, "server error");
            }
        });

        info!(%addr, "agora server listening");
        Ok((addr, handle))
    }

    /// Live viewer registry.
    pub fn registry(&self) -> &Arc<RoomRegistry> {
        &self.registry
    }

    /// Event broadcaster.
    pub fn broadcaster(&self) -> &Arc<Broadcaster> {
        &self.broadcaster
    }

    /// Get the shutdown coordinator.
    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.shutdown
    }

    /// Get the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Any http(s) origin, the methods and headers browser clients use.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(|origin: &HeaderValue, _| {
            origin
                .to_str()
                .is_ok_and(|o| o.starts_with("http://") || o.starts_with("https://"))
        }))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ACCEPT,
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-csrf-token"),
        ])
        .expose_headers([header::LINK])
        .max_age(Duration::from_secs(300))
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let store_ok = state.db.ping().is_ok();
    Json(health::health_check(
        state.start_time,
        store_ok,
        state.registry.connection_count(),
        state.registry.room_count(),
    ))
}

/// GET /metrics
async fn metrics_handler(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => crate::metrics::render(handle).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

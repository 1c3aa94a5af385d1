//! `LobbyServer` — Axum HTTP + WebSocket server.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::http::{HeaderMap, StatusCode, header::ORIGIN};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use metrics::counter;
use metrics_exporter_prometheus::PrometheusHandle;
use sling_lobby::{ConnectionId, SlotAllocator};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::health::{self, HealthResponse};
use crate::home;
use crate::metrics::{self as metric, WS_UPGRADES_REJECTED_TOTAL};
use crate::shutdown::ShutdownCoordinator;
use crate::websocket::session;

/// Shared state accessible from Axum handlers.
#[derive(Clone)]
pub struct AppState {
    /// Slot allocator shared by all sessions.
    pub allocator: Arc<SlotAllocator>,
    /// Shutdown coordinator (cancellation token + session tracker).
    pub shutdown: Arc<ShutdownCoordinator>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// When the server started.
    pub start_time: Instant,
    /// Prometheus handle for `/metrics`, when a recorder was installed.
    pub metrics: Option<PrometheusHandle>,
}

/// The lobby server.
pub struct LobbyServer {
    config: Arc<ServerConfig>,
    allocator: Arc<SlotAllocator>,
    shutdown: Arc<ShutdownCoordinator>,
    start_time: Instant,
    metrics: Option<PrometheusHandle>,
}

impl LobbyServer {
    /// Create a new server.
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config: Arc::new(config),
            allocator: Arc::new(SlotAllocator::new()),
            shutdown: Arc::new(ShutdownCoordinator::new()),
            start_time: Instant::now(),
            metrics: None,
        }
    }

    /// Attach an installed Prometheus recorder handle, enabling `/metrics`.
    #[must_use]
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Build the Axum router with all routes.
    pub fn router(&self) -> Router {
        let state = AppState {
            allocator: Arc::clone(&self.allocator),
            shutdown: Arc::clone(&self.shutdown),
            config: Arc::clone(&self.config),
            start_time: self.start_time,
            metrics: self.metrics.clone(),
        };

        Router::new()
            .route("/", get(home::home_page))
            .route("/ws", get(ws_handler))
            .route("/health", get(health_handler))
            .route("/metrics", get(metrics_handler))
            .with_state(state)
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
    }

    /// Bind and start serving. Returns the bound address and the serve
    /// task's join handle; the task exits after a graceful shutdown.
    pub async fn listen(&self) -> io::Result<(SocketAddr, tokio::task::JoinHandle<()>)> {
        let router = self.router();
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        let local_addr = listener.local_addr()?;
        info!(addr = %local_addr, "lobby server listening");

        let token = self.shutdown.token();
        let handle = tokio::spawn(async move {
            let serve = axum::serve(listener, router)
                .with_graceful_shutdown(async move { token.cancelled().await });
            if let Err(e) = serve.await {
                error!(error = %e, "server error");
            }
        });
        Ok((local_addr, handle))
    }

    /// Get the slot allocator.
    pub fn allocator(&self) -> &Arc<SlotAllocator> {
        &self.allocator
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

/// GET /ws — WebSocket upgrade with origin and capacity checks.
///
/// Rejections happen before any slot is assigned, so there is nothing to
/// clean up on these paths.
async fn ws_handler(
    ws: WebSocketUpgrade,
    headers: HeaderMap,
    State(state): State<AppState>,
) -> Response {
    let origin = headers.get(ORIGIN).and_then(|v| v.to_str().ok());
    if !state.config.origin_allowed(origin) {
        warn!(
            origin = origin.unwrap_or("<none>"),
            "rejected upgrade: origin not allowed"
        );
        counter!(WS_UPGRADES_REJECTED_TOTAL, "reason" => "origin").increment(1);
        return StatusCode::FORBIDDEN.into_response();
    }

    // Fast path only: handshakes race, so the authoritative capacity
    // check is the atomic try_assign in the session. This one exists to
    // refuse obviously-full lobbies with a clean 503 instead of a
    // post-upgrade close.
    if state.allocator.player_count() >= state.config.max_players {
        warn!(
            max_players = state.config.max_players,
            "rejected upgrade: lobby full"
        );
        counter!(WS_UPGRADES_REJECTED_TOTAL, "reason" => "capacity").increment(1);
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }

    let allocator = Arc::clone(&state.allocator);
    let shutdown = Arc::clone(&state.shutdown);
    let max_players = state.config.max_players;
    ws.max_message_size(state.config.max_message_size)
        .on_upgrade(move |socket| async move {
            let conn_id = ConnectionId::new();
            info!(connection_id = %conn_id, "websocket client connected");
            let token = shutdown.token();
            shutdown.spawn(session::run_session(
                socket, conn_id, allocator, max_players, token,
            ));
        })
        .into_response()
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let players = state.allocator.player_count();
    Json(health::health_check(state.start_time, players))
}

/// GET /metrics — Prometheus text, 404 when no recorder is installed.
async fn metrics_handler(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => metric::render(handle).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

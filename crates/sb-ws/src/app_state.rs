use crate::{
    ConnectionConfig, Metrics, ObserverId, ShutdownCoordinator, StatsBroadcaster,
    WebSocketConnection,
};

use axum::{
    extract::{
        State,
        ws::{WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::Response,
};
use log::{debug, error, warn};

/// Shared application state for WebSocket handlers
#[derive(Clone)]
pub struct AppState {
    pub broadcaster: StatsBroadcaster,
    pub metrics: Metrics,
    pub shutdown: ShutdownCoordinator,
    pub config: ConnectionConfig,
}

/// WebSocket upgrade handler
pub async fn handler(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> Result<Response, StatusCode> {
    let active = state.broadcaster.observer_count().await;
    if active >= state.config.max_connections {
        warn!(
            "Connection limit reached: {active}/{}",
            state.config.max_connections
        );
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }

    let observer_id = ObserverId::new();
    debug!("WebSocket upgrade request, observer {observer_id}");

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, observer_id, state)))
}

/// Handle WebSocket connection after upgrade
async fn handle_socket(socket: WebSocket, observer_id: ObserverId, state: AppState) {
    let shutdown_guard = state.shutdown.subscribe_guard();

    let connection = WebSocketConnection::new(
        observer_id,
        state.config.clone(),
        state.metrics.clone(),
        state.broadcaster.clone(),
    );

    if let Err(e) = connection.handle(socket, shutdown_guard).await {
        error!("Connection {observer_id} error: {e}");
    }
}

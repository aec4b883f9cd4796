use crate::{ServerState, admin, health};

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};

/// Build the application router with all endpoints.
///
/// The realtime endpoint path is deployment configuration
/// (`websocket.endpoint_path`), everything else is fixed.
pub fn build_router(state: ServerState, endpoint_path: &str) -> Router {
    Router::new()
        // Realtime stats endpoint
        .route(endpoint_path, get(sb_ws::handler))
        // Health check endpoints
        .route("/health", get(health::health_check))
        .route("/live", get(health::liveness_check))
        .route("/ready", get(health::readiness_check))
        // Admin endpoints
        .route("/admin/publish", post(admin::publish_handler))
        .route("/admin/shutdown", post(admin::shutdown_handler))
        // Add shared state
        .with_state(state)
        // CORS middleware (allow all origins for WebSocket)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

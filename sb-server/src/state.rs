use axum::extract::FromRef;
use sb_broker::MemoryBroker;
use sb_ws::AppState;

/// Top-level router state: WebSocket state plus the producer-side broker
/// handle used by the admin ingest endpoint.
#[derive(Clone)]
pub struct ServerState {
    pub app: AppState,
    pub broker: MemoryBroker,
    /// Topic admin publishes land on; None until the broker is configured
    pub topic: Option<String>,
}

impl FromRef<ServerState> for AppState {
    fn from_ref(state: &ServerState) -> AppState {
        state.app.clone()
    }
}

//! Administrative endpoints for server management.

use crate::ServerState;

use axum::{Json, extract::State, http::StatusCode};
use log::{error, info, warn};
use sb_broker::BrokerError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    /// Partitioning key, typically the client address
    pub key: Option<String>,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct PublishResponse {
    pub status: String,
    pub partition: usize,
}

/// Produce one record onto the stats topic.
///
/// The ingest path for the in-process broker: keyed records go through the
/// partition strategy, so a malformed key is the caller's error.
pub async fn publish_handler(
    State(state): State<ServerState>,
    Json(request): Json<PublishRequest>,
) -> Result<Json<PublishResponse>, (StatusCode, String)> {
    let Some(topic) = state.topic.as_deref() else {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            String::from("broker.topic is not configured"),
        ));
    };

    match state
        .broker
        .publish(topic, request.key.as_deref(), request.value)
    {
        Ok(partition) => Ok(Json(PublishResponse {
            status: String::from("ok"),
            partition,
        })),
        Err(e @ BrokerError::InvalidPartitionKey { .. }) => {
            warn!("Rejected publish with invalid key: {e}");
            Err((StatusCode::BAD_REQUEST, e.to_string()))
        }
        Err(e) => {
            error!("Publish failed: {e}");
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

/// Graceful shutdown endpoint.
pub async fn shutdown_handler(State(state): State<ServerState>) -> StatusCode {
    info!("Graceful shutdown requested via HTTP");
    state.app.shutdown.shutdown();

    StatusCode::ACCEPTED
}

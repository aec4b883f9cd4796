pub mod app_state;
pub mod connection_config;
pub mod connection_observer;
pub mod error;
pub mod lifecycle;
pub mod metrics;
pub mod observer;
pub mod retry;
pub mod shutdown_coordinator;
pub mod shutdown_guard;
pub mod stats_broadcaster;
pub mod web_socket_connection;

mod consumer_task;

pub use app_state::{AppState, handler};
pub use connection_config::ConnectionConfig;
pub use connection_observer::ConnectionObserver;
pub use error::{Result, WsError};
pub use lifecycle::Lifecycle;
pub use metrics::Metrics;
pub use observer::{ObserverId, StatsObserver};
pub use retry::{IsRetryable, RetryConfig, with_retry};
pub use shutdown_coordinator::ShutdownCoordinator;
pub use shutdown_guard::ShutdownGuard;
pub use stats_broadcaster::StatsBroadcaster;
pub use web_socket_connection::WebSocketConnection;

#[cfg(test)]
mod tests;

use tracing::info_span;

/// Create a tracing span for one message fan-out.
/// All log entries within the delivery pass include these fields.
pub fn create_delivery_span(topic: &str, observer_count: usize) -> tracing::Span {
    info_span!(
        "stats_delivery",
        topic = %topic,
        observer_count = %observer_count,
    )
}

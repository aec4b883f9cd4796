/// Configuration for WebSocket connections
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Outgoing buffer size (bounded to handle backpressure)
    pub send_buffer_size: usize,
    /// Maximum concurrent connections
    pub max_connections: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            send_buffer_size: sb_config::DEFAULT_SEND_BUFFER_SIZE,
            max_connections: sb_config::DEFAULT_MAX_CONNECTIONS,
        }
    }
}

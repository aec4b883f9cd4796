use crate::{Result, StatsObserver, WsError};

use axum::extract::ws::Message;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Observer adapter for one WebSocket client.
///
/// Forwards each consumed payload into the connection's bounded outgoing
/// channel without blocking the fan-out. A slow client fills its own buffer
/// and drops its own messages; it cannot throttle other observers.
pub struct ConnectionObserver {
    sender: mpsc::Sender<Message>,
}

impl ConnectionObserver {
    pub fn new(sender: mpsc::Sender<Message>) -> Self {
        Self { sender }
    }
}

impl StatsObserver for ConnectionObserver {
    fn on_stats_message(&self, payload: &str) -> Result<()> {
        self.sender
            .try_send(Message::Text(payload.to_string().into()))
            .map_err(|e| match e {
                TrySendError::Full(_) => WsError::send_buffer_full(),
                TrySendError::Closed(_) => WsError::connection_closed("send channel closed"),
            })
    }
}

use crate::{
    ConnectionConfig, ConnectionObserver, Metrics, ObserverId, Result as WsErrorResult,
    ShutdownGuard, StatsBroadcaster, WsError,
};

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;

/// Manages a single WebSocket connection
pub struct WebSocketConnection {
    observer_id: ObserverId,
    config: ConnectionConfig,
    metrics: Metrics,
    broadcaster: StatsBroadcaster,
}

impl WebSocketConnection {
    pub fn new(
        observer_id: ObserverId,
        config: ConnectionConfig,
        metrics: Metrics,
        broadcaster: StatsBroadcaster,
    ) -> Self {
        Self {
            observer_id,
            config,
            metrics,
            broadcaster,
        }
    }

    /// Handle the WebSocket connection lifecycle.
    ///
    /// The connection is registered as a stats observer while open: opening
    /// it may start the broker consumer, closing it may stop it.
    pub async fn handle(
        self,
        socket: WebSocket,
        mut shutdown_guard: ShutdownGuard,
    ) -> WsErrorResult<()> {
        log::info!("WebSocket connection {} established", self.observer_id);
        self.metrics.connection_established();

        // Split socket into sender and receiver
        let (mut ws_sender, mut ws_receiver) = socket.split();

        // Bounded channel for outgoing messages (backpressure handling)
        let (tx, mut rx) = mpsc::channel::<Message>(self.config.send_buffer_size);

        // Register before the first poll can fan out, so no message consumed
        // after this point misses us
        let observer = Arc::new(ConnectionObserver::new(tx.clone()));
        self.broadcaster.register(self.observer_id, observer).await;

        // Spawn send task
        let send_task = tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                if ws_sender.send(msg).await.is_err() {
                    break;
                }
            }
        });

        let result = loop {
            tokio::select! {
                // Handle incoming frames from the client
                msg = ws_receiver.next() => {
                    match msg {
                        Some(Ok(Message::Ping(data))) => {
                            if tx.send(Message::Pong(data)).await.is_err() {
                                break Err(WsError::send_buffer_full());
                            }
                        }
                        Some(Ok(Message::Close(_))) => {
                            log::info!(
                                "Received close frame from connection {}",
                                self.observer_id
                            );
                            break Ok(());
                        }
                        Some(Ok(Message::Text(text))) => {
                            // The stats stream is push-only
                            log::debug!(
                                "Ignoring text frame from connection {}: {}",
                                self.observer_id,
                                text
                            );
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            log::error!(
                                "WebSocket error on connection {}: {}",
                                self.observer_id,
                                e
                            );
                            break Err(WsError::connection_closed(format!(
                                "WebSocket error: {}",
                                e
                            )));
                        }
                        None => {
                            log::info!("Connection {} closed by client", self.observer_id);
                            break Ok(());
                        }
                    }
                }

                // Handle graceful shutdown
                _ = shutdown_guard.wait() => {
                    log::info!("Shutting down connection {} gracefully", self.observer_id);
                    break Ok(());
                }
            }
        };

        // Cleanup; deregistering the last observer stops the consumer
        self.broadcaster.deregister(self.observer_id).await;
        drop(tx); // Close channel to terminate send task
        let _ = send_task.await;

        self.metrics
            .connection_closed(if result.is_ok() { "normal" } else { "error" });

        log::info!("WebSocket connection {} closed", self.observer_id);

        result
    }
}

#![allow(dead_code)]

use axum_test::{TestServer, TestWebSocket};

use tokio::time::Duration;

/// WebSocket test client wrapper
pub struct WsTestClient {
    ws: TestWebSocket,
}

impl WsTestClient {
    /// Connect to the stats WebSocket endpoint
    pub async fn connect(server: &TestServer) -> Self {
        let ws = server.get_websocket("/ws").await.into_websocket().await;

        Self { ws }
    }

    /// Receive the next text frame, panicking if none arrives in time
    pub async fn receive_text(&mut self) -> String {
        tokio::time::timeout(Duration::from_secs(2), self.ws.receive_text())
            .await
            .expect("timed out waiting for a text frame")
    }

    /// Close the WebSocket connection
    pub async fn close(self) {
        self.ws.close().await;
    }
}

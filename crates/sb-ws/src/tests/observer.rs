use crate::{ConnectionObserver, ObserverId, StatsObserver, WsError};

use axum::extract::ws::Message;
use tokio::sync::mpsc;

#[test]
fn given_two_observer_ids_when_created_then_distinct() {
    assert_ne!(ObserverId::new(), ObserverId::new());
}

#[test]
fn given_observer_id_when_displayed_then_uuid_format() {
    let id = ObserverId::new();

    let rendered = id.to_string();
    assert_eq!(rendered.len(), 36);
    assert_eq!(rendered.matches('-').count(), 4);
}

#[tokio::test]
async fn given_connection_observer_when_message_delivered_then_text_frame_queued() {
    let (tx, mut rx) = mpsc::channel::<Message>(4);
    let observer = ConnectionObserver::new(tx);

    observer.on_stats_message("stats-payload").unwrap();

    match rx.recv().await {
        Some(Message::Text(text)) => assert_eq!(text.as_str(), "stats-payload"),
        other => panic!("expected text frame, got {other:?}"),
    }
}

#[tokio::test]
async fn given_full_send_buffer_when_message_delivered_then_buffer_error() {
    let (tx, _rx) = mpsc::channel::<Message>(1);
    let observer = ConnectionObserver::new(tx);

    observer.on_stats_message("first").unwrap();
    let result = observer.on_stats_message("second");

    assert!(matches!(
        result.unwrap_err(),
        WsError::SendBufferFull { .. }
    ));
}

#[tokio::test]
async fn given_closed_channel_when_message_delivered_then_connection_closed_error() {
    let (tx, rx) = mpsc::channel::<Message>(1);
    drop(rx);
    let observer = ConnectionObserver::new(tx);

    let result = observer.on_stats_message("orphan");

    assert!(matches!(
        result.unwrap_err(),
        WsError::ConnectionClosed { .. }
    ));
}

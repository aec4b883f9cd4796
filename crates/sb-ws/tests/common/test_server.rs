#![allow(dead_code)]

use sb_broker::MemoryBroker;
use sb_config::BrokerConfig;
use sb_ws::{
    AppState, ConnectionConfig, Metrics, RetryConfig, ShutdownCoordinator, StatsBroadcaster,
};

use std::sync::Arc;

use axum::{Router, routing::get};
use axum_test::TestServer;

/// Topic the test broker carries
pub const TEST_TOPIC: &str = "weblog-stats";

/// Poll bound used by all integration tests (short, so stop transitions
/// settle quickly)
pub const TEST_POLL_INTERVAL_MS: u64 = 20;

/// Test server with access to AppState and the backing broker
pub struct TestServerWithState {
    pub server: TestServer,
    pub app_state: AppState,
    pub broker: MemoryBroker,
}

/// Create a TestServer over an in-process broker
pub fn create_test_server() -> TestServerWithState {
    let broker = MemoryBroker::new(4);

    let broker_config = BrokerConfig {
        bootstrap_servers: Some(String::from("in-process")),
        topic: Some(String::from(TEST_TOPIC)),
        poll_interval_ms: TEST_POLL_INTERVAL_MS,
        ..Default::default()
    };

    let broadcaster = StatsBroadcaster::new(
        Arc::new(broker.consumer_factory()),
        broker_config,
        RetryConfig::default(),
        Metrics::new(),
    );

    let app_state = AppState {
        broadcaster,
        metrics: Metrics::new(),
        shutdown: ShutdownCoordinator::new(),
        config: ConnectionConfig::default(),
    };

    let app = Router::new()
        .route("/ws", get(sb_ws::handler))
        .with_state(app_state.clone());

    let server = TestServer::builder()
        .http_transport()
        .build(app)
        .expect("Failed to create test server");

    TestServerWithState {
        server,
        app_state,
        broker,
    }
}

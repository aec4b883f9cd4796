mod observer;

use crate::{Metrics, Result as WsErrorResult, RetryConfig, StatsBroadcaster, StatsObserver, WsError};

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use sb_broker::{
    BrokerError, BrokerSettings, ConsumerFactory, ConsumerRecord, MemoryBroker, StatsConsumer,
};
use sb_config::BrokerConfig;

pub(crate) const TEST_TOPIC: &str = "weblog-stats";

/// Broker config with a short poll bound so lifecycle tests settle quickly
pub(crate) fn test_broker_config() -> BrokerConfig {
    BrokerConfig {
        bootstrap_servers: Some(String::from("in-process")),
        topic: Some(String::from(TEST_TOPIC)),
        poll_interval_ms: 20,
        ..Default::default()
    }
}

/// Single-attempt retry policy: one failed create per start attempt
pub(crate) fn fast_retry() -> RetryConfig {
    RetryConfig {
        max_attempts: 1,
        initial_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(50),
        backoff_multiplier: 2.0,
        jitter: false,
    }
}

pub(crate) fn broadcaster_over(broker: &MemoryBroker) -> (StatsBroadcaster, Arc<AtomicUsize>) {
    let factory = CountingFactory::new(broker);
    let creates = factory.creates();
    let broadcaster = StatsBroadcaster::new(
        Arc::new(factory),
        test_broker_config(),
        fast_retry(),
        Metrics::new(),
    );
    (broadcaster, creates)
}

/// Poll `cond` until it holds or `timeout` elapses
pub(crate) async fn wait_until<F, Fut>(mut cond: F, timeout: Duration) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if cond().await {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Observer that records every delivered payload
pub(crate) struct RecordingObserver {
    messages: Mutex<Vec<String>>,
}

impl RecordingObserver {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            messages: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl StatsObserver for RecordingObserver {
    fn on_stats_message(&self, payload: &str) -> WsErrorResult<()> {
        self.messages.lock().unwrap().push(payload.to_string());
        Ok(())
    }
}

/// Observer whose delivery always fails
pub(crate) struct FailingObserver;

impl StatsObserver for FailingObserver {
    fn on_stats_message(&self, _payload: &str) -> WsErrorResult<()> {
        Err(WsError::internal("observer rejected payload"))
    }
}

/// Memory-backed factory that counts create() calls
pub(crate) struct CountingFactory {
    inner: sb_broker::MemoryConsumerFactory,
    creates: Arc<AtomicUsize>,
}

impl CountingFactory {
    pub(crate) fn new(broker: &MemoryBroker) -> Self {
        Self {
            inner: broker.consumer_factory(),
            creates: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn creates(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.creates)
    }
}

#[async_trait]
impl ConsumerFactory for CountingFactory {
    async fn create(
        &self,
        settings: &BrokerSettings,
    ) -> sb_broker::Result<Box<dyn StatsConsumer>> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.inner.create(settings).await
    }
}

/// Factory whose create() always fails with a connection error
pub(crate) struct FailingFactory {
    attempts: Arc<AtomicUsize>,
}

impl FailingFactory {
    pub(crate) fn new() -> Self {
        Self {
            attempts: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn attempts(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.attempts)
    }
}

#[async_trait]
impl ConsumerFactory for FailingFactory {
    async fn create(
        &self,
        _settings: &BrokerSettings,
    ) -> sb_broker::Result<Box<dyn StatsConsumer>> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(BrokerError::connection("broker unreachable"))
    }
}

/// Factory producing consumers that fail on their first poll
pub(crate) struct PoisonedPollFactory {
    creates: Arc<AtomicUsize>,
}

impl PoisonedPollFactory {
    pub(crate) fn new() -> Self {
        Self {
            creates: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn creates(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.creates)
    }
}

#[async_trait]
impl ConsumerFactory for PoisonedPollFactory {
    async fn create(
        &self,
        _settings: &BrokerSettings,
    ) -> sb_broker::Result<Box<dyn StatsConsumer>> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(PoisonedPollConsumer))
    }
}

struct PoisonedPollConsumer;

#[async_trait]
impl StatsConsumer for PoisonedPollConsumer {
    async fn subscribe(&mut self, _topic: &str) -> sb_broker::Result<()> {
        Ok(())
    }

    async fn poll(&mut self, _timeout: Duration) -> sb_broker::Result<Vec<ConsumerRecord>> {
        Err(BrokerError::poll("record batch corrupted"))
    }

    async fn close(&mut self) -> sb_broker::Result<()> {
        Ok(())
    }
}

use crate::{BrokerError, ConsumerRecord, Result};

use std::time::Duration;

use async_trait::async_trait;
use sb_config::BrokerConfig;

/// Resolved broker settings for one consumer instance.
///
/// Unlike [`sb_config::BrokerConfig`], every required field is present here;
/// [`BrokerSettings::from_config`] is the single place where "broker not
/// configured" surfaces, at consumer-start time.
#[derive(Debug, Clone)]
pub struct BrokerSettings {
    pub bootstrap_servers: String,
    pub topic: String,
    pub group_id: String,
    pub key_deserializer: String,
    pub value_deserializer: String,
    pub auto_commit_interval: Duration,
}

impl BrokerSettings {
    pub fn from_config(config: &BrokerConfig) -> Result<Self> {
        let bootstrap_servers = config
            .bootstrap_servers
            .clone()
            .ok_or_else(|| BrokerError::configuration("broker.bootstrap_servers is not set"))?;

        let topic = config
            .topic
            .clone()
            .ok_or_else(|| BrokerError::configuration("broker.topic is not set"))?;

        Ok(Self {
            bootstrap_servers,
            topic,
            group_id: config.group_id.clone(),
            key_deserializer: config.key_deserializer.clone(),
            value_deserializer: config.value_deserializer.clone(),
            auto_commit_interval: Duration::from_millis(config.auto_commit_interval_ms),
        })
    }
}

/// Consumer side of the broker client boundary.
///
/// Implementations own their connection; dropping or closing a consumer
/// releases it. `poll` must return within roughly `timeout` even when no
/// records arrive, since the caller checks its stop signal between polls.
#[async_trait]
pub trait StatsConsumer: Send {
    /// Join the consumer group for `topic`.
    async fn subscribe(&mut self, topic: &str) -> Result<()>;

    /// Fetch the next batch of records, waiting at most `timeout`.
    /// An empty batch is not an error.
    async fn poll(&mut self, timeout: Duration) -> Result<Vec<ConsumerRecord>>;

    /// Release the underlying handle. Further calls fail.
    async fn close(&mut self) -> Result<()>;
}

/// Constructs broker consumers.
///
/// The factory is the injection seam for the broker client: the production
/// binary hands the broadcaster a [`crate::MemoryConsumerFactory`], tests
/// hand it scripted or failing factories, and an external broker client
/// plugs in the same way.
#[async_trait]
pub trait ConsumerFactory: Send + Sync {
    async fn create(&self, settings: &BrokerSettings) -> Result<Box<dyn StatsConsumer>>;
}

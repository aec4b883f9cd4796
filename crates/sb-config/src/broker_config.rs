use crate::{ConfigError, ConfigErrorResult};

use serde::Deserialize;

pub const DEFAULT_GROUP_ID: &str = "statsboard";
pub const DEFAULT_DESERIALIZER: &str = "string";

// Poll interval constraints (milliseconds). The poll bound doubles as the
// stop-flag check interval, so it also bounds shutdown latency.
pub const MIN_POLL_INTERVAL_MS: u64 = 10;
pub const MAX_POLL_INTERVAL_MS: u64 = 5_000;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 300;

pub const MIN_AUTO_COMMIT_INTERVAL_MS: u64 = 100;
pub const MAX_AUTO_COMMIT_INTERVAL_MS: u64 = 60_000;
pub const DEFAULT_AUTO_COMMIT_INTERVAL_MS: u64 = 1_000;

pub const MIN_PARTITIONS: usize = 1;
pub const MAX_PARTITIONS: usize = 64;
pub const DEFAULT_PARTITIONS: usize = 4;

/// Broker connection and consumer settings.
///
/// `bootstrap_servers` and `topic` have no sensible defaults and stay
/// optional here; their presence is checked at consumer-start time, not at
/// config load time, so the server can boot without a broker configured.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    /// Broker address list (host:port[,host:port...])
    pub bootstrap_servers: Option<String>,
    /// Topic carrying the log-stats stream
    pub topic: Option<String>,
    /// Consumer group identifier
    pub group_id: String,
    /// Key deserializer type name
    pub key_deserializer: String,
    /// Value deserializer type name
    pub value_deserializer: String,
    /// Maximum wait per consumer poll in milliseconds
    pub poll_interval_ms: u64,
    /// Offset auto-commit interval in milliseconds
    pub auto_commit_interval_ms: u64,
    /// Partition count for the in-process broker backend
    pub partitions: usize,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            bootstrap_servers: None,
            topic: None,
            group_id: String::from(DEFAULT_GROUP_ID),
            key_deserializer: String::from(DEFAULT_DESERIALIZER),
            value_deserializer: String::from(DEFAULT_DESERIALIZER),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            auto_commit_interval_ms: DEFAULT_AUTO_COMMIT_INTERVAL_MS,
            partitions: DEFAULT_PARTITIONS,
        }
    }
}

impl BrokerConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.group_id.is_empty() {
            return Err(ConfigError::broker("broker.group_id must not be empty"));
        }

        if self.poll_interval_ms < MIN_POLL_INTERVAL_MS
            || self.poll_interval_ms > MAX_POLL_INTERVAL_MS
        {
            return Err(ConfigError::broker(format!(
                "broker.poll_interval_ms must be {}-{}, got {}",
                MIN_POLL_INTERVAL_MS, MAX_POLL_INTERVAL_MS, self.poll_interval_ms
            )));
        }

        if self.auto_commit_interval_ms < MIN_AUTO_COMMIT_INTERVAL_MS
            || self.auto_commit_interval_ms > MAX_AUTO_COMMIT_INTERVAL_MS
        {
            return Err(ConfigError::broker(format!(
                "broker.auto_commit_interval_ms must be {}-{}, got {}",
                MIN_AUTO_COMMIT_INTERVAL_MS,
                MAX_AUTO_COMMIT_INTERVAL_MS,
                self.auto_commit_interval_ms
            )));
        }

        if self.partitions < MIN_PARTITIONS || self.partitions > MAX_PARTITIONS {
            return Err(ConfigError::broker(format!(
                "broker.partitions must be {}-{}, got {}",
                MIN_PARTITIONS, MAX_PARTITIONS, self.partitions
            )));
        }

        Ok(())
    }
}

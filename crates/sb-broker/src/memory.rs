use crate::{
    BrokerError, BrokerSettings, ConsumerFactory, ConsumerRecord, IpOctetPartitioner, Partitioner,
    Result, StatsConsumer,
};

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use tokio::sync::Notify;
use tokio::time::Instant;

/// In-process broker backend.
///
/// One partitioned topic log per topic name, single consumer group: each
/// record is consumed once. Backs the server binary, demos, and tests; a
/// networked broker client plugs into the same [`ConsumerFactory`] seam.
pub struct MemoryBroker {
    inner: Arc<BrokerShared>,
}

struct BrokerShared {
    partition_count: usize,
    /// topic -> per-partition record queues
    topics: Mutex<HashMap<String, Vec<VecDeque<ConsumerRecord>>>>,
    /// Wakes pollers when a record lands
    published: Notify,
    partitioner: IpOctetPartitioner,
    /// Keyless publishes rotate across partitions
    round_robin: AtomicUsize,
}

impl MemoryBroker {
    pub fn new(partition_count: usize) -> Self {
        Self {
            inner: Arc::new(BrokerShared {
                partition_count: partition_count.max(1),
                topics: Mutex::new(HashMap::new()),
                published: Notify::new(),
                partitioner: IpOctetPartitioner::new(),
                round_robin: AtomicUsize::new(0),
            }),
        }
    }

    /// Produce a record onto `topic`, returning the partition it landed on.
    ///
    /// Keyed records are routed through the partition strategy; an invalid
    /// key aborts the send and the error is the caller's to handle.
    pub fn publish(
        &self,
        topic: &str,
        key: Option<&str>,
        value: impl Into<String>,
    ) -> Result<usize> {
        let partition = match key {
            Some(key) => {
                self.inner
                    .partitioner
                    .partition(topic, key, self.inner.partition_count)?
            }
            None => {
                self.inner.round_robin.fetch_add(1, Ordering::Relaxed)
                    % self.inner.partition_count
            }
        };

        let record = ConsumerRecord::new(key.map(String::from), value);

        {
            let mut topics = self
                .inner
                .topics
                .lock()
                .expect("memory broker lock poisoned");
            let partitions = topics
                .entry(topic.to_string())
                .or_insert_with(|| vec![VecDeque::new(); self.inner.partition_count]);
            partitions[partition].push_back(record);
        }

        self.inner.published.notify_waiters();

        Ok(partition)
    }

    pub fn partition_count(&self) -> usize {
        self.inner.partition_count
    }

    /// Factory handle for wiring this broker into a consumer owner.
    pub fn consumer_factory(&self) -> MemoryConsumerFactory {
        MemoryConsumerFactory {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl Clone for MemoryBroker {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Creates [`MemoryConsumer`]s over a shared [`MemoryBroker`].
pub struct MemoryConsumerFactory {
    inner: Arc<BrokerShared>,
}

#[async_trait]
impl ConsumerFactory for MemoryConsumerFactory {
    async fn create(&self, settings: &BrokerSettings) -> Result<Box<dyn StatsConsumer>> {
        debug!(
            "creating memory consumer (group {}, servers {} ignored in-process)",
            settings.group_id, settings.bootstrap_servers
        );

        Ok(Box::new(MemoryConsumer {
            inner: Arc::clone(&self.inner),
            topic: None,
            closed: false,
        }))
    }
}

/// Single-group consumer over a [`MemoryBroker`] topic.
pub struct MemoryConsumer {
    inner: Arc<BrokerShared>,
    topic: Option<String>,
    closed: bool,
}

impl MemoryConsumer {
    /// Drain everything currently queued for `topic`, in partition order.
    fn drain(&self, topic: &str) -> Vec<ConsumerRecord> {
        let mut topics = self
            .inner
            .topics
            .lock()
            .expect("memory broker lock poisoned");

        let Some(partitions) = topics.get_mut(topic) else {
            return Vec::new();
        };

        let mut batch = Vec::new();
        for queue in partitions.iter_mut() {
            batch.extend(queue.drain(..));
        }
        batch
    }
}

#[async_trait]
impl StatsConsumer for MemoryConsumer {
    async fn subscribe(&mut self, topic: &str) -> Result<()> {
        if self.closed {
            return Err(BrokerError::closed());
        }

        self.topic = Some(topic.to_string());
        Ok(())
    }

    async fn poll(&mut self, timeout: Duration) -> Result<Vec<ConsumerRecord>> {
        if self.closed {
            return Err(BrokerError::closed());
        }

        let topic = self
            .topic
            .clone()
            .ok_or_else(|| BrokerError::configuration("poll called before subscribe"))?;

        let deadline = Instant::now() + timeout;

        loop {
            let batch = self.drain(&topic);
            if !batch.is_empty() {
                return Ok(batch);
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                // Bounded poll: an empty batch is a normal outcome
                return Ok(Vec::new());
            }

            // A publish between drain and notified() is only picked up on the
            // next pass, still within the poll bound.
            let _ = tokio::time::timeout(remaining, self.inner.published.notified()).await;
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.closed = true;
        self.topic = None;
        Ok(())
    }
}

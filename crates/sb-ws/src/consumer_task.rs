//! Background consumer loop owned by the broadcaster.
//!
//! The loop is the only code that touches the broker consumer handle. It
//! checks the shared stop flag at every poll boundary, so shutdown latency
//! is bounded by the configured poll interval plus the in-flight fan-out.

use crate::stats_broadcaster::BroadcasterShared;
use crate::{Lifecycle, ObserverId, StatsObserver, create_delivery_span, with_retry};

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use log::{error, info, warn};
use sb_broker::{BrokerSettings, ConsumerRecord, Result as BrokerResult, StatsConsumer};

pub(crate) async fn run(shared: Arc<BroadcasterShared>) {
    let mut consumer = match build_consumer(&shared).await {
        Ok(consumer) => consumer,
        Err(e) => {
            // Terminal for this start attempt. Registrations are kept, so a
            // later register retries a fresh start.
            error!("Stats consumer could not be started: {e}");
            shared.metrics.consumer_start_failed();
            shared.lifecycle.store(Lifecycle::Stopped);
            return;
        }
    };

    shared.lifecycle.store(Lifecycle::Running);
    shared.metrics.consumer_started();
    info!("Stats consumer task running");

    let poll_interval = Duration::from_millis(shared.broker_config.poll_interval_ms);
    let mut fatal = false;

    while !shared.stop_flag.load(Ordering::Acquire) {
        match consumer.poll(poll_interval).await {
            Ok(records) => {
                for record in records {
                    deliver(&shared, &record).await;
                }
            }
            Err(e) => {
                error!("Stats consumer poll failed, stopping task: {e}");
                shared.metrics.poll_failed();
                fatal = true;
                break;
            }
        }
    }

    shared.lifecycle.store(Lifecycle::Stopping);
    if let Err(e) = consumer.close().await {
        warn!("Error closing stats consumer: {e}");
    }

    shared.lifecycle.store(Lifecycle::Stopped);
    shared.metrics.consumer_stopped();
    info!("Stats consumer task stopped");

    if fatal {
        // Not retried automatically; the next registration starts fresh
        return;
    }

    // Observers that registered while the task was draining saw a
    // non-Stopped lifecycle and could not start a replacement; do it for
    // them now that Stopped is visible. The guard must drop before
    // try_start takes the lock again.
    let has_observers = !shared.observers.read().await.is_empty();
    if has_observers && shared.try_start().await {
        info!("Observers registered during shutdown, consumer restarted");
    }
}

/// Resolve settings and construct a subscribed consumer handle.
///
/// Missing bootstrap servers or topic fail fast; connection failures are
/// retried with bounded backoff before giving up.
async fn build_consumer(
    shared: &Arc<BroadcasterShared>,
) -> BrokerResult<Box<dyn StatsConsumer>> {
    let settings = BrokerSettings::from_config(&shared.broker_config)?;
    info!(
        "Stats consumer params: {}, {}",
        settings.bootstrap_servers, settings.topic
    );

    with_retry(&shared.retry, "broker consumer connect", || async {
        let mut consumer = shared.factory.create(&settings).await?;
        consumer.subscribe(&settings.topic).await?;
        Ok(consumer)
    })
    .await
}

/// Fan one record out to every observer registered when the pass begins.
///
/// The snapshot is taken under a short read lock, so registrations and
/// deregistrations never block on an in-flight delivery; an observer that
/// deregisters mid-pass may still receive this record. A failing observer
/// is logged and skipped, never the batch.
async fn deliver(shared: &Arc<BroadcasterShared>, record: &ConsumerRecord) {
    let snapshot: Vec<(ObserverId, Arc<dyn StatsObserver>)> = {
        let observers = shared.observers.read().await;
        observers
            .iter()
            .map(|(id, registered)| (*id, Arc::clone(&registered.observer)))
            .collect()
    };

    let topic = shared.broker_config.topic.as_deref().unwrap_or("unknown");
    let _span = create_delivery_span(topic, snapshot.len()).entered();

    shared.metrics.message_consumed(snapshot.len());

    for (id, observer) in snapshot {
        if let Err(e) = observer.on_stats_message(&record.value) {
            warn!("Delivery to observer {id} failed: {e}");
            shared.metrics.delivery_failed();
        }
    }
}

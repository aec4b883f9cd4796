use crate::lifecycle::LifecycleCell;
use crate::{Lifecycle, Metrics, ObserverId, RetryConfig, StatsObserver, consumer_task};

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info};
use sb_broker::ConsumerFactory;
use sb_config::BrokerConfig;
use tokio::sync::RwLock;

/// Fans consumed stats messages out to registered observers, running the
/// broker consumer only while someone is listening.
///
/// The first registration starts a background consumer task; the last
/// deregistration signals it to stop via a shared flag, and the task exits
/// after its current bounded poll returns. One service object owns all of
/// this; construct it once at startup and clone handles into collaborators.
pub struct StatsBroadcaster {
    shared: Arc<BroadcasterShared>,
}

pub(crate) struct BroadcasterShared {
    /// Registered observers, mutated by connection handlers at any time
    pub(crate) observers: RwLock<HashMap<ObserverId, RegisteredObserver>>,
    /// Consumer task state, mutated only via CAS (see LifecycleCell)
    pub(crate) lifecycle: LifecycleCell,
    /// Sole manager -> task signal; checked at every poll boundary
    pub(crate) stop_flag: AtomicBool,
    pub(crate) factory: Arc<dyn ConsumerFactory>,
    pub(crate) broker_config: BrokerConfig,
    pub(crate) retry: RetryConfig,
    pub(crate) metrics: Metrics,
}

pub(crate) struct RegisteredObserver {
    pub(crate) observer: Arc<dyn StatsObserver>,
    pub(crate) registered_at: chrono::DateTime<chrono::Utc>,
}

impl StatsBroadcaster {
    pub fn new(
        factory: Arc<dyn ConsumerFactory>,
        broker_config: BrokerConfig,
        retry: RetryConfig,
        metrics: Metrics,
    ) -> Self {
        Self {
            shared: Arc::new(BroadcasterShared {
                observers: RwLock::new(HashMap::new()),
                lifecycle: LifecycleCell::new(),
                stop_flag: AtomicBool::new(false),
                factory,
                broker_config,
                retry,
                metrics,
            }),
        }
    }

    /// Register an observer under `id`.
    ///
    /// Idempotent per id: a second registration of a live id changes
    /// nothing. Registering while the consumer is stopped (first observer,
    /// or any observer after a failed start) triggers a start attempt;
    /// registration itself returns promptly, broker connection setup runs
    /// on the background task.
    pub async fn register(&self, id: ObserverId, observer: Arc<dyn StatsObserver>) {
        let inserted_total = {
            let mut observers = self.shared.observers.write().await;
            match observers.entry(id) {
                Entry::Occupied(_) => {
                    debug!("Observer {id} already registered");
                    None
                }
                Entry::Vacant(entry) => {
                    entry.insert(RegisteredObserver {
                        observer,
                        registered_at: chrono::Utc::now(),
                    });
                    Some(observers.len())
                }
            }
        };

        if let Some(total) = inserted_total {
            info!("Registered observer {id} ({total} total)");
            self.shared.metrics.observers_changed(total);
        }

        // Cheap when already Starting/Running: one failed CAS
        self.shared.try_start().await;
    }

    /// Deregister `id`. No-op for an unknown id. Removing the last observer
    /// signals the consumer task to stop; the call does not wait for it.
    pub async fn deregister(&self, id: ObserverId) {
        let (registered, remaining) = {
            let mut observers = self.shared.observers.write().await;
            let Some(registered) = observers.remove(&id) else {
                return;
            };
            (registered, observers.len())
        };

        let subscribed_secs = (chrono::Utc::now() - registered.registered_at).num_seconds();
        info!("Deregistered observer {id} after {subscribed_secs}s ({remaining} remaining)");
        self.shared.metrics.observers_changed(remaining);

        if remaining == 0 {
            self.shared.stop();
        }
    }

    pub async fn observer_count(&self) -> usize {
        self.shared.observers.read().await.len()
    }

    /// Current consumer task state.
    pub fn lifecycle(&self) -> Lifecycle {
        self.shared.lifecycle.load()
    }
}

impl Clone for StatsBroadcaster {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl BroadcasterShared {
    /// Start the consumer task if it is stopped and observers exist.
    ///
    /// The Stopped -> Starting swap has exactly one winner, so concurrent
    /// first registrations cannot start two tasks, and a start cannot race
    /// an in-flight stop (the draining task re-checks the observer set
    /// after it reaches Stopped and calls back in here).
    pub(crate) fn try_start<'a>(
        self: &'a Arc<Self>,
    ) -> Pin<Box<dyn Future<Output = bool> + Send + 'a>> {
        Box::pin(async move {
            if !self
                .lifecycle
                .transition(Lifecycle::Stopped, Lifecycle::Starting)
            {
                return false;
            }

            // Clear the flag before reading the set: a deregistration that
            // empties the set after this point re-raises the flag, one that
            // emptied it before is caught by the check below.
            self.stop_flag.store(false, Ordering::Release);

            if self.observers.read().await.is_empty() {
                // Lost a race with the last deregistration; nothing to serve
                self.lifecycle.store(Lifecycle::Stopped);
                return false;
            }

            info!("Starting stats consumer task");
            let shared = Arc::clone(self);
            tokio::spawn(consumer_task::run(shared));

            true
        })
    }

    /// Signal the consumer task to stop. Cooperative: the task observes the
    /// flag at its next poll boundary, closes the consumer handle and exits.
    pub(crate) fn stop(&self) {
        debug!("Signalling stats consumer task to stop");
        self.stop_flag.store(true, Ordering::Release);
    }
}

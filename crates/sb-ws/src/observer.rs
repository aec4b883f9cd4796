use crate::Result;

use uuid::Uuid;

/// Capability to receive consumed stats messages.
///
/// `on_stats_message` is called once per consumed record, synchronously and
/// sequentially across observers, so implementations must not block: hand
/// the payload off (e.g. `try_send` into a bounded channel) and return. A
/// returned error is logged and isolated to this observer; delivery to the
/// remaining observers continues.
pub trait StatsObserver: Send + Sync {
    fn on_stats_message(&self, payload: &str) -> Result<()>;
}

/// Unique observer identity.
///
/// Registration is keyed by this id: registering the same id twice is a
/// no-op, distinct ids are distinct observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(Uuid);

impl ObserverId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObserverId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ObserverId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

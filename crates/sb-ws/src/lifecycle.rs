use std::sync::atomic::{AtomicU8, Ordering};

/// Consumer task lifecycle.
///
/// Stopped -> Starting -> Running -> Stopping -> Stopped. Starting and
/// Stopping are the transition windows while the background task is being
/// brought up or drained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Lifecycle {
    Stopped = 0,
    Starting = 1,
    Running = 2,
    Stopping = 3,
}

impl Lifecycle {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Lifecycle::Stopped,
            1 => Lifecycle::Starting,
            2 => Lifecycle::Running,
            _ => Lifecycle::Stopping,
        }
    }
}

impl std::fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Lifecycle::Stopped => "stopped",
            Lifecycle::Starting => "starting",
            Lifecycle::Running => "running",
            Lifecycle::Stopping => "stopping",
        };
        write!(f, "{name}")
    }
}

/// Atomic lifecycle token.
///
/// All state changes go through `transition` (compare-and-swap), except that
/// the consumer task itself, as the sole owner of the Starting/Running/
/// Stopping phases, may `store` its own progress. This is what makes
/// "start if not running" safe against concurrent registrations: exactly one
/// caller wins the Stopped -> Starting swap.
pub(crate) struct LifecycleCell(AtomicU8);

impl LifecycleCell {
    pub(crate) fn new() -> Self {
        Self(AtomicU8::new(Lifecycle::Stopped as u8))
    }

    pub(crate) fn load(&self) -> Lifecycle {
        Lifecycle::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Atomically move `from` -> `to`. Returns false if the current state
    /// was not `from` (someone else transitioned first).
    pub(crate) fn transition(&self, from: Lifecycle, to: Lifecycle) -> bool {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Unconditional store, used only by the owning consumer task.
    pub(crate) fn store(&self, to: Lifecycle) {
        self.0.store(to as u8, Ordering::Release);
    }
}

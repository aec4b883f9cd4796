use metrics::{counter, gauge};

/// Metrics collector for broadcast and connection activity
#[derive(Clone)]
pub struct Metrics {
    prefix: &'static str,
}

impl Metrics {
    pub fn new() -> Self {
        Self { prefix: "sb_ws" }
    }

    /// Record new connection established
    pub fn connection_established(&self) {
        counter!(format!("{}.connections.established", self.prefix)).increment(1);
        gauge!(format!("{}.connections.active", self.prefix)).increment(1.0);
    }

    /// Record connection closed
    pub fn connection_closed(&self, reason: &str) {
        counter!(format!("{}.connections.closed", self.prefix)).increment(1);
        counter!(format!("{}.connections.closed.{}", self.prefix, reason)).increment(1);
        gauge!(format!("{}.connections.active", self.prefix)).decrement(1.0);
    }

    /// Record current observer count after a register/deregister
    pub fn observers_changed(&self, total: usize) {
        gauge!(format!("{}.observers.registered", self.prefix)).set(total as f64);
    }

    /// Record consumer task started
    pub fn consumer_started(&self) {
        counter!(format!("{}.consumer.started", self.prefix)).increment(1);
    }

    /// Record consumer task stopped
    pub fn consumer_stopped(&self) {
        counter!(format!("{}.consumer.stopped", self.prefix)).increment(1);
    }

    /// Record a failed consumer start attempt
    pub fn consumer_start_failed(&self) {
        counter!(format!("{}.consumer.start_failed", self.prefix)).increment(1);
    }

    /// Record a fatal poll failure
    pub fn poll_failed(&self) {
        counter!(format!("{}.consumer.poll_failed", self.prefix)).increment(1);
    }

    /// Record one consumed message fanned out to `observer_count` observers
    pub fn message_consumed(&self, observer_count: usize) {
        counter!(format!("{}.messages.consumed", self.prefix)).increment(1);
        counter!(format!("{}.messages.delivered", self.prefix))
            .increment(observer_count as u64);
    }

    /// Record a delivery failure for a single observer
    pub fn delivery_failed(&self) {
        counter!(format!("{}.messages.delivery_failed", self.prefix)).increment(1);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

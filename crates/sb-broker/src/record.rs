/// A single (key, value) record consumed from the stats topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerRecord {
    /// Producer-assigned key, if any (typically a client address)
    pub key: Option<String>,
    /// Message payload, delivered verbatim to observers
    pub value: String,
}

impl ConsumerRecord {
    pub fn new(key: Option<String>, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

use crate::{BrokerError, Result};

use std::panic::Location;

use error_location::ErrorLocation;

/// Producer-side partition strategy, plugged into the broker producer and
/// invoked once per keyed send.
pub trait Partitioner: Send + Sync {
    fn partition(&self, topic: &str, key: &str, available_partitions: usize) -> Result<usize>;
}

/// Partitions by the lowest-order field of a dotted key.
///
/// Keys are typically dotted-quad client addresses; all requests from one
/// address land on one partition, keyed by its last octet. Keys without a
/// `.` (or with a leading `.`) fall back to partition 0; a non-numeric
/// trailing field is the producer's error and aborts the send.
#[derive(Debug, Clone, Copy, Default)]
pub struct IpOctetPartitioner;

impl IpOctetPartitioner {
    pub fn new() -> Self {
        Self
    }
}

impl Partitioner for IpOctetPartitioner {
    fn partition(&self, _topic: &str, key: &str, available_partitions: usize) -> Result<usize> {
        if available_partitions == 0 {
            return Err(BrokerError::configuration(
                "cannot partition over 0 partitions",
            ));
        }

        match key.rfind('.') {
            Some(offset) if offset > 0 => {
                let suffix = &key[offset + 1..];
                let octet: u32 =
                    suffix
                        .parse()
                        .map_err(|source| BrokerError::InvalidPartitionKey {
                            key: key.to_string(),
                            source,
                            location: ErrorLocation::from(Location::caller()),
                        })?;
                Ok(octet as usize % available_partitions)
            }
            _ => Ok(0),
        }
    }
}

use std::num::ParseIntError;
use std::panic::Location;

use error_location::ErrorLocation;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrokerError {
    #[error("Broker configuration error: {message} {location}")]
    Configuration {
        message: String,
        location: ErrorLocation,
    },

    #[error("Broker connection failed: {message} {location}")]
    Connection {
        message: String,
        location: ErrorLocation,
    },

    #[error("Broker poll failed: {message} {location}")]
    Poll {
        message: String,
        location: ErrorLocation,
    },

    #[error("Partition key {key:?} has no numeric suffix: {source} {location}")]
    InvalidPartitionKey {
        key: String,
        #[source]
        source: ParseIntError,
        location: ErrorLocation,
    },

    #[error("Consumer is closed {location}")]
    Closed { location: ErrorLocation },
}

impl BrokerError {
    /// Create a configuration error
    #[track_caller]
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        BrokerError::Configuration {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Create a connection error
    #[track_caller]
    pub fn connection<S: Into<String>>(message: S) -> Self {
        BrokerError::Connection {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Create a poll error
    #[track_caller]
    pub fn poll<S: Into<String>>(message: S) -> Self {
        BrokerError::Poll {
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Create a closed-consumer error
    #[track_caller]
    pub fn closed() -> Self {
        BrokerError::Closed {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    /// Connection failures are transient; everything else is not worth
    /// repeating with the same inputs.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BrokerError::Connection { .. })
    }
}

pub type Result<T> = std::result::Result<T, BrokerError>;

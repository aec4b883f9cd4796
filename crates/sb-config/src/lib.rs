mod broker_config;
mod config;
mod error;
mod log_level;
mod logging_config;
mod retry_config;
mod server_config;
mod websocket_config;

pub use broker_config::BrokerConfig;
pub use config::Config;
pub use error::{ConfigError, ConfigErrorResult};
pub use log_level::LogLevel;
pub use logging_config::LoggingConfig;
pub use retry_config::RetryConfig;
pub use server_config::ServerConfig;
pub use websocket_config::WebSocketConfig;

pub use broker_config::{
    DEFAULT_AUTO_COMMIT_INTERVAL_MS, DEFAULT_GROUP_ID, DEFAULT_PARTITIONS, DEFAULT_POLL_INTERVAL_MS,
};
pub use server_config::{DEFAULT_MAX_CONNECTIONS, DEFAULT_PORT};
pub use websocket_config::{DEFAULT_ENDPOINT_PATH, DEFAULT_SEND_BUFFER_SIZE};

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_LOG_LEVEL_STRING: &str = "info";
const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;
const DEFAULT_LOG_DIRECTORY: &str = "log";

#[cfg(test)]
mod tests;

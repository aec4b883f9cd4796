use crate::{
    BrokerConfig, ConfigError, ConfigErrorResult, LoggingConfig, RetryConfig, ServerConfig,
    WebSocketConfig,
};

use std::path::PathBuf;

use log::info;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub broker: BrokerConfig,
    pub websocket: WebSocketConfig,
    pub logging: LoggingConfig,
    pub retry: RetryConfig,
}

impl Config {
    /// Load config with full production error handling.
    ///
    /// Loading order:
    /// 1. Check for SB_CONFIG_DIR env var, else use ./.sb/
    /// 2. Auto-create config directory if it doesn't exist
    /// 3. Load config.toml if it exists, else use defaults
    /// 4. Apply SB_* environment variable overrides
    ///
    /// Does NOT validate - call validate() after load().
    pub fn load() -> ConfigErrorResult<Self> {
        let config_dir = Self::config_dir()?;

        // Auto-create config directory
        if !config_dir.exists() {
            std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::Io {
                path: config_dir.clone(),
                source: e,
            })?;
        }

        let config_path = config_dir.join("config.toml");

        let mut config = if config_path.exists() {
            Self::load_toml(&config_path)?
        } else {
            Config::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    /// Load and parse TOML file with detailed error context.
    fn load_toml(path: &PathBuf) -> ConfigErrorResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::Toml {
            path: path.clone(),
            source: e,
        })
    }

    /// Get the config directory.
    /// Priority: SB_CONFIG_DIR env var > ./.sb/ (relative to cwd)
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        if let Ok(dir) = std::env::var("SB_CONFIG_DIR") {
            return Ok(PathBuf::from(dir));
        }

        let cwd = std::env::current_dir()
            .map_err(|_| ConfigError::config("Cannot determine current working directory"))?;
        Ok(cwd.join(".sb"))
    }

    /// Validate all configuration.
    /// Call after load() to catch all errors at startup.
    pub fn validate(&self) -> ConfigErrorResult<()> {
        self.server.validate()?;
        self.broker.validate()?;
        self.websocket.validate()?;
        self.retry.validate()?;

        Ok(())
    }

    /// Get bind address as string.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Log configuration summary.
    pub fn log_summary(&self) {
        info!("Configuration loaded:");
        info!(
            "  server: {}:{} (max {} connections)",
            self.server.host, self.server.port, self.server.max_connections
        );

        info!(
            "  broker: servers={}, topic={}, group={}, poll={}ms",
            self.broker.bootstrap_servers.as_deref().unwrap_or("unset"),
            self.broker.topic.as_deref().unwrap_or("unset"),
            self.broker.group_id,
            self.broker.poll_interval_ms
        );

        info!(
            "  websocket: path={}, buffer={}",
            self.websocket.endpoint_path, self.websocket.send_buffer_size
        );

        info!(
            "  logging: {} (colored: {})",
            *self.logging.level, self.logging.colored
        );

        info!(
            "  retry: attempts={}, initial={}ms, max={}s, backoff={}x",
            self.retry.max_attempts,
            self.retry.initial_delay_ms,
            self.retry.max_delay_secs,
            self.retry.backoff_multiplier
        );
    }

    fn apply_env_overrides(&mut self) {
        // Server
        Self::apply_env_string("SB_SERVER_HOST", &mut self.server.host);
        Self::apply_env_parse("SB_SERVER_PORT", &mut self.server.port);
        Self::apply_env_parse(
            "SB_SERVER_MAX_CONNECTIONS",
            &mut self.server.max_connections,
        );
        Self::apply_env_parse("SB_IDLE_SHUTDOWN_SECS", &mut self.server.idle_shutdown_secs);

        // Broker
        Self::apply_env_option_string(
            "SB_BROKER_BOOTSTRAP_SERVERS",
            &mut self.broker.bootstrap_servers,
        );
        Self::apply_env_option_string("SB_BROKER_TOPIC", &mut self.broker.topic);
        Self::apply_env_string("SB_BROKER_GROUP_ID", &mut self.broker.group_id);
        Self::apply_env_parse("SB_BROKER_POLL_INTERVAL_MS", &mut self.broker.poll_interval_ms);
        Self::apply_env_parse(
            "SB_BROKER_AUTO_COMMIT_INTERVAL_MS",
            &mut self.broker.auto_commit_interval_ms,
        );
        Self::apply_env_parse("SB_BROKER_PARTITIONS", &mut self.broker.partitions);

        // WebSocket
        Self::apply_env_string("SB_WS_ENDPOINT_PATH", &mut self.websocket.endpoint_path);
        Self::apply_env_parse("SB_WS_SEND_BUFFER_SIZE", &mut self.websocket.send_buffer_size);

        // Logging
        Self::apply_env_parse("SB_LOG_LEVEL", &mut self.logging.level);
        Self::apply_env_bool("SB_LOG_COLORED", &mut self.logging.colored);
        Self::apply_env_option_string("SB_LOG_FILE", &mut self.logging.file);

        // Retry
        Self::apply_env_parse("SB_RETRY_MAX_ATTEMPTS", &mut self.retry.max_attempts);
        Self::apply_env_parse("SB_RETRY_INITIAL_DELAY_MS", &mut self.retry.initial_delay_ms);
        Self::apply_env_parse("SB_RETRY_MAX_DELAY_SECS", &mut self.retry.max_delay_secs);
        Self::apply_env_parse(
            "SB_RETRY_BACKOFF_MULTIPLIER",
            &mut self.retry.backoff_multiplier,
        );
        Self::apply_env_bool("SB_RETRY_JITTER", &mut self.retry.jitter);
    }

    /// Helper: Apply environment variable override for String values
    fn apply_env_string(var_name: &str, target: &mut String) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val;
        }
    }

    /// Helper: Apply environment variable override for bool values (accepts "true"/"1")
    fn apply_env_bool(var_name: &str, target: &mut bool) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val == "true" || val == "1";
        }
    }

    /// Helper: Apply environment variable override for parseable values
    fn apply_env_parse<T: std::str::FromStr>(var_name: &str, target: &mut T) {
        if let Ok(val) = std::env::var(var_name)
            && let Ok(parsed) = val.parse()
        {
            *target = parsed;
        }
    }

    /// Helper: Apply environment variable override for Option<String> values
    fn apply_env_option_string(var_name: &str, target: &mut Option<String>) {
        if let Ok(val) = std::env::var(var_name) {
            *target = Some(val);
        }
    }
}

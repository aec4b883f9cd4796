use sb_broker::MemoryBroker;
use sb_server::{ServerState, build_router, logger};
use sb_ws::{
    AppState, ConnectionConfig, Metrics, RetryConfig, ShutdownCoordinator, StatsBroadcaster,
};

use std::error::Error;
use std::sync::Arc;

use log::{error, info, warn};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();

    // Load and validate configuration
    let config = sb_config::Config::load()?;
    config.validate()?;

    // Construct log file path if configured
    let log_file_path: Option<std::path::PathBuf> = if let Some(ref filename) = config.logging.file
    {
        let config_dir = sb_config::Config::config_dir()?;
        let log_dir = config_dir.join(&config.logging.dir);

        // Ensure log directory exists
        std::fs::create_dir_all(&log_dir)?;

        Some(log_dir.join(filename))
    } else {
        None
    };

    // Initialize logger (before any other logging)
    logger::initialize(config.logging.level, log_file_path, config.logging.colored)?;

    info!("Starting sb-server v{}", env!("CARGO_PKG_VERSION"));
    config.log_summary();

    // In-process broker backend; an external broker client would plug into
    // the same ConsumerFactory seam
    let broker = MemoryBroker::new(config.broker.partitions);

    // Create metrics collector
    let metrics = Metrics::new();

    // Create shutdown coordinator
    let shutdown = ShutdownCoordinator::new();

    // Create the broadcaster; the consumer starts lazily with the first
    // connected client
    let broadcaster = StatsBroadcaster::new(
        Arc::new(broker.consumer_factory()),
        config.broker.clone(),
        RetryConfig::from(&config.retry),
        metrics.clone(),
    );
    let broadcaster_for_idle = broadcaster.clone();

    // Create connection config for sb-ws
    let connection_config = ConnectionConfig {
        send_buffer_size: config.websocket.send_buffer_size,
        max_connections: config.server.max_connections,
    };

    // Build application state
    let app_state = AppState {
        broadcaster,
        metrics,
        shutdown: shutdown.clone(),
        config: connection_config,
    };

    let server_state = ServerState {
        app: app_state,
        broker,
        topic: config.broker.topic.clone(),
    };

    // Build router
    let app = build_router(server_state, &config.websocket.endpoint_path);

    // Create TCP listener
    let bind_addr = config.bind_addr();
    let listener = TcpListener::bind(&bind_addr).await?;

    // Get actual bound address (important when port is 0 / auto-assigned)
    let actual_addr = listener.local_addr()?;
    info!("Server listening on {}", actual_addr);

    // Spawn signal handler for graceful shutdown
    let shutdown_for_signal = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received SIGINT (Ctrl+C), initiating graceful shutdown");
                shutdown_for_signal.shutdown();
            }
            Err(e) => {
                error!("Failed to listen for SIGINT: {}", e);
            }
        }
    });

    // Idle shutdown monitoring (when configured)
    if config.server.idle_shutdown_secs > 0 {
        let idle_timeout = config.server.idle_shutdown_secs;
        let shutdown_for_idle = shutdown.clone();

        info!("Idle shutdown enabled: {}s timeout", idle_timeout);

        tokio::spawn(async move {
            let grace_period = idle_timeout.min(60);
            info!("Idle shutdown grace period: {}s", grace_period);
            tokio::time::sleep(std::time::Duration::from_secs(grace_period)).await;

            let check_interval = (idle_timeout / 2).max(10);

            loop {
                tokio::time::sleep(std::time::Duration::from_secs(check_interval)).await;

                if broadcaster_for_idle.observer_count().await == 0 {
                    info!(
                        "No active observers, checking again in {}s...",
                        check_interval
                    );

                    tokio::time::sleep(std::time::Duration::from_secs(check_interval)).await;

                    if broadcaster_for_idle.observer_count().await == 0 {
                        warn!(
                            "No observers for {}s, initiating auto-shutdown",
                            idle_timeout
                        );
                        shutdown_for_idle.shutdown();
                        break;
                    } else {
                        info!("Observer registered, continuing...");
                    }
                }
            }
        });
    }

    // Start server with graceful shutdown
    info!("Server ready to accept connections");
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.subscribe_guard().wait().await;
            info!("Graceful shutdown complete");
        })
        .await?;

    Ok(())
}

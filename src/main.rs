use tokio::net::TcpListener;
use weather_service::config::ServiceConfig;
use weather_service::{init, server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Configuration and pipeline errors abort startup.
    let config = ServiceConfig::from_env()?;
    let logger = init::init_logging_with_config(&config.logging)?;

    tracing::info!(
        bind_address = %config.bind_address,
        minimum_level = %config.logging.minimum_level,
        sinks = ?logger.sink_names(),
        "configuration loaded"
    );

    let listener = TcpListener::bind(config.bind_address).await?;
    server::serve(listener, logger.clone(), server::shutdown_signal()).await?;

    tracing::info!("shutdown complete");
    logger.flush().await;
    Ok(())
}

//! movie-search service entry point.

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use movie_search::config::load_config_or_default;
use movie_search::lifecycle::{wait_for_shutdown_signal, Shutdown};
use movie_search::observability::{logging, metrics};
use movie_search::{HttpServer, YoutubeVideoClient};

#[derive(Parser)]
#[command(name = "movie-search")]
#[command(about = "Movie trailer search service", long_about = None)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long, env = "MOVIE_SEARCH_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config_or_default(args.config.as_deref())?;

    logging::init_logging(&config.observability)?;
    tracing::info!("movie-search v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        retry_count = config.policy.retry_count,
        timeout_ms = config.policy.timeout_ms,
        timeout_strategy = ?config.policy.timeout_strategy,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let client = YoutubeVideoClient::new(config.youtube.clone(), &config.policy)?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    shutdown.trigger_on(wait_for_shutdown_signal());

    HttpServer::new(config, client)
        .run(listener, server_shutdown)
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

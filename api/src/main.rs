/// YtRelay API Server
///
/// HTTP remote control for yt-dlp: metadata probes, downloads into a single
/// flat directory, and management of the downloaded files.
mod auth;
mod config;
mod errors;
mod router;
mod routes;

use std::sync::Arc;
use tracing::{info, warn};

use config::ServerConfig;
use ytrelay_downloader::{Downloader, FileStore, YtDlpRunner};

/// Shared application state for all API handlers.
pub struct AppState {
    pub config: ServerConfig,
    pub downloader: Downloader,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenvy::dotenv().ok();

    // Init tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "ytrelay_api=info,ytrelay_downloader=info,tower_http=info".into()
            }),
        )
        .init();

    let config = ServerConfig::from_env();
    if config.api_key.is_none() {
        warn!("API_KEY is not set; every request except /health will be rejected");
    }

    let store = FileStore::new(&config.download_dir);
    store.ensure_root().await?;
    info!("Download directory: {}", config.download_dir.display());

    let runner = Arc::new(YtDlpRunner::new(config.ytdlp_bin.clone(), config.ytdlp_timeout));
    info!(
        "Downloader binary: {} (timeout {}s)",
        runner.bin(),
        config.ytdlp_timeout.as_secs()
    );

    let addr = config.bind_addr();
    let state = Arc::new(AppState {
        downloader: Downloader::new(runner, store),
        config,
    });

    let app = router::build_router(state);

    info!("YtRelay API listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("YtRelay API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

//! Kobi Server
//!
//! A self-hosted ebook server for uploading EPUB files and downloading them
//! on an e-reader.

use std::net::SocketAddr;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use kobi_server::config::Config;
use kobi_server::routes;
use kobi_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "kobi_server=debug,tower_http=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    tracing::info!("Starting Kobi Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Books directory: {}", config.storage.books_dir.display());
    tracing::info!("Staging directory: {}", config.storage.staging_dir.display());
    tracing::info!("Upload limit: {} bytes", config.storage.max_upload_bytes);

    let addr = config.bind_addr()?;

    // Create application state
    let app_state = AppState::new(config);
    app_state.prepare_directories().await?;

    let app = routes::app(app_state);

    // Start server with graceful shutdown
    tracing::info!("Kobi Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown...");
        },
    }
}

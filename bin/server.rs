// SWIFT Directory - Web Server
// REST API with Axum

use anyhow::{Context, Result};
use swift_directory::api::{router, AppState};
use swift_directory::{open_store, Config, SwiftService};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("swift_directory=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env();
    info!(?config, "🌐 SWIFT Directory - Web Server");

    let store = open_store(&config)
        .with_context(|| format!("Failed to open database: {}", config.database_path))?;
    let service = SwiftService::new(store);

    if config.load_initial_data {
        match service.load_initial_data(&config.swift_data_file) {
            Ok(Some(summary)) => info!(?summary, "initial data loaded"),
            Ok(None) => {}
            // A failed seed leaves the server usable with whatever is stored
            Err(e) => error!("initial data load failed: {}", e),
        }
    }

    let app = router(AppState::new(service, config.api_debug), &config.api_version);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to address: {}", config.bind_addr))?;

    info!(
        "🚀 Server running on http://{}{}/swift-codes",
        config.bind_addr,
        config.route_prefix()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

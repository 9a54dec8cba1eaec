//! Server lifecycle: storage, index load, HTTP listener, shutdown

use anyhow::{Context, Result};
use sse_core::config::ServerConfig;
use sse_store::StoreState;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::routes::{router, AppState};
use crate::service::IndexService;

pub async fn run(config: ServerConfig) -> Result<()> {
    info!(backend = ?config.backend, data_dir = %config.data_dir.display(), "server starting");

    let op = sse_store::build_operator(&config)?;
    match sse_store::check_health(&op).await {
        Ok(StoreState::Fresh) => info!("storage: reachable, no saved index"),
        Ok(StoreState::Existing) => info!("storage: reachable, loading saved index"),
        Err(e) => warn!("storage: {e}"),
    }

    let service = IndexService::open(op)
        .await
        .context("loading inverted index")?;

    let listener = TcpListener::bind(&config.listen)
        .await
        .with_context(|| format!("binding {}", config.listen))?;
    info!(addr = %config.listen, "listening on /health, /upload, /search, /metrics");

    let app = router(AppState::new(service), config.max_upload_bytes);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("installing ctrl-c handler failed: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

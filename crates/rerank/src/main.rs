//! DocRank Rerank Service
//!
//! Standalone HTTP service reranking vector search results:
//! - Quality filtering
//! - Hybrid semantic + keyword scoring
//! - Near-duplicate removal
//! - Prometheus metrics and structured logs

use anyhow::Context;
use docrank_common::{config::AppConfig, metrics, VERSION};
use docrank_rerank::{create_router, telemetry, AppState};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().context("failed to load configuration")?;

    // Initialize tracing
    telemetry::init_tracing(&config.observability)?;

    info!("Starting DocRank Rerank Service v{}", VERSION);

    let config = Arc::new(config);

    // Initialize metrics
    let prometheus = telemetry::install_metrics()?;
    metrics::register_metrics();
    telemetry::spawn_metrics_upkeep(prometheus.clone(), Duration::from_secs(5));

    let state = AppState::new(config.clone(), prometheus);
    info!(
        workers = state.pool.workers(),
        alpha = config.rerank.alpha,
        dedup_threshold = config.rerank.dedup_threshold,
        max_candidates = config.rerank.max_candidates,
        "Rerank engine ready"
    );

    let app = create_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .with_context(|| {
            format!(
                "invalid bind address {}:{}",
                config.server.host, config.server.port
            )
        })?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal());
    let shutdown_timeout = config.shutdown_timeout();
    tokio::select! {
        result = server.into_future() => result?,
        _ = drain_deadline(shutdown_timeout) => {
            warn!(
                timeout_secs = shutdown_timeout.as_secs(),
                "Shutdown timeout reached, dropping in-flight requests"
            );
        }
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves `timeout` after a shutdown signal is received
async fn drain_deadline(timeout: Duration) {
    shutdown_signal().await;
    tokio::time::sleep(timeout).await;
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting shutdown..."),
        _ = terminate => info!("Received SIGTERM, starting shutdown..."),
    }
}

//! Door Gateway
//!
//! Entry point for the door-access gateway service.

use door_gateway::bootstrap::build_app_state;
use door_gateway::config::Config;
use door_gateway::observability::metrics::init_metrics_recorder;
use door_gateway::proxy::build_http_client;
use door_gateway::routes;
use door_gateway::services::{UnconfiguredEvents, UnconfiguredUsers};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    door_gateway::init_tracing();

    info!("Starting Door Gateway");

    // Load configuration
    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        service_name = %config.service_name,
        bind_address = %config.bind_address,
        metrics_bind_address = %config.metrics_bind_address,
        users_url = ?config.users_url.as_ref().map(|u| u.as_str()),
        events_url = ?config.events_url.as_ref().map(|u| u.as_str()),
        "Configuration loaded successfully"
    );

    // Metrics recorder must exist before any service call is recorded
    let metrics_handle = init_metrics_recorder().map_err(|e| {
        error!("Failed to initialize metrics: {}", e);
        e
    })?;

    let client = build_http_client(config.request_timeout)?;

    // Parse bind addresses before moving config
    let addr: SocketAddr = config.bind_address.parse().map_err(|e| {
        error!("Invalid bind address: {}", e);
        e
    })?;
    let metrics_addr: SocketAddr = config.metrics_bind_address.parse().map_err(|e| {
        error!("Invalid metrics bind address: {}", e);
        e
    })?;
    let drain_seconds = config.drain_seconds;

    let state = build_app_state(
        config,
        &client,
        Arc::new(UnconfiguredUsers),
        Arc::new(UnconfiguredEvents),
    )
    .map_err(|e| {
        error!("Failed to build service chain: {}", e);
        e
    })?;

    let app = routes::build_routes(state);

    // Metrics listener
    let metrics_listener = tokio::net::TcpListener::bind(metrics_addr).await?;
    info!("Metrics listening on {}", metrics_addr);
    let metrics_app = routes::metrics_routes(metrics_handle);
    tokio::spawn(async move {
        if let Err(e) = axum::serve(metrics_listener, metrics_app).await {
            error!("Metrics server error: {}", e);
        }
    });

    info!("Door Gateway listening on {}", addr);

    // Start server with graceful shutdown support
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(drain_seconds))
    .await?;

    info!("Door Gateway shutdown complete");

    Ok(())
}

/// Listens for shutdown signals (SIGTERM, SIGINT).
/// Returns when a shutdown signal is received and the drain period is complete.
async fn shutdown_signal(drain_seconds: u64) {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT, starting graceful shutdown..."),
            Err(e) => error!("Failed to listen for SIGINT: {}", e),
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received SIGTERM, starting graceful shutdown...");
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    if drain_seconds > 0 {
        warn!("Draining connections for {} seconds...", drain_seconds);
        tokio::time::sleep(Duration::from_secs(drain_seconds)).await;
        info!("Drain period complete");
    } else {
        info!("Skipping drain period (DRAIN_SECONDS=0)");
    }
}

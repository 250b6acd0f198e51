//! HTTP server implementation

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;

use biaslens_core::presentation::api;

use crate::embedded::EmbeddedServices;

pub async fn start_server(services: EmbeddedServices) -> Result<()> {
    let config = &services.manifest.spec;

    info!(
        "BiasLens starting: {} models ({} available), {} bias prompts",
        services.orchestrator.registry().len(),
        services.orchestrator.registry().available_count(),
        services.prompts.len()
    );

    if let Some(metrics) = config
        .observability
        .as_ref()
        .and_then(|o| o.metrics.as_ref())
        .filter(|m| m.enabled)
    {
        let addr: SocketAddr = format!("{}:{}", config.server.bind_address, metrics.port)
            .parse()
            .with_context(|| format!("Invalid metrics address for port {}", metrics.port))?;
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .context("Failed to install Prometheus exporter")?;
        info!("Metrics exposed on http://{}/metrics", addr);
    }

    let app = api::app(services.app_state(), &config.server);

    let addr = format!("{}:{}", config.server.bind_address, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Server shutting down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}

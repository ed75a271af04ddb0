pub mod app;
pub mod gateway;
pub mod settings;
mod shared;

use anyhow::Context;
use gateway::{Gateway, GatewayConfig, GatewayManager};
use settings::Settings;
use std::sync::Arc;

/// Serves the gateway until Ctrl-C / SIGTERM, then drains in-flight requests.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let gateway = Gateway::new(GatewayConfig::from_settings(&settings))
        .context("failed to initialize backend gateway")?;

    let mut manager = GatewayManager::default();
    let status = manager
        .start(Arc::new(gateway), &settings.listen_host, Some(settings.port))
        .map_err(anyhow::Error::msg)
        .context("failed to start gateway server")?;

    tracing::info!(
        base_url = status.base_url.as_deref().unwrap_or_default(),
        backend_url = %settings.backend_url,
        "sigo gateway ready"
    );

    shutdown_signal().await;
    tracing::info!("shutdown requested");
    manager.stop().await;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                tracing::error!("failed to listen for SIGTERM: {err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

use crate::settings;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::forwarder::Gateway;
use super::routes::build_router;
use super::GatewayStatus;

struct RunningGateway {
    port: u16,
    base_url: String,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

#[derive(Default)]
pub struct GatewayManager {
    running: Option<RunningGateway>,
}

#[derive(Clone)]
pub(crate) struct GatewayAppState {
    pub(crate) gateway: Arc<Gateway>,
}

/// Preferred port first, then the default range. `Some(0)` asks the OS for a port.
fn port_candidates(preferred: Option<u16>) -> Vec<u16> {
    if preferred == Some(0) {
        return vec![0];
    }

    let mut candidates = Vec::with_capacity(
        (settings::MAX_GATEWAY_PORT - settings::DEFAULT_GATEWAY_PORT + 2) as usize,
    );

    if let Some(p) = preferred {
        candidates.push(p);
    }

    for port in settings::DEFAULT_GATEWAY_PORT..=settings::MAX_GATEWAY_PORT {
        if candidates.first().copied() == Some(port) {
            continue;
        }
        candidates.push(port);
    }

    candidates
}

fn bind_first_available(
    host: &str,
    preferred: Option<u16>,
) -> Result<(u16, std::net::TcpListener), String> {
    for port in port_candidates(preferred) {
        let std_listener = match std::net::TcpListener::bind((host, port)) {
            Ok(l) => l,
            Err(_) => continue,
        };

        if std_listener.set_nonblocking(true).is_err() {
            continue;
        }

        let bound_port = match std_listener.local_addr() {
            Ok(addr) => addr.port(),
            Err(_) => continue,
        };

        return Ok((bound_port, std_listener));
    }

    Err(format!(
        "GW_PORT_UNAVAILABLE: no available port on {host} in range {}..{}",
        settings::DEFAULT_GATEWAY_PORT,
        settings::MAX_GATEWAY_PORT
    ))
}

impl GatewayManager {
    pub fn status(&self) -> GatewayStatus {
        match &self.running {
            Some(r) => GatewayStatus {
                running: true,
                port: Some(r.port),
                base_url: Some(r.base_url.clone()),
            },
            None => GatewayStatus {
                running: false,
                port: None,
                base_url: None,
            },
        }
    }

    /// Binds and starts serving. Must be called from within a tokio runtime.
    pub fn start(
        &mut self,
        gateway: Arc<Gateway>,
        host: &str,
        preferred_port: Option<u16>,
    ) -> Result<GatewayStatus, String> {
        if self.running.is_some() {
            return Ok(self.status());
        }

        let (port, std_listener) = bind_first_available(host, preferred_port)?;
        let bind_addr = std_listener
            .local_addr()
            .map_err(|e| format!("GW_BIND: {e}"))?;
        let base_url = format!("http://{bind_addr}");

        if let Some(requested_port) = preferred_port.filter(|p| *p > 0 && *p != port) {
            tracing::warn!(
                requested_port,
                bound_port = port,
                base_url = %base_url,
                "port {requested_port} is in use, switched to {port}"
            );
        }

        let app = build_router(GatewayAppState { gateway });
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let listener = match tokio::net::TcpListener::from_std(std_listener) {
                Ok(l) => l,
                Err(err) => {
                    tracing::error!("gateway listener error on {bind_addr}: {err}");
                    return;
                }
            };

            let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });

            if let Err(err) = serve.await {
                tracing::error!("gateway server error on {bind_addr}: {err}");
            }
        });

        tracing::info!(base_url = %base_url, "gateway listening");

        self.running = Some(RunningGateway {
            port,
            base_url,
            shutdown: shutdown_tx,
            task,
        });

        Ok(self.status())
    }

    /// Signals graceful shutdown and waits for in-flight requests to drain.
    pub async fn stop(&mut self) -> GatewayStatus {
        if let Some(running) = self.running.take() {
            let _ = running.shutdown.send(());
            if let Err(err) = running.task.await {
                tracing::error!("gateway task join error: {err}");
            }
            tracing::info!(port = running.port, "gateway stopped");
        }
        self.status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::forwarder::GatewayConfig;
    use crate::settings::DeploymentMode;

    fn gateway() -> Arc<Gateway> {
        Arc::new(
            Gateway::new(GatewayConfig::new(
                "http://127.0.0.1:9/api",
                DeploymentMode::Development,
            ))
            .unwrap(),
        )
    }

    #[test]
    fn candidates_start_with_preferred_port() {
        let candidates = port_candidates(Some(3050));
        assert_eq!(candidates[0], 3050);
        assert_eq!(
            candidates.iter().filter(|p| **p == 3050).count(),
            1,
            "preferred port inside the range is not repeated"
        );
        assert_eq!(port_candidates(Some(0)), vec![0]);
        assert_eq!(port_candidates(None)[0], settings::DEFAULT_GATEWAY_PORT);
    }

    #[tokio::test]
    async fn start_serves_health_and_stop_shuts_down() {
        let mut manager = GatewayManager::default();
        assert!(!manager.status().running);

        let status = manager.start(gateway(), "127.0.0.1", Some(0)).unwrap();
        assert!(status.running);
        let base_url = status.base_url.clone().unwrap();
        assert_ne!(status.port, Some(0));

        let again = manager.start(gateway(), "127.0.0.1", Some(0)).unwrap();
        assert_eq!(again.port, status.port);

        let resp = reqwest::get(format!("{base_url}/health")).await.unwrap();
        assert_eq!(resp.status(), reqwest::StatusCode::OK);
        drop(resp);

        let stopped = manager.stop().await;
        assert!(!stopped.running);
        assert!(reqwest::get(format!("{base_url}/health")).await.is_err());
    }

    #[tokio::test]
    async fn busy_preferred_port_falls_back() {
        let blocker = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let busy = blocker.local_addr().unwrap().port();

        let mut manager = GatewayManager::default();
        match manager.start(gateway(), "127.0.0.1", Some(busy)) {
            Ok(status) => assert_ne!(status.port, Some(busy)),
            Err(err) => assert!(err.starts_with("GW_PORT_UNAVAILABLE")),
        }
        manager.stop().await;
    }
}

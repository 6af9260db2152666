//! HTTP server implementation.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

use crate::service::ParkingService;

use super::routes::routes;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by `PARKADE_HOST` / `PARKADE_PORT`.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(
            std::env::var("PARKADE_HOST").ok(),
            std::env::var("PARKADE_PORT").ok(),
        )
    }

    fn from_vars(host: Option<String>, port: Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();
        if let Some(host) = host.filter(|h| !h.is_empty()) {
            config.host = host;
        }
        if let Some(port) = port.filter(|p| !p.is_empty()) {
            config.port = port
                .parse()
                .map_err(|e| anyhow::anyhow!("invalid PARKADE_PORT {port:?}: {e}"))?;
        }
        Ok(config)
    }
}

/// Start the HTTP server with provided service.
pub async fn serve(config: ServerConfig, service: Arc<ParkingService>) -> anyhow::Result<()> {
    let shutdown_rx = service.shutdown_rx();
    let app = routes(service);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    let listener = TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    info!("Starting parkade server on {}", actual_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_rx))
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Wait for SIGINT, SIGTERM, or a `/shutdown` request.
///
/// # Panics
///
/// Panics if signal handlers cannot be installed, which only happens when the
/// tokio runtime is misconfigured.
async fn shutdown_signal(mut shutdown_rx: watch::Receiver<bool>) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler - is tokio runtime configured correctly?");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler - is tokio runtime configured correctly?")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let explicit_shutdown = async {
        while !*shutdown_rx.borrow() {
            if shutdown_rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    };

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT, shutting down...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down...");
        }
        _ = explicit_shutdown => {
            info!("Shutdown requested via /shutdown endpoint...");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::StandardCostStrategy;
    use crate::display::NoopDisplay;
    use crate::lot::ParkingLot;
    use crate::payment::CashPaymentProcessor;
    use crate::strategy::NearestAvailableSpot;

    #[test]
    fn server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn env_values_override_defaults() {
        let config =
            ServerConfig::from_vars(Some("127.0.0.1".to_string()), Some("9000".to_string()))
                .unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9000);

        let config = ServerConfig::from_vars(Some(String::new()), None).unwrap();
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn bad_port_is_rejected() {
        let err = ServerConfig::from_vars(None, Some("eighty".to_string())).unwrap_err();
        assert!(err.to_string().contains("PARKADE_PORT"));
    }

    #[tokio::test]
    async fn serve_stops_on_explicit_shutdown() {
        let service = Arc::new(ParkingService::new(
            Arc::new(ParkingLot::new(Arc::new(NearestAvailableSpot))),
            Arc::new(CashPaymentProcessor),
            Arc::new(StandardCostStrategy),
            Arc::new(NoopDisplay),
        ));
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        };

        let server = tokio::spawn(serve(config, Arc::clone(&service)));
        service.trigger_shutdown();

        let result = tokio::time::timeout(std::time::Duration::from_secs(5), server)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }
}

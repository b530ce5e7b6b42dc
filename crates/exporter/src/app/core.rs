use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use anyhow::Result;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::api::ApiError;
use crate::api::MetricsServer;
use crate::app::services::ScrapeService;
use crate::config::ServeArgs;

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(15);

type ServerTask = JoinHandle<Result<(), error_stack::Report<ApiError>>>;

/// Long running exporter: the scrape server plus signal handling
pub struct Application {
    service: Arc<ScrapeService>,
    listen_addr: String,
    metrics_path: String,
}

impl Application {
    pub fn new(service: ScrapeService, serve_args: &ServeArgs) -> Self {
        Self {
            service: Arc::new(service.with_exit_on_fetch_error(serve_args.exit_on_fetch_error)),
            listen_addr: serve_args.listen_addr.clone(),
            metrics_path: serve_args.metrics_path.clone(),
        }
    }

    pub fn from_args(serve_args: &ServeArgs) -> Result<Self> {
        let service = ScrapeService::from_args(&serve_args.exporter)?;
        Ok(Self::new(service, serve_args))
    }

    /// Serve until a shutdown signal, a server failure, or a fatal fetch error
    pub async fn run(&self) -> Result<()> {
        let shutdown = CancellationToken::new();
        let fatal = self.service.fatal_token();

        let mut server_task: ServerTask = {
            let server = MetricsServer::new(
                self.service.clone(),
                self.listen_addr.clone(),
                self.metrics_path.clone(),
            );
            let token = shutdown.clone();
            tokio::spawn(async move { server.run(token).await })
        };

        let signal_handler = shutdown_signal()?;

        let outcome = tokio::select! {
            _ = signal_handler => {
                tracing::info!("Shutdown signal received, stopping metrics server");
                Ok(())
            }
            _ = fatal.cancelled() => {
                tracing::error!("Settings fetch failed, stopping exporter");
                Err(anyhow!("settings fetch failed and exit on fetch error is set"))
            }
            result = &mut server_task => {
                return match result {
                    Ok(Ok(())) => {
                        tracing::warn!("Metrics server stopped unexpectedly");
                        Ok(())
                    }
                    Ok(Err(report)) => Err(anyhow!("{report:?}")),
                    Err(e) => Err(e.into()),
                };
            }
        };

        shutdown.cancel();
        match tokio::time::timeout(SHUTDOWN_TIMEOUT, server_task).await {
            Ok(Ok(Ok(()))) => {}
            Ok(Ok(Err(report))) => tracing::error!("Metrics server failed during shutdown: {report:?}"),
            Ok(Err(e)) => tracing::error!("Metrics server task failed during shutdown: {e}"),
            Err(_) => tracing::warn!("Timeout waiting for metrics server to stop"),
        }

        tracing::info!("Application run completed");
        outcome
    }
}

/// Resolves on SIGTERM or SIGINT.
fn shutdown_signal() -> Result<JoinHandle<()>> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;

        Ok(tokio::spawn(async move {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM, initiating graceful shutdown");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT, initiating graceful shutdown");
                }
            }
        }))
    }
    #[cfg(not(unix))]
    {
        Ok(tokio::spawn(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl+C: {e}");
                return;
            }
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }))
    }
}

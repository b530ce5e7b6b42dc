use std::sync::Arc;
use std::time::Duration;

use error_stack::Report;
use poem::get;
use poem::listener::TcpListener;
use poem::middleware::Tracing;
use poem::Endpoint;
use poem::EndpointExt;
use poem::Route;
use poem::Server;
use tokio_util::sync::CancellationToken;
use tracing::error;
use tracing::info;

use super::errors::ApiError;
use super::handlers::healthz;
use super::handlers::landing_page;
use super::handlers::metrics;
use super::handlers::MetricsLocation;
use crate::app::ScrapeService;
use crate::config::HEALTH_PATH;

const GRACEFUL_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

/// Routes of the exporter: landing page, health check and metrics.
pub fn routes(service: Arc<ScrapeService>, metrics_path: &str) -> impl Endpoint {
    Route::new()
        .at("/", get(landing_page))
        .at(HEALTH_PATH, get(healthz))
        .at(metrics_path, get(metrics))
        .data(service)
        .data(MetricsLocation(metrics_path.to_string()))
        .with(Tracing)
}

/// HTTP server publishing the scrape endpoint
pub struct MetricsServer {
    service: Arc<ScrapeService>,
    listen_addr: String,
    metrics_path: String,
}

impl MetricsServer {
    pub fn new(service: Arc<ScrapeService>, listen_addr: String, metrics_path: String) -> Self {
        Self {
            service,
            listen_addr,
            metrics_path,
        }
    }

    /// Serve until `shutdown` is cancelled.
    ///
    /// # Errors
    ///
    /// - [`ApiError::ServerError`] if the server fails to start or bind to the address
    pub async fn run(self, shutdown: CancellationToken) -> Result<(), Report<ApiError>> {
        info!(
            "Serving metrics on http://{}{}",
            self.listen_addr, self.metrics_path
        );

        let app = routes(self.service, &self.metrics_path);
        let server = Server::new(TcpListener::bind(&self.listen_addr));

        match server
            .run_with_graceful_shutdown(
                app,
                shutdown.cancelled_owned(),
                Some(GRACEFUL_SHUTDOWN_TIMEOUT),
            )
            .await
        {
            Ok(()) => {
                info!("Metrics server stopped");
                Ok(())
            }
            Err(e) => {
                error!("Metrics server failed: {e}");
                Err(Report::new(ApiError::ServerError {
                    message: format!("Server failed: {e}"),
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::future::BoxFuture;
    use poem::http::StatusCode;
    use poem::test::TestClient;

    use super::*;
    use crate::domain::collector::FetchResult;
    use crate::domain::collector::SettingsSource;
    use crate::domain::dates::DatePattern;
    use crate::domain::settings::SettingsCorpus;
    use crate::infrastructure::metrics::encoders::prometheus_text::PrometheusEncoder;
    use crate::infrastructure::metrics::MetricDescriptors;

    struct EmptySource;

    impl SettingsSource for EmptySource {
        fn fetch_settings<'a>(&'a self, _patterns: &'a [String]) -> BoxFuture<'a, FetchResult> {
            Box::pin(async { Ok(SettingsCorpus::default()) })
        }
    }

    fn service() -> Arc<ScrapeService> {
        Arc::new(ScrapeService::new(
            Arc::new(EmptySource),
            DatePattern::default(),
            MetricDescriptors::default(),
            Box::new(PrometheusEncoder::new()),
        ))
    }

    #[tokio::test]
    async fn landing_page_links_metrics_path() {
        let cli = TestClient::new(routes(service(), "/custom/metrics"));

        let resp = cli.get("/").send().await;
        resp.assert_status_is_ok();
        let body = resp.0.into_body().into_string().await.expect("body");
        assert!(body.contains("href=\"/custom/metrics\""));
    }

    #[tokio::test]
    async fn healthz_is_ok() {
        let cli = TestClient::new(routes(service(), "/metrics"));

        let resp = cli.get("/healthz").send().await;
        resp.assert_status_is_ok();
        resp.assert_text("ok").await;
    }

    #[tokio::test]
    async fn unknown_path_is_not_found() {
        let cli = TestClient::new(routes(service(), "/metrics"));

        let resp = cli.get("/nope").send().await;
        resp.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn empty_cluster_serves_no_samples() {
        let cli = TestClient::new(routes(service(), "/metrics"));

        let resp = cli.get("/metrics").send().await;
        resp.assert_status_is_ok();
        resp.assert_content_type("text/plain; version=0.0.4; charset=utf-8");
        let body = resp.0.into_body().into_string().await.expect("body");
        assert!(!body.contains("elasticsearch_fields_limit_total{"));
    }
}

use core::error::Error;
use std::sync::Arc;

use anyhow::anyhow;
use derive_more::Display;
use error_stack::Report;
use error_stack::ResultExt;
use es_client::SettingsClient;
use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::config::ExporterArgs;
use crate::domain::collector::ScrapeReport;
use crate::domain::collector::SettingsCollector;
use crate::domain::collector::SettingsSource;
use crate::domain::dates::DatePattern;
use crate::domain::observation::Observation;
use crate::infrastructure::metrics::current_time;
use crate::infrastructure::metrics::encoders::create_encoder;
use crate::infrastructure::metrics::encoders::MetricsEncoder;
use crate::infrastructure::metrics::MetricDescriptors;
use crate::infrastructure::settings_source::ClusterSettingsSource;

#[derive(Debug, Display)]
pub enum ScrapeError {
    #[display("Failed to collect index settings")]
    Collect,
    #[display("Failed to encode metrics")]
    Encode,
}

impl Error for ScrapeError {}

/// Encoded body of one scrape plus what happened to each index.
#[derive(Debug)]
pub struct EncodedScrape {
    pub content_type: &'static str,
    pub body: String,
    pub report: ScrapeReport,
}

/// Turns a scrape request into a fresh collection pass and its encoding.
pub struct ScrapeService {
    collector: SettingsCollector,
    date_pattern: DatePattern,
    descriptors: Arc<MetricDescriptors>,
    encoder: Box<dyn MetricsEncoder>,
    exit_on_fetch_error: bool,
    fatal: CancellationToken,
}

impl ScrapeService {
    pub fn new(
        source: Arc<dyn SettingsSource>,
        date_pattern: DatePattern,
        descriptors: MetricDescriptors,
        encoder: Box<dyn MetricsEncoder>,
    ) -> Self {
        Self {
            collector: SettingsCollector::new(source),
            date_pattern,
            descriptors: Arc::new(descriptors),
            encoder,
            exit_on_fetch_error: false,
            fatal: CancellationToken::new(),
        }
    }

    /// Wires the service to the cluster described by `args`.
    pub fn from_args(args: &ExporterArgs) -> anyhow::Result<Self> {
        let descriptors = args.descriptors().map_err(|e| anyhow!("{e:?}"))?;
        let client = SettingsClient::new(args.client_config()).map_err(|e| anyhow!("{e:?}"))?;

        Ok(Self::new(
            Arc::new(ClusterSettingsSource::new(client)),
            args.date_pattern.clone(),
            descriptors,
            create_encoder(&args.metrics_format),
        ))
    }

    /// Cancel [`Self::fatal_token`] on the first failed fetch.
    pub fn with_exit_on_fetch_error(mut self, exit: bool) -> Self {
        self.exit_on_fetch_error = exit;
        self
    }

    /// Cancelled once a fetch failure must stop the process.
    pub fn fatal_token(&self) -> CancellationToken {
        self.fatal.clone()
    }

    pub fn descriptors(&self) -> &MetricDescriptors {
        &self.descriptors
    }

    pub fn content_type(&self) -> &'static str {
        self.encoder.content_type()
    }

    /// Scrapes the indices dated today.
    pub async fn scrape(&self) -> Result<EncodedScrape, Report<ScrapeError>> {
        let date_token = self.date_pattern.today();
        self.scrape_for(&date_token).await
    }

    /// # Errors
    ///
    /// - [`ScrapeError::Collect`] if the settings could not be fetched
    /// - [`ScrapeError::Encode`] if the observations could not be encoded
    pub async fn scrape_for(&self, date_token: &str) -> Result<EncodedScrape, Report<ScrapeError>> {
        let mut observations: Vec<Observation> = Vec::new();

        let report = match self.collector.collect(date_token, &mut observations).await {
            Ok(report) => report,
            Err(report) => {
                if self.exit_on_fetch_error {
                    error!("Fetch failed and exit on fetch error is set: {report:?}");
                    self.fatal.cancel();
                }
                return Err(report.change_context(ScrapeError::Collect));
            }
        };

        let body = self
            .encoder
            .encode_scrape(&self.descriptors, &observations, current_time())
            .change_context(ScrapeError::Encode)?;

        Ok(EncodedScrape {
            content_type: self.encoder.content_type(),
            body,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use error_stack::Report;
    use futures::future::BoxFuture;
    use serde_json::json;
    use similar_asserts::assert_eq;

    use super::*;
    use crate::domain::collector::CollectError;
    use crate::domain::collector::FetchError;
    use crate::domain::collector::FetchResult;
    use crate::domain::settings::SettingsCorpus;
    use crate::infrastructure::metrics::encoders::json::JsonEncoder;

    struct StaticSource(SettingsCorpus);

    impl SettingsSource for StaticSource {
        fn fetch_settings<'a>(&'a self, _patterns: &'a [String]) -> BoxFuture<'a, FetchResult> {
            let corpus = self.0.clone();
            Box::pin(async move { Ok(corpus) })
        }
    }

    struct FailingSource;

    impl SettingsSource for FailingSource {
        fn fetch_settings<'a>(&'a self, _patterns: &'a [String]) -> BoxFuture<'a, FetchResult> {
            Box::pin(async { Err(Report::new(FetchError)) })
        }
    }

    fn corpus() -> SettingsCorpus {
        let value = json!({
            "logs-2024.05.01": {
                "settings": {"index": {"mapping": {"total_fields": {"limit": "2000"}}}},
                "defaults": {}
            },
            "logs-2024.05.01-b": {
                "settings": {},
                "defaults": {"index": {"mapping": {"total_fields": {"limit": "1000"}}}}
            }
        });
        match value {
            serde_json::Value::Object(map) => SettingsCorpus::from(map),
            _ => unreachable!(),
        }
    }

    fn service(source: Arc<dyn SettingsSource>) -> ScrapeService {
        ScrapeService::new(
            source,
            DatePattern::default(),
            MetricDescriptors::default(),
            Box::new(JsonEncoder::new()),
        )
    }

    #[tokio::test]
    async fn scrape_encodes_index_and_group_gauges() {
        let service = service(Arc::new(StaticSource(corpus())));

        let scrape = service
            .scrape_for("2024.05.01")
            .await
            .expect("scrape should succeed");

        assert_eq!(scrape.content_type, "application/x-ndjson");
        assert_eq!(scrape.body.lines().count(), 3);
        assert_eq!(scrape.report.observed_count(), 2);
        assert_eq!(scrape.report.group_sums.get("logs-"), Some(&3000.0));
    }

    #[tokio::test]
    async fn fetch_failure_does_not_cancel_by_default() {
        let service = service(Arc::new(FailingSource));

        let err = service
            .scrape_for("2024.05.01")
            .await
            .expect_err("fetch fails");

        assert!(matches!(err.current_context(), ScrapeError::Collect));
        assert!(err.contains::<CollectError>());
        assert!(!service.fatal_token().is_cancelled());
    }

    #[tokio::test]
    async fn fetch_failure_cancels_when_configured() {
        let service = service(Arc::new(FailingSource)).with_exit_on_fetch_error(true);
        let fatal = service.fatal_token();

        let _ = service.scrape_for("2024.05.01").await;

        assert!(fatal.is_cancelled());
    }
}

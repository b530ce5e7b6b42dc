use std::sync::Arc;

use poem::handler;
use poem::http::StatusCode;
use poem::web::Data;
use poem::web::Html;
use poem::Response;
use tracing::debug;
use tracing::error;

use crate::app::ScrapeError;
use crate::app::ScrapeService;

/// Where the landing page points scrapers to.
#[derive(Debug, Clone)]
pub struct MetricsLocation(pub String);

/// Runs a fresh collection pass and returns it encoded.
#[handler]
pub async fn metrics(service: Data<&Arc<ScrapeService>>) -> poem::Result<Response> {
    match service.scrape().await {
        Ok(scrape) => {
            debug!(
                observed = scrape.report.observed_count(),
                skipped = scrape.report.skipped().count(),
                "Scrape served"
            );
            Ok(Response::builder()
                .content_type(scrape.content_type)
                .body(scrape.body))
        }
        Err(report) => {
            error!("Scrape failed: {report:?}");
            let status = match report.current_context() {
                ScrapeError::Collect => StatusCode::SERVICE_UNAVAILABLE,
                ScrapeError::Encode => StatusCode::INTERNAL_SERVER_ERROR,
            };
            Err(poem::Error::from_string(
                report.current_context().to_string(),
                status,
            ))
        }
    }
}

#[handler]
pub fn healthz() -> &'static str {
    "ok"
}

#[handler]
pub fn landing_page(Data(location): Data<&MetricsLocation>) -> Html<String> {
    Html(format!(
        "<html>\
         <head><title>Index settings exporter</title></head>\
         <body>\
         <h1>Index settings exporter</h1>\
         <p><a href=\"{path}\">Metrics</a></p>\
         </body>\
         </html>",
        path = location.0
    ))
}

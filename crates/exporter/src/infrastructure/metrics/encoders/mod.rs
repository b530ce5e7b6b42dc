use core::error::Error;

use derive_more::Display;
use error_stack::Report;

use super::MetricDescriptors;
use crate::domain::observation::Observation;

pub mod influx;
pub mod json;
pub mod prometheus_text;

/// Failure turning a scrape into its wire format.
#[derive(Debug, Display)]
#[display("Failed to encode metrics as {format}")]
pub struct EncodeError {
    pub format: &'static str,
}

impl Error for EncodeError {}

pub type EncodeResult<T> = Result<T, Report<EncodeError>>;

/// Trait for encoding one scrape's observations into an exposition format
pub trait MetricsEncoder: Send + Sync {
    /// Short format name, e.g. `prometheus`.
    fn format(&self) -> &'static str;

    /// HTTP content type of the encoded body.
    fn content_type(&self) -> &'static str;

    /// Encode all observations of a scrape taken at `timestamp` (ms since epoch).
    fn encode_scrape(
        &self,
        descriptors: &MetricDescriptors,
        observations: &[Observation],
        timestamp: i64,
    ) -> EncodeResult<String>;
}

/// Factory function to create encoders based on format string
pub fn create_encoder(format: &str) -> Box<dyn MetricsEncoder> {
    match format.to_lowercase().as_str() {
        "json" => Box::new(json::JsonEncoder::new()),
        "influx" | "influxdb" => Box::new(influx::InfluxEncoder::new()),
        "prometheus" | "text" => Box::new(prometheus_text::PrometheusEncoder::new()),
        other => {
            tracing::warn!(format = other, "Unknown metrics format, using prometheus");
            Box::new(prometheus_text::PrometheusEncoder::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;

    use super::*;

    #[test]
    fn create_encoder_by_name() {
        assert_eq!(create_encoder("json").format(), "json");
        assert_eq!(create_encoder("influx").format(), "influx");
        assert_eq!(create_encoder("InfluxDB").format(), "influx");
        assert_eq!(create_encoder("prometheus").format(), "prometheus");
    }

    #[test]
    fn create_encoder_default() {
        assert_eq!(create_encoder("unknown_format").format(), "prometheus");
    }

    #[test]
    fn every_encoder_handles_an_empty_scrape() {
        let descriptors = MetricDescriptors::default();
        for format in ["json", "influx", "prometheus"] {
            let encoder = create_encoder(format);
            let body = encoder
                .encode_scrape(&descriptors, &[], 1_714_521_600_000)
                .expect("empty scrape should encode");
            assert!(!body.contains("fields_limit_total{"), "{format}: {body}");
        }
    }
}

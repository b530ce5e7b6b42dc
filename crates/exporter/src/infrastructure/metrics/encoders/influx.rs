use std::collections::BTreeMap;

use error_stack::Report;
use error_stack::ResultExt;
use influxdb_line_protocol::LineProtocolBuilder;

use super::EncodeError;
use super::EncodeResult;
use super::MetricsEncoder;
use crate::domain::observation::Observation;
use crate::infrastructure::metrics::MetricDescriptors;

const FORMAT: &str = "influx";

/// InfluxDB line protocol encoder
///
/// One line per observation: the metric name is the measurement, labels are
/// tags and the gauge value is the `value` field.
pub struct InfluxEncoder;

impl InfluxEncoder {
    pub fn new() -> Self {
        Self
    }

    /// Encode a single measurement line; `timestamp` is in nanoseconds.
    pub fn encode_line(
        &self,
        measurement: &str,
        tags: &BTreeMap<String, String>,
        value: f64,
        timestamp: i64,
    ) -> EncodeResult<String> {
        let mut builder = LineProtocolBuilder::new().measurement(measurement);

        // Line protocol cannot carry empty tag values.
        for (key, tag_value) in tags.iter().filter(|(_, v)| !v.is_empty()) {
            builder = builder.tag(key, tag_value);
        }

        let lp_built = builder
            .field("value", value)
            .timestamp(timestamp)
            .close_line()
            .build();

        String::from_utf8(lp_built).change_context(EncodeError { format: FORMAT })
    }
}

impl MetricsEncoder for InfluxEncoder {
    fn format(&self) -> &'static str {
        FORMAT
    }

    fn content_type(&self) -> &'static str {
        "text/plain; charset=utf-8"
    }

    fn encode_scrape(
        &self,
        descriptors: &MetricDescriptors,
        observations: &[Observation],
        timestamp: i64,
    ) -> EncodeResult<String> {
        let timestamp_ns = timestamp.checked_mul(1_000_000).ok_or_else(|| {
            Report::new(EncodeError { format: FORMAT })
                .attach_printable(format!("timestamp {timestamp}ms overflows nanoseconds"))
        })?;

        let mut body = String::new();
        for observation in observations {
            // Line protocol has no representation for NaN or infinity.
            if !observation.value.is_finite() {
                tracing::warn!(
                    metric = %observation.kind,
                    labels = ?observation.label_values,
                    value = observation.value,
                    "Skipping non-finite value"
                );
                continue;
            }
            let tags = descriptors.labels_of(observation.kind, &observation.label_values);
            body.push_str(&self.encode_line(
                &descriptors.fq_name(observation.kind),
                &tags,
                observation.value,
                timestamp_ns,
            )?);
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;

    use super::*;

    #[test]
    fn test_encode_line_basic() {
        let encoder = InfluxEncoder::new();
        let tags = BTreeMap::from([
            ("index".to_string(), "logs-2024.05.01".to_string()),
            ("index_group".to_string(), "logs-".to_string()),
        ]);

        let result = encoder
            .encode_line("elasticsearch_fields_limit_total", &tags, 1000.0, 1609459200000000000)
            .expect("should encode");

        assert!(result.starts_with("elasticsearch_fields_limit_total"));
        assert!(result.contains("index=logs-2024.05.01"));
        assert!(result.contains("index_group=logs-"));
        assert!(result.contains("value=1000"));
        assert!(result.contains("1609459200000000000"));
        assert!(result.ends_with('\n'));
    }

    #[test]
    fn test_encode_line_skips_empty_tags() {
        let encoder = InfluxEncoder::new();
        let tags = BTreeMap::from([("index_group".to_string(), String::new())]);

        let result = encoder
            .encode_line("m", &tags, 1.0, 1)
            .expect("should encode");

        assert!(!result.contains("index_group"));
    }

    #[test]
    fn test_encode_scrape_one_line_per_observation() {
        let observations = vec![
            Observation::fields_limit("idx-2024.05.01", "idx-", 1000.0),
            Observation::fields_group_limit("idx-", 1000.0),
        ];

        let body = InfluxEncoder::new()
            .encode_scrape(&MetricDescriptors::default(), &observations, 1_714_521_600_000)
            .expect("should encode");

        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("elasticsearch_fields_limit_total,"));
        assert!(lines[1].starts_with("elasticsearch_fields_group_limit_total,index_group=idx-"));
        assert!(lines[1].ends_with(" 1714521600000000000"));
    }

    #[test]
    fn test_encode_scrape_skips_non_finite_values() {
        let observations = vec![
            Observation::fields_limit("idx-2024.05.01", "idx-", 1e308),
            Observation::fields_limit("idx-2024.05.01-b", "idx-", 1e308),
            Observation::fields_group_limit("idx-", f64::INFINITY),
        ];

        let body = InfluxEncoder::new()
            .encode_scrape(&MetricDescriptors::default(), &observations, 1_714_521_600_000)
            .expect("should encode");

        assert_eq!(body.lines().count(), 2);
        assert!(!body.contains("elasticsearch_fields_group_limit_total"));
        assert!(!body.contains("inf"));
    }
}

use std::collections::BTreeMap;

use error_stack::ResultExt;
use serde::Serialize;

use super::EncodeError;
use super::EncodeResult;
use super::MetricsEncoder;
use crate::domain::observation::Observation;
use crate::infrastructure::metrics::MetricDescriptors;

/// JSON lines encoder for metrics
pub struct JsonEncoder;

impl JsonEncoder {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Serialize)]
struct Sample {
    measure: String,
    ts: i64,
    tag: BTreeMap<String, String>,
    field: Field,
}

#[derive(Serialize)]
struct Field {
    /// `null` for values JSON cannot carry
    value: Option<f64>,
}

impl MetricsEncoder for JsonEncoder {
    fn format(&self) -> &'static str {
        "json"
    }

    fn content_type(&self) -> &'static str {
        "application/x-ndjson"
    }

    fn encode_scrape(
        &self,
        descriptors: &MetricDescriptors,
        observations: &[Observation],
        timestamp: i64,
    ) -> EncodeResult<String> {
        let mut body = String::new();
        for observation in observations {
            let sample = Sample {
                measure: descriptors.fq_name(observation.kind),
                ts: timestamp,
                tag: descriptors.labels_of(observation.kind, &observation.label_values),
                field: Field {
                    value: Some(observation.value).filter(|v| v.is_finite()),
                },
            };
            let line = serde_json::to_string(&sample).change_context(EncodeError {
                format: self.format(),
            })?;
            body.push_str(&line);
            body.push('\n');
        }
        Ok(body)
    }
}

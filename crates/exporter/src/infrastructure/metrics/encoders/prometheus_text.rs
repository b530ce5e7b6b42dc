use error_stack::ResultExt;
use prometheus::Encoder;
use prometheus::GaugeVec;
use prometheus::Opts;
use prometheus::Registry;
use prometheus::TextEncoder;

use super::EncodeError;
use super::EncodeResult;
use super::MetricsEncoder;
use crate::domain::observation::MetricKind;
use crate::domain::observation::Observation;
use crate::infrastructure::metrics::MetricDescriptors;

const FORMAT: &str = "prometheus";

/// Prometheus text exposition encoder
///
/// Every scrape gets its own registry, so label sets that vanished from the
/// cluster disappear from the output instead of lingering.
pub struct PrometheusEncoder;

impl PrometheusEncoder {
    pub fn new() -> Self {
        Self
    }
}

fn gauge_vec(descriptors: &MetricDescriptors, kind: MetricKind) -> prometheus::Result<GaugeVec> {
    let opts = Opts::new(descriptors.fq_name(kind), descriptors.help(kind)).const_labels(
        descriptors
            .const_labels()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
    );
    let label_names: Vec<&str> = descriptors
        .label_names(kind)
        .iter()
        .map(String::as_str)
        .collect();
    GaugeVec::new(opts, &label_names)
}

impl MetricsEncoder for PrometheusEncoder {
    fn format(&self) -> &'static str {
        FORMAT
    }

    fn content_type(&self) -> &'static str {
        "text/plain; version=0.0.4; charset=utf-8"
    }

    fn encode_scrape(
        &self,
        descriptors: &MetricDescriptors,
        observations: &[Observation],
        _timestamp: i64,
    ) -> EncodeResult<String> {
        let failed = || EncodeError { format: FORMAT };

        let registry = Registry::new();
        let fields_limit = gauge_vec(descriptors, MetricKind::FieldsLimit).change_context_lazy(failed)?;
        let group_limit =
            gauge_vec(descriptors, MetricKind::FieldsGroupLimit).change_context_lazy(failed)?;
        registry
            .register(Box::new(fields_limit.clone()))
            .change_context_lazy(failed)?;
        registry
            .register(Box::new(group_limit.clone()))
            .change_context_lazy(failed)?;

        for observation in observations {
            let gauge = match observation.kind {
                MetricKind::FieldsLimit => &fields_limit,
                MetricKind::FieldsGroupLimit => &group_limit,
            };
            let values: Vec<&str> = observation
                .label_values
                .iter()
                .map(String::as_str)
                .collect();
            gauge
                .get_metric_with_label_values(&values)
                .change_context_lazy(failed)
                .attach_printable_lazy(|| format!("labels: {values:?}"))?
                .set(observation.value);
        }

        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&registry.gather(), &mut buffer)
            .change_context_lazy(failed)?;
        String::from_utf8(buffer).change_context_lazy(failed)
    }
}

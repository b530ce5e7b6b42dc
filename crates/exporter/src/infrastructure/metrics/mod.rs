use core::error::Error;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use derive_more::Display;
use error_stack::Report;

use crate::domain::observation::MetricKind;

pub mod encoders;

pub const DEFAULT_NAMESPACE: &str = "elasticsearch";

/// Invalid metric configuration, detected at startup.
#[derive(Debug, Display)]
pub enum DescriptorError {
    #[display("{kind} needs exactly {expected} label names, got {got}")]
    LabelCount {
        kind: MetricKind,
        expected: usize,
        got: usize,
    },
    #[display("Invalid metric name `{name}`")]
    InvalidMetricName { name: String },
    #[display("Invalid label name `{name}`")]
    InvalidLabelName { name: String },
    #[display("Label `{name}` is declared more than once for {kind}")]
    DuplicateLabel { kind: MetricKind, name: String },
}

impl Error for DescriptorError {}

/// Static description of the published gauges, shared by all scrapes.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricDescriptors {
    namespace: String,
    index_labels: Vec<String>,
    group_labels: Vec<String>,
    const_labels: BTreeMap<String, String>,
}

impl MetricDescriptors {
    /// # Errors
    ///
    /// - [`DescriptorError::LabelCount`] if a label list does not match the
    ///   number of values published for that gauge
    /// - [`DescriptorError::InvalidMetricName`] / [`DescriptorError::InvalidLabelName`]
    ///   for names the exposition format cannot carry
    /// - [`DescriptorError::DuplicateLabel`] if a name repeats, including
    ///   clashes with constant labels
    pub fn new(
        namespace: impl Into<String>,
        index_labels: Vec<String>,
        group_labels: Vec<String>,
        const_labels: BTreeMap<String, String>,
    ) -> Result<Self, Report<DescriptorError>> {
        let descriptors = Self {
            namespace: namespace.into(),
            index_labels,
            group_labels,
            const_labels,
        };

        for kind in MetricKind::ALL {
            let name = descriptors.fq_name(kind);
            if !is_valid_metric_name(&name) {
                return Err(Report::new(DescriptorError::InvalidMetricName { name }));
            }

            let labels = descriptors.label_names(kind);
            if labels.len() != kind.label_count() {
                return Err(Report::new(DescriptorError::LabelCount {
                    kind,
                    expected: kind.label_count(),
                    got: labels.len(),
                }));
            }

            let mut seen = BTreeSet::new();
            for name in labels.iter().chain(descriptors.const_labels.keys()) {
                if !is_valid_label_name(name) {
                    return Err(Report::new(DescriptorError::InvalidLabelName {
                        name: name.clone(),
                    }));
                }
                if !seen.insert(name.as_str()) {
                    return Err(Report::new(DescriptorError::DuplicateLabel {
                        kind,
                        name: name.clone(),
                    }));
                }
            }
        }

        Ok(descriptors)
    }

    /// `<namespace>_<kind>_total`, skipping an empty namespace.
    pub fn fq_name(&self, kind: MetricKind) -> String {
        build_fq_name(&self.namespace, &kind.to_string(), "total")
    }

    pub fn help(&self, kind: MetricKind) -> &'static str {
        kind.help()
    }

    /// Ordered label names; observation label values follow this order.
    pub fn label_names(&self, kind: MetricKind) -> &[String] {
        match kind {
            MetricKind::FieldsLimit => &self.index_labels,
            MetricKind::FieldsGroupLimit => &self.group_labels,
        }
    }

    pub fn const_labels(&self) -> &BTreeMap<String, String> {
        &self.const_labels
    }

    /// Constant labels plus the observation's own labels.
    pub fn labels_of(&self, kind: MetricKind, values: &[String]) -> BTreeMap<String, String> {
        let mut labels = self.const_labels.clone();
        labels.extend(
            self.label_names(kind)
                .iter()
                .cloned()
                .zip(values.iter().cloned()),
        );
        labels
    }
}

impl Default for MetricDescriptors {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            index_labels: vec!["index".to_string(), "index_group".to_string()],
            group_labels: vec!["index_group".to_string()],
            const_labels: BTreeMap::new(),
        }
    }
}

fn build_fq_name(namespace: &str, subsystem: &str, name: &str) -> String {
    [namespace, subsystem, name]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("_")
}

fn is_valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

fn is_valid_label_name(name: &str) -> bool {
    if name.starts_with("__") {
        return false;
    }
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Milliseconds since the Unix epoch.
pub fn current_time() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use similar_asserts::assert_eq;

    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn default_names_follow_namespace_convention() {
        let descriptors = MetricDescriptors::default();
        assert_eq!(
            descriptors.fq_name(MetricKind::FieldsLimit),
            "elasticsearch_fields_limit_total"
        );
        assert_eq!(
            descriptors.fq_name(MetricKind::FieldsGroupLimit),
            "elasticsearch_fields_group_limit_total"
        );
    }

    #[test]
    fn empty_namespace_is_skipped() {
        let descriptors = MetricDescriptors::new(
            "",
            labels(&["index", "group"]),
            labels(&["group"]),
            BTreeMap::new(),
        )
        .expect("should be valid");
        assert_eq!(descriptors.fq_name(MetricKind::FieldsLimit), "fields_limit_total");
    }

    #[test]
    fn rejects_wrong_label_count() {
        let err = MetricDescriptors::new(
            "es",
            labels(&["index"]),
            labels(&["group"]),
            BTreeMap::new(),
        )
        .expect_err("fields_limit needs two labels");
        assert_eq!(
            err.current_context().to_string(),
            "fields_limit needs exactly 2 label names, got 1"
        );
    }

    #[test]
    fn rejects_invalid_names() {
        let bad_label = MetricDescriptors::new(
            "es",
            labels(&["index", "index-group"]),
            labels(&["group"]),
            BTreeMap::new(),
        );
        assert!(matches!(
            bad_label.expect_err("dash is invalid").current_context(),
            DescriptorError::InvalidLabelName { .. }
        ));

        let bad_namespace = MetricDescriptors::new(
            "9es",
            labels(&["index", "group"]),
            labels(&["group"]),
            BTreeMap::new(),
        );
        assert!(matches!(
            bad_namespace
                .expect_err("leading digit is invalid")
                .current_context(),
            DescriptorError::InvalidMetricName { .. }
        ));
    }

    #[test]
    fn rejects_clash_with_const_labels() {
        let err = MetricDescriptors::new(
            "es",
            labels(&["index", "cluster"]),
            labels(&["group"]),
            BTreeMap::from([("cluster".to_string(), "prod".to_string())]),
        )
        .expect_err("cluster is declared twice");
        assert!(matches!(
            err.current_context(),
            DescriptorError::DuplicateLabel { .. }
        ));
    }

    #[test]
    fn labels_of_merges_const_labels() {
        let descriptors = MetricDescriptors::new(
            "es",
            labels(&["index", "group"]),
            labels(&["group"]),
            BTreeMap::from([("cluster".to_string(), "prod".to_string())]),
        )
        .expect("should be valid");

        let merged = descriptors.labels_of(
            MetricKind::FieldsLimit,
            &labels(&["logs-2024.05.01", "logs-"]),
        );
        assert_eq!(
            merged,
            BTreeMap::from([
                ("cluster".to_string(), "prod".to_string()),
                ("group".to_string(), "logs-".to_string()),
                ("index".to_string(), "logs-2024.05.01".to_string()),
            ])
        );
    }

    #[test]
    fn label_name_rules() {
        assert!(is_valid_label_name("index_group"));
        assert!(is_valid_label_name("_private"));
        assert!(!is_valid_label_name("__reserved"));
        assert!(!is_valid_label_name(""));
        assert!(!is_valid_metric_name("has space"));
        assert!(is_valid_metric_name("ns:sub_total"));
    }
}

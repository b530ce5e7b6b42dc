//! Values produced by a collection pass.

use derive_more::Display;

/// The two gauges published per scrape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
pub enum MetricKind {
    /// Field limit of one index; labels: index, group.
    #[display("fields_limit")]
    FieldsLimit,
    /// Sum of field limits over an index group; labels: group.
    #[display("fields_group_limit")]
    FieldsGroupLimit,
}

impl MetricKind {
    pub const ALL: [MetricKind; 2] = [MetricKind::FieldsLimit, MetricKind::FieldsGroupLimit];

    /// Number of label values every observation of this kind carries.
    pub fn label_count(self) -> usize {
        match self {
            MetricKind::FieldsLimit => 2,
            MetricKind::FieldsGroupLimit => 1,
        }
    }

    pub fn help(self) -> &'static str {
        match self {
            MetricKind::FieldsLimit => "Total limit of fields of each index to date",
            MetricKind::FieldsGroupLimit => "Total limit of fields of each index group to date",
        }
    }
}

/// One gauge sample with its label values in declared order.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub kind: MetricKind,
    pub value: f64,
    pub label_values: Vec<String>,
}

impl Observation {
    pub fn fields_limit(index: &str, group: &str, value: f64) -> Self {
        Self {
            kind: MetricKind::FieldsLimit,
            value,
            label_values: vec![index.to_string(), group.to_string()],
        }
    }

    pub fn fields_group_limit(group: &str, value: f64) -> Self {
        Self {
            kind: MetricKind::FieldsGroupLimit,
            value,
            label_values: vec![group.to_string()],
        }
    }
}

/// Receives observations as a pass emits them.
pub trait ObservationSink {
    fn emit(&mut self, observation: Observation);
}

impl ObservationSink for Vec<Observation> {
    fn emit(&mut self, observation: Observation) {
        self.push(observation);
    }
}

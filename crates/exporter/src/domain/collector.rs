//! One collection pass over the cluster's index settings.
//!
//! A pass fetches the settings of every index carrying today's date token,
//! extracts `index.mapping.total_fields.limit` per index and sums it per
//! index group. A failed fetch fails the pass before anything is emitted; a
//! bad document only drops its own index, which is recorded in the
//! [`ScrapeReport`].

use core::error::Error;
use std::collections::BTreeMap;
use std::sync::Arc;

use derive_more::Display;
use error_stack::Report;
use error_stack::ResultExt;
use futures::future::BoxFuture;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::dates::index_pattern;
use super::grouping::group_key;
use super::observation::Observation;
use super::observation::ObservationSink;
use super::settings::coerce;
use super::settings::resolve;
use super::settings::CoercionError;
use super::settings::SettingsCorpus;
use super::settings::SettingsNode;
use super::settings::SettingsPath;

/// Setting holding the maximum number of mapped fields of an index.
pub const FIELDS_LIMIT_SETTING: &str = "index.mapping.total_fields.limit";

/// Error reported by a [`SettingsSource`].
#[derive(Debug, Display)]
#[display("Settings source failed")]
pub struct FetchError;

impl Error for FetchError {}

pub type FetchResult = Result<SettingsCorpus, Report<FetchError>>;

/// Provides the settings documents of all indices matching some patterns.
pub trait SettingsSource: Send + Sync {
    fn fetch_settings<'a>(&'a self, patterns: &'a [String]) -> BoxFuture<'a, FetchResult>;
}

/// Pass-level failure.
#[derive(Debug, Display)]
pub enum CollectError {
    #[display("Failed to fetch settings for index pattern `{pattern}`")]
    Fetch { pattern: String },
}

impl Error for CollectError {}

/// Why an index contributed nothing to a pass.
#[derive(Debug, Clone, PartialEq, Display)]
pub enum SkipReason {
    #[display("settings document is a {kind}, not a map")]
    DocumentShape { kind: &'static str },
    #[display("field limit not found under settings or defaults")]
    PathNotFound,
    #[display("invalid field limit: {_0}")]
    Coercion(CoercionError),
}

/// What happened to one index during a pass.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexOutcome {
    Observed { group: String, value: f64 },
    Skipped { group: String, reason: SkipReason },
}

/// Summary of a completed pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeReport {
    pub date_token: String,
    pub index_pattern: String,
    pub outcomes: BTreeMap<String, IndexOutcome>,
    pub group_sums: BTreeMap<String, f64>,
}

impl ScrapeReport {
    pub fn outcome(&self, index: &str) -> Option<&IndexOutcome> {
        self.outcomes.get(index)
    }

    pub fn observed_count(&self) -> usize {
        self.outcomes
            .values()
            .filter(|outcome| matches!(outcome, IndexOutcome::Observed { .. }))
            .count()
    }

    pub fn skipped(&self) -> impl Iterator<Item = (&str, &SkipReason)> {
        self.outcomes.iter().filter_map(|(index, outcome)| match outcome {
            IndexOutcome::Skipped { reason, .. } => Some((index.as_str(), reason)),
            IndexOutcome::Observed { .. } => None,
        })
    }
}

/// Runs collection passes against a [`SettingsSource`].
pub struct SettingsCollector {
    source: Arc<dyn SettingsSource>,
    candidates: Vec<SettingsPath>,
}

impl SettingsCollector {
    pub fn new(source: Arc<dyn SettingsSource>) -> Self {
        Self {
            source,
            candidates: vec![
                SettingsPath::under("settings", FIELDS_LIMIT_SETTING),
                SettingsPath::under("defaults", FIELDS_LIMIT_SETTING),
            ],
        }
    }

    /// Paths tried for the field limit, most specific first.
    pub fn candidates(&self) -> &[SettingsPath] {
        &self.candidates
    }

    /// Runs one pass for `date_token`, emitting into `sink`.
    ///
    /// Per-index observations are emitted first, then one observation per
    /// group. Skipped indices are absent from the group sums, not counted as
    /// zero.
    ///
    /// # Errors
    ///
    /// - [`CollectError::Fetch`] if the source fails; nothing is emitted
    pub async fn collect<K>(
        &self,
        date_token: &str,
        sink: &mut K,
    ) -> Result<ScrapeReport, Report<CollectError>>
    where
        K: ObservationSink + Send,
    {
        let pattern = index_pattern(date_token);
        let patterns = [pattern.clone()];

        let corpus = self
            .source
            .fetch_settings(&patterns)
            .await
            .change_context_lazy(|| CollectError::Fetch {
                pattern: pattern.clone(),
            })?;
        debug!(pattern = %pattern, indices = corpus.len(), "Fetched index settings");

        let mut outcomes = BTreeMap::new();
        let mut group_sums: BTreeMap<String, f64> = BTreeMap::new();

        for (index, document) in corpus.iter() {
            let group = group_key(index, date_token);

            let outcome = match self.field_limit(document) {
                Ok(value) => {
                    sink.emit(Observation::fields_limit(index, &group, value));
                    *group_sums.entry(group.clone()).or_default() += value;
                    IndexOutcome::Observed { group, value }
                }
                Err(reason) => {
                    warn!(index = %index, reason = %reason, "Skipping index");
                    IndexOutcome::Skipped { group, reason }
                }
            };
            outcomes.insert(index.clone(), outcome);
        }

        for (group, sum) in &group_sums {
            sink.emit(Observation::fields_group_limit(group, *sum));
        }

        let report = ScrapeReport {
            date_token: date_token.to_string(),
            index_pattern: pattern,
            outcomes,
            group_sums,
        };

        info!(
            pattern = %report.index_pattern,
            indices = report.outcomes.len(),
            observed = report.observed_count(),
            skipped = report.skipped().count(),
            groups = report.group_sums.len(),
            "Collected index field limits"
        );

        Ok(report)
    }

    fn field_limit(&self, document: &SettingsNode) -> Result<f64, SkipReason> {
        if !document.is_map() {
            return Err(SkipReason::DocumentShape {
                kind: document.kind(),
            });
        }

        let resolved = resolve(document, &self.candidates).ok_or(SkipReason::PathNotFound)?;
        debug!(path = %resolved.path, "Resolved field limit");

        coerce(resolved.value).map_err(SkipReason::Coercion)
    }
}

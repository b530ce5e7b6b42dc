use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use error_stack::Report;
use es_client::ClientConfig;

use crate::domain::dates::DatePattern;
use crate::domain::dates::DEFAULT_DATE_PATTERN;
use crate::infrastructure::metrics::DescriptorError;
use crate::infrastructure::metrics::MetricDescriptors;

/// Cluster access and metric shape, shared by every subcommand.
#[derive(Args, Clone)]
pub struct ExporterArgs {
    #[arg(
        long,
        env = "ES_URL",
        default_value = "http://localhost:9200",
        help = "Base URL of the Elasticsearch cluster"
    )]
    pub es_url: String,

    #[arg(long, env = "ES_USERNAME", help = "Basic auth user for the cluster")]
    pub es_username: Option<String>,

    #[arg(
        long,
        env = "ES_PASSWORD",
        hide_env_values = true,
        help = "Basic auth password for the cluster"
    )]
    pub es_password: Option<String>,

    #[arg(
        long,
        env = "ES_TIMEOUT_SECS",
        default_value = "30",
        help = "Timeout of the settings request in seconds"
    )]
    pub es_timeout_secs: u64,

    #[arg(
        long,
        env = "ES_INSECURE",
        help = "Skip TLS certificate verification",
        default_value_t = false,
        action = clap::ArgAction::Set
    )]
    pub es_insecure: bool,

    #[arg(
        long,
        env = "METRICS_NAMESPACE",
        default_value = "elasticsearch",
        help = "Prefix of the published metric names"
    )]
    pub metrics_namespace: String,

    #[arg(
        long,
        env = "METRICS_FORMAT",
        default_value = "prometheus",
        help = "Metrics format, either 'prometheus' or 'influx' or 'json'"
    )]
    pub metrics_format: String,

    #[arg(
        long,
        env = "INDEX_LABELS",
        value_delimiter = ',',
        default_value = "index,index_group",
        help = "Label names of the per-index gauge: index name, then index group"
    )]
    pub index_labels: Vec<String>,

    #[arg(
        long,
        env = "INDEX_GROUP_LABELS",
        value_delimiter = ',',
        default_value = "index_group",
        help = "Label name of the per-group gauge"
    )]
    pub index_group_labels: Vec<String>,

    #[arg(
        long,
        env = "CONST_LABELS",
        value_delimiter = ',',
        value_parser = parse_label_pair,
        help = "Constant labels added to every metric, e.g. cluster=prod,region=eu"
    )]
    pub const_labels: Vec<(String, String)>,

    #[arg(
        long,
        env = "DATE_PATTERN",
        default_value = DEFAULT_DATE_PATTERN,
        value_parser = parse_date_pattern,
        help = "strftime pattern of the date suffix of rotated indices"
    )]
    pub date_pattern: DatePattern,

    #[arg(
        long,
        env = "LOG_PATH",
        value_hint = clap::ValueHint::FilePath,
        help = "Also write logs to this daily rotated file"
    )]
    pub log_path: Option<PathBuf>,
}

impl ExporterArgs {
    pub fn client_config(&self) -> ClientConfig {
        let config = ClientConfig::new(self.es_url.clone())
            .with_request_timeout(Duration::from_secs(self.es_timeout_secs))
            .with_accept_invalid_certs(self.es_insecure);

        match &self.es_username {
            Some(username) => config.with_basic_auth(username.clone(), self.es_password.clone()),
            None => config,
        }
    }

    pub fn descriptors(&self) -> Result<MetricDescriptors, Report<DescriptorError>> {
        MetricDescriptors::new(
            self.metrics_namespace.clone(),
            self.index_labels.clone(),
            self.index_group_labels.clone(),
            self.const_labels.iter().cloned().collect::<BTreeMap<_, _>>(),
        )
    }
}

#[derive(Args, Clone)]
pub struct CollectArgs {
    #[command(flatten)]
    pub exporter: ExporterArgs,
}

/// Parse a `name=value` constant label
fn parse_label_pair(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("Invalid label `{s}`, expected name=value"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("Invalid label `{s}`, name is empty"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

fn parse_date_pattern(s: &str) -> Result<DatePattern, String> {
    DatePattern::new(s).map_err(|report| report.current_context().to_string())
}

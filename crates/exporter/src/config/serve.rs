use clap::Args;

use super::exporter::ExporterArgs;

pub const HEALTH_PATH: &str = "/healthz";

#[derive(Args, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub exporter: ExporterArgs,

    #[arg(
        long,
        env = "LISTEN_ADDR",
        default_value = "0.0.0.0:9114",
        help = "Address the scrape endpoint listens on"
    )]
    pub listen_addr: String,

    #[arg(
        long,
        env = "METRICS_PATH",
        default_value = "/metrics",
        value_parser = parse_metrics_path,
        help = "HTTP path serving the metrics"
    )]
    pub metrics_path: String,

    #[arg(
        long,
        env = "EXIT_ON_FETCH_ERROR",
        help = "Stop the exporter when the cluster cannot be queried during a scrape",
        default_value_t = false,
        action = clap::ArgAction::Set
    )]
    pub exit_on_fetch_error: bool,
}

fn parse_metrics_path(s: &str) -> Result<String, String> {
    if !s.starts_with('/') {
        return Err(format!("Metrics path `{s}` must start with '/'"));
    }
    if s == "/" || s == HEALTH_PATH {
        return Err(format!("Metrics path `{s}` is reserved"));
    }
    Ok(s.to_string())
}

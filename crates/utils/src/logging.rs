//! provides logging helpers

use std::path::Path;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::filter::{self};
use tracing_subscriber::fmt::layer;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry;

use crate::LoggingError;

pub const LOG_PATH_ENV_VAR: &str = "LOG_PATH";

const DEFAULT_LOG_PREFIX: &str = "exporter.log";

fn env_filter() -> filter::EnvFilter {
    filter::EnvFilter::builder()
        .with_default_directive(filter::LevelFilter::INFO.into())
        .from_env_lossy()
}

/// Splits a log path into the rotation directory and the file name prefix.
///
/// A directory gets the default prefix; a bare file name rotates in the
/// current directory.
pub fn rotation_target(log_path: &Path) -> Result<(PathBuf, String), LoggingError> {
    if log_path.is_dir() {
        return Ok((log_path.to_path_buf(), DEFAULT_LOG_PREFIX.to_string()));
    }

    let dir = log_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let prefix = log_path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| LoggingError::NoFileName(log_path.to_path_buf()))?;

    Ok((dir.to_path_buf(), prefix.to_string()))
}

/// initiate the global tracing subscriber
///
/// Events always go to stderr. When `log_path` is set they are also written to
/// a daily rolling file; the returned guard must be held until shutdown so the
/// background writer flushes.
pub fn init(log_path: Option<&Path>) -> Result<Option<WorkerGuard>, LoggingError> {
    let stderr_layer = layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(env_filter());

    let (file_layer, guard) = match log_path {
        Some(path) => {
            let (dir, prefix) = rotation_target(path)?;
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(prefix)
                .max_log_files(3)
                .build(&dir)
                .map_err(|err| LoggingError::Appender {
                    dir: dir.clone(),
                    reason: err.to_string(),
                })?;
            let (file_writer, file_guard) = tracing_appender::non_blocking(appender);
            let file_layer = layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_target(true)
                .with_filter(env_filter());
            (Some(file_layer), Some(file_guard))
        }
        None => (None, None),
    };

    registry().with(stderr_layer).with(file_layer).init();
    Ok(guard)
}

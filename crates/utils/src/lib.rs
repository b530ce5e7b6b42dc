mod build_info;
pub mod logging;
pub mod version;

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Log path `{0}` has no file name")]
    NoFileName(PathBuf),

    #[error("Failed to create rolling log file in `{dir}`: {reason}")]
    Appender { dir: PathBuf, reason: String },
}

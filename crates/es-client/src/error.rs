//! Error types for the settings client.

use core::error::Error;

use derive_more::Display;
use error_stack::Report;

/// Result type for client operations.
pub type CommResult<T> = Result<T, Report<CommError>>;

/// Errors that can occur while talking to the cluster.
#[derive(Debug, Display)]
pub enum CommError {
    /// Network connectivity issues
    #[display("Network error: {message}")]
    Network { message: String },

    /// HTTP request/response errors
    #[display("HTTP error: {status} - {message}")]
    Http { status: u16, message: String },

    /// Deserialization errors
    #[display("Serialization error: {message}")]
    Serialization { message: String },

    /// Configuration errors
    #[display("Configuration error: {message}")]
    Configuration { message: String },
}

impl Error for CommError {}

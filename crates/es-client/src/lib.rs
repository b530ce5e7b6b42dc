//! HTTP client for reading index settings from an Elasticsearch-compatible
//! cluster.
//!
//! # Examples
//!
//! ```no_run
//! # use es_client::{ClientConfig, SettingsClient};
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::new("http://localhost:9200");
//! let client = SettingsClient::new(config).map_err(|e| e.to_string())?;
//! let settings = client
//!     .get_settings(&["*2024.05.01*".to_string()])
//!     .await
//!     .map_err(|e| e.to_string())?;
//! for (index, document) in &settings {
//!     println!("{index}: {document}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;

pub use client::RawSettings;
pub use client::SettingsClient;
pub use config::ClientConfig;
pub use error::CommError;
pub use error::CommResult;

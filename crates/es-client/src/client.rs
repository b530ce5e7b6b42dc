//! Asynchronous client for the index settings API.
//!
//! Issues `GET /<patterns>/_settings?include_defaults=true` so every index
//! document carries both the explicit `settings` subtree and the engine
//! `defaults` subtree.

use error_stack::Report;
use error_stack::ResultExt;
use reqwest::Client;
use serde_json::Map;
use serde_json::Value;
use tracing::debug;
use tracing::info;
use url::Url;

use crate::error::CommError;
use crate::error::CommResult;
use crate::ClientConfig;

/// Raw settings response: index name to its untyped settings document.
pub type RawSettings = Map<String, Value>;

const MAX_ERROR_BODY: usize = 512;

/// Settings API client
pub struct SettingsClient {
    config: ClientConfig,
    base_url: Url,
    http: Client,
}

impl SettingsClient {
    /// create client
    pub fn new(config: ClientConfig) -> CommResult<Self> {
        let base_url = Url::parse(&config.server_url).change_context(CommError::Configuration {
            message: format!("Invalid cluster URL `{}`", config.server_url),
        })?;

        let http = Client::builder()
            .timeout(config.request_timeout)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .change_context(CommError::Configuration {
                message: "Failed to create HTTP client".into(),
            })?;

        info!(server_url = %base_url, "Settings client created");

        Ok(Self {
            config,
            base_url,
            http,
        })
    }

    /// Fetches the settings of every index matching `patterns`.
    ///
    /// # Errors
    ///
    /// - [`CommError::Configuration`] if no pattern is given
    /// - [`CommError::Network`] if the request cannot be sent or the body read
    /// - [`CommError::Http`] on a non-success status
    /// - [`CommError::Serialization`] if the body is not a JSON object
    pub async fn get_settings(&self, patterns: &[String]) -> CommResult<RawSettings> {
        let url = settings_url(&self.base_url, patterns)?;
        debug!(url = %url, "Requesting index settings");

        let mut request = self.http.get(url.clone());
        if let Some(username) = &self.config.username {
            request = request.basic_auth(username, self.config.password.as_ref());
        }

        let response = request.send().await.change_context(CommError::Network {
            message: format!("Failed to send settings request to {url}"),
        })?;

        let status = response.status();
        let body = response.bytes().await.change_context(CommError::Network {
            message: "Failed to read settings response body".into(),
        })?;

        if !status.is_success() {
            return Err(Report::new(CommError::Http {
                status: status.as_u16(),
                message: truncate_body(&body),
            }));
        }

        decode_settings(&body)
    }
}

/// Builds the settings URL for the given index patterns.
///
/// Any path prefix of `base` (e.g. a reverse-proxy mount) is preserved.
pub fn settings_url(base: &Url, patterns: &[String]) -> CommResult<Url> {
    if patterns.is_empty() {
        return Err(Report::new(CommError::Configuration {
            message: "At least one index pattern is required".into(),
        }));
    }

    let mut url = base.clone();
    url.set_query(None);
    url.path_segments_mut()
        .map_err(|()| {
            Report::new(CommError::Configuration {
                message: format!("URL `{base}` cannot be used as a base"),
            })
        })?
        .pop_if_empty()
        .push(&patterns.join(","))
        .push("_settings");

    url.query_pairs_mut()
        .append_pair("include_defaults", "true")
        .append_pair("ignore_unavailable", "true")
        .append_pair("allow_no_indices", "true");

    Ok(url)
}

/// Decodes a settings response body.
pub fn decode_settings(body: &[u8]) -> CommResult<RawSettings> {
    let value: Value = serde_json::from_slice(body).change_context(CommError::Serialization {
        message: "Settings response is not valid JSON".into(),
    })?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(Report::new(CommError::Serialization {
            message: format!("Expected a JSON object of indices, got {}", kind_of(&other)),
        })),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn truncate_body(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    match text.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.into_owned(),
    }
}

//! client config

use std::time::Duration;

/// Settings client config.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// cluster base url
    pub server_url: String,
    /// basic auth user
    pub username: Option<String>,
    /// basic auth password
    pub password: Option<String>,
    /// HTTP request timeout
    pub request_timeout: Duration,
    /// skip TLS certificate verification
    pub accept_invalid_certs: bool,
}

impl ClientConfig {
    /// create new client config with default parameters.
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            username: None,
            password: None,
            request_timeout: Duration::from_secs(30),
            accept_invalid_certs: false,
        }
    }

    /// set basic auth credentials.
    pub fn with_basic_auth(mut self, username: impl Into<String>, password: Option<String>) -> Self {
        self.username = Some(username.into());
        self.password = password;
        self
    }

    /// set request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// accept self-signed or otherwise invalid certificates.
    pub fn with_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }
}

//! [`SettingsSource`] backed by the cluster's settings API.

use error_stack::ResultExt;
use es_client::SettingsClient;
use futures::future::BoxFuture;

use crate::domain::collector::FetchError;
use crate::domain::collector::FetchResult;
use crate::domain::collector::SettingsSource;
use crate::domain::settings::SettingsCorpus;

pub struct ClusterSettingsSource {
    client: SettingsClient,
}

impl ClusterSettingsSource {
    pub fn new(client: SettingsClient) -> Self {
        Self { client }
    }
}

impl SettingsSource for ClusterSettingsSource {
    fn fetch_settings<'a>(&'a self, patterns: &'a [String]) -> BoxFuture<'a, FetchResult> {
        Box::pin(async move {
            let raw = self
                .client
                .get_settings(patterns)
                .await
                .change_context(FetchError)?;
            Ok(SettingsCorpus::from(raw))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use es_client::ClientConfig;
    use es_client::CommError;

    use super::*;

    #[tokio::test]
    async fn client_errors_become_fetch_errors() {
        let client = SettingsClient::new(
            ClientConfig::new("http://127.0.0.1:1").with_request_timeout(Duration::from_secs(2)),
        )
        .map_err(|e| e.to_string())
        .expect("should create client");
        let source = ClusterSettingsSource::new(client);

        let err = source
            .fetch_settings(&["*".to_string()])
            .await
            .expect_err("nothing listens on port 1");

        assert!(err.contains::<CommError>());
    }
}

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use super::SourceError;

/// Retrieves an HTML page as text.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, url: &Url) -> Result<String, SourceError>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, SourceError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| SourceError::Client(e.to_string()))?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_page(&self, url: &Url) -> Result<String, SourceError> {
        let network = |reason: String| SourceError::Network {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| network(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(network(format!("HTTP status {}", status)));
        }

        let body = response.bytes().await.map_err(|e| network(e.to_string()))?;
        debug!(%url, bytes = body.len(), "fetched page");
        String::from_utf8(body.to_vec()).map_err(|e| SourceError::Parse {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

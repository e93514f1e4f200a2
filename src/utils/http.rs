//! HTTP client utilities.

use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

use crate::config::HttpConfig;
use crate::sources::SourceError;

/// Shared HTTP client with sensible defaults
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Arc<Client>,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, SourceError> {
        Self::from_config(&HttpConfig::default())
    }

    /// Create a client from the `[http]` configuration section
    pub fn from_config(config: &HttpConfig) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| SourceError::Unavailable(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client: Arc::new(client),
        })
    }

    /// Start a GET request
    pub fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.client.get(url)
    }

    /// GET `url` and return the body of a successful response
    ///
    /// Transport failures, timeouts and non-2xx statuses all map to
    /// [`SourceError::Unavailable`].
    pub async fn get_text(&self, url: &str) -> Result<String, SourceError> {
        self.send_text(self.get(url), url).await
    }

    /// Send a prepared request and return the body of a successful response
    pub async fn send_text(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<String, SourceError> {
        tracing::debug!("GET {}", url);

        let response = request
            .send()
            .await
            .map_err(|e| SourceError::Unavailable(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Unavailable(format!(
                "{} returned status: {}",
                url, status
            )));
        }

        response
            .text()
            .await
            .map_err(|e| SourceError::Unavailable(format!("Failed to read response: {}", e)))
    }
}

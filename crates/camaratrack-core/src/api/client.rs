//! Remote source client.
//!
//! `SourceClient` is the seam between the pipeline and the network: one call
//! for the structured JSON API and one for raw HTML pages. `HttpSourceClient`
//! is the reqwest implementation. Neither retries; a failed call is reported
//! to the caller as a `RemoteError`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::config::Config;

use super::RemoteError;

/// User agent sent with every request
const USER_AGENT: &str = concat!("camaratrack/", env!("CARGO_PKG_VERSION"));

#[async_trait]
pub trait SourceClient: Send + Sync {
    /// GET `path` on the structured API with the given query parameters.
    async fn fetch_structured(&self, path: &str, query: &[(&str, &str)])
        -> Result<Value, RemoteError>;

    /// GET an absolute page URL and return its HTML body.
    async fn fetch_document(&self, url: &str) -> Result<String, RemoteError>;
}

/// HTTP client for the Chamber's open data API and public site.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpSourceClient {
    client: Client,
    api_base_url: String,
}

impl HttpSourceClient {
    pub fn new(config: &Config) -> Result<Self, RemoteError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base_url, path.trim_start_matches('/'))
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(RemoteError::from_status(status, &body))
        }
    }
}

#[async_trait]
impl SourceClient for HttpSourceClient {
    async fn fetch_structured(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Value, RemoteError> {
        let url = self.api_url(path);
        debug!(url = %url, ?query, "GET structured");

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(query)
            .send()
            .await?;
        let response = Self::check_response(response).await?;

        let text = response.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| RemoteError::InvalidResponse(format!("{}: {}", url, e)))
    }

    async fn fetch_document(&self, url: &str) -> Result<String, RemoteError> {
        debug!(url = %url, "GET document");

        let response = self.client.get(url).send().await?;
        let response = Self::check_response(response).await?;
        Ok(response.text().await?)
    }
}

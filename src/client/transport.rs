//! HTTP transport for the Sentino API.
//!
//! [`Transport`] is the seam between the scorer and the network. The
//! production implementation, [`HttpTransport`], sends authenticated JSON
//! requests with reqwest.

use crate::error::{ClientError, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.sentino.org/api";

/// One request, one response, against the API root.
///
/// Endpoints are paths relative to the base URL, e.g. `score/text`.
pub trait Transport {
    /// Issue a GET and return the parsed JSON body.
    fn get(&self, endpoint: &str) -> impl Future<Output = Result<Value>> + Send;

    /// Issue a POST with a JSON body and return the parsed JSON body.
    fn post(&self, endpoint: &str, body: &Value) -> impl Future<Output = Result<Value>> + Send;
}

/// Connection settings for [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub base_url: String,
    pub token: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            timeout_seconds: 30,
        }
    }
}

impl From<&crate::config::ApiConfig> for TransportConfig {
    fn from(config: &crate::config::ApiConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            token: config.token.clone(),
            timeout_seconds: config.timeout_seconds,
        }
    }
}

/// reqwest-backed transport. Credentials are fixed at construction.
pub struct HttpTransport {
    config: TransportConfig,
    http_client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport with the token and timeout from `config`.
    pub fn new(config: TransportConfig) -> Result<Self> {
        let http_client = client_builder(&config)?
            .build()
            .map_err(|e| ClientError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self::from_parts(config, http_client))
    }

    pub(crate) fn from_parts(config: TransportConfig, http_client: reqwest::Client) -> Self {
        debug!("HTTP transport for {}", config.base_url);
        Self {
            config,
            http_client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    async fn send(&self, request: reqwest::RequestBuilder, url: &str) -> Result<Value> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Transport(format!(
                    "Request to {} timed out after {}s",
                    url, self.config.timeout_seconds
                ))
            } else if e.is_connect() {
                ClientError::Transport(format!("Cannot connect to Sentino API at {}", url))
            } else {
                ClientError::Transport(format!("Failed to send request: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Transport(format!("Failed to read response body: {}", e)))?;

        serde_json::from_str(&body).map_err(|e| {
            ClientError::MalformedResponse(format!("Response from {} is not JSON: {}", url, e))
        })
    }
}

impl Transport for HttpTransport {
    async fn get(&self, endpoint: &str) -> Result<Value> {
        let url = self.url(endpoint);
        debug!("GET {}", url);
        self.send(self.http_client.get(&url), &url).await
    }

    async fn post(&self, endpoint: &str, body: &Value) -> Result<Value> {
        let url = self.url(endpoint);
        debug!("POST {}", url);
        self.send(self.http_client.post(&url).json(body), &url).await
    }
}

/// Client builder with the auth header, content type and timeout applied.
pub(crate) fn client_builder(config: &TransportConfig) -> Result<reqwest::ClientBuilder> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    if let Some(ref token) = config.token {
        let mut value = HeaderValue::from_str(&format!("Token {}", token)).map_err(|_| {
            ClientError::InvalidRequest("API token contains invalid header characters".to_string())
        })?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    Ok(reqwest::Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_seconds)))
}

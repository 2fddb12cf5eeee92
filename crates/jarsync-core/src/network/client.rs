//! HTTP client shared by every catalog provider and the downloader.
//!
//! Wraps two reqwest clients built once per run:
//! - an API client with a total request timeout and JSON accept headers
//! - a download client with a connect timeout only, so large jars are not cut off
//!
//! Both send the configured user agent and accept gzip/brotli/deflate bodies.

use crate::cancel::CancellationToken;
use crate::config::{NetworkConfig, UpdaterConfig};
use crate::error::{JarsyncError, Result};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// HTTP client for catalog and download requests.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    download_client: Client,
    user_agent: String,
}

impl HttpClient {
    /// Create a client from a run configuration.
    pub fn new(config: &UpdaterConfig) -> Result<Self> {
        Self::with_timeout(&config.user_agent, config.request_timeout)
    }

    /// Create a client with an explicit user agent and request timeout.
    pub fn with_timeout(user_agent: &str, timeout: Duration) -> Result<Self> {
        let agent = HeaderValue::from_str(user_agent).map_err(|e| JarsyncError::Config {
            message: format!("invalid user agent {:?}: {}", user_agent, e),
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        // Spiget asks clients to identify themselves with this header as well.
        headers.insert("Spiget-User-Agent", agent.clone());

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(NetworkConfig::CONNECT_TIMEOUT)
            .user_agent(agent.clone())
            .default_headers(headers)
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| JarsyncError::Network {
                message: format!("Failed to create HTTP client: {}", e),
                cause: None,
            })?;

        let download_client = Client::builder()
            .connect_timeout(NetworkConfig::CONNECT_TIMEOUT)
            .user_agent(agent)
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| JarsyncError::Network {
                message: format!("Failed to create download HTTP client: {}", e),
                cause: None,
            })?;

        Ok(Self {
            client,
            download_client,
            user_agent: user_agent.to_string(),
        })
    }

    /// Get a reference to the underlying API client.
    pub fn inner(&self) -> &Client {
        &self.client
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// GET a catalog URL and decode its JSON body.
    ///
    /// A non-success status yields `Ok(None)`: the catalog simply does not
    /// know the resource. Transport failures and malformed bodies are errors.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<Option<T>> {
        let response = cancel
            .guard(async {
                self.client.get(url).send().await.map_err(|e| JarsyncError::Network {
                    message: format!("GET {} failed: {}", url, e),
                    cause: std::error::Error::source(&e).map(|s| s.to_string()),
                })
            })
            .await?;

        let status = response.status();
        if !status.is_success() {
            debug!("GET {} returned {}", url, status);
            return Ok(None);
        }

        let body = cancel
            .guard(async { response.bytes().await.map_err(JarsyncError::from) })
            .await?;

        serde_json::from_slice(&body)
            .map(Some)
            .map_err(|e| JarsyncError::Json {
                message: format!("Failed to parse response from {}: {}", url, e),
                source: Some(e),
            })
    }

    /// GET a file URL for streaming. The caller inspects the status.
    pub async fn get_download(&self, url: &str, cancel: &CancellationToken) -> Result<Response> {
        cancel
            .guard(async {
                self.download_client
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| JarsyncError::Network {
                        message: format!("GET {} failed: {}", url, e),
                        cause: std::error::Error::source(&e).map(|s| s.to_string()),
                    })
            })
            .await
    }
}

/// Extract the host from a URL, if it parses.
pub fn extract_domain(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_ascii_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Payload {
        id: u32,
    }

    fn client() -> HttpClient {
        HttpClient::with_timeout("Jarsync-Test/1.0", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_extract_domain() {
        assert_eq!(
            extract_domain("https://Modrinth.com/plugin/luckperms").as_deref(),
            Some("modrinth.com")
        );
        assert_eq!(
            extract_domain("https://www.spigotmc.org/resources/x.1/").as_deref(),
            Some("www.spigotmc.org")
        );
        assert_eq!(extract_domain("invalid-url"), None);
    }

    #[test]
    fn test_rejects_invalid_user_agent() {
        let result = HttpClient::with_timeout("bad\nagent", Duration::from_secs(1));
        assert!(matches!(result, Err(JarsyncError::Config { .. })));
    }

    #[tokio::test]
    async fn test_get_json_sends_headers() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/item")
            .match_header("user-agent", "Jarsync-Test/1.0")
            .match_header("spiget-user-agent", "Jarsync-Test/1.0")
            .match_header("accept", "application/json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": 42}"#)
            .create_async()
            .await;

        let payload: Option<Payload> = client()
            .get_json(&format!("{}/item", server.url()), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(payload.unwrap().id, 42);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_json_not_found_is_none() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/missing")
            .with_status(404)
            .create_async()
            .await;

        let payload: Option<Payload> = client()
            .get_json(&format!("{}/missing", server.url()), &CancellationToken::new())
            .await
            .unwrap();
        assert!(payload.is_none());
    }

    #[tokio::test]
    async fn test_get_json_malformed_body() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("GET", "/bad")
            .with_status(200)
            .with_body("<html>")
            .create_async()
            .await;

        let result: Result<Option<Payload>> = client()
            .get_json(&format!("{}/bad", server.url()), &CancellationToken::new())
            .await;
        assert!(matches!(result, Err(JarsyncError::Json { .. })));
    }

    #[tokio::test]
    async fn test_get_json_cancelled() {
        let token = CancellationToken::new();
        token.cancel();
        let result: Result<Option<Payload>> = client()
            .get_json("http://127.0.0.1:9/never", &token)
            .await;
        assert!(matches!(result, Err(JarsyncError::Cancelled)));
    }
}

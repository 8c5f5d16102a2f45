//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building one pooled HTTP client with a browser-like header profile
//! - GET requests to fetch page content
//! - Error classification
//!
//! There are no retries; a failed fetch is reported to the caller once.

use crate::config::FetchConfig;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// Network failure of a single page fetch
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Request timeout: {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Failed to read body of {url}: {message}")]
    Body { url: String, message: String },

    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },
}

impl FetchError {
    fn classify(url: &str, error: reqwest::Error) -> Self {
        let url = url.to_string();
        if error.is_timeout() {
            Self::Timeout { url }
        } else if error.is_connect() {
            Self::Connect {
                url,
                message: error.to_string(),
            }
        } else {
            Self::Request {
                url,
                message: error.to_string(),
            }
        }
    }
}

/// Builds an HTTP client with the configured header profile and timeouts
///
/// # Example
///
/// ```no_run
/// use gongmo::config::FetchConfig;
/// use gongmo::crawler::build_http_client;
///
/// let client = build_http_client(&FetchConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    if let Ok(value) = HeaderValue::from_str(&config.accept) {
        headers.insert(ACCEPT, value);
    }
    if let Ok(value) = HeaderValue::from_str(&config.accept_language) {
        headers.insert(ACCEPT_LANGUAGE, value);
    }

    Client::builder()
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Pooled HTTP client shared by every fetch of one crawl run
#[derive(Debug, Clone)]
pub struct FetchClient {
    client: Client,
}

impl FetchClient {
    pub fn new(config: &FetchConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }

    /// GETs `url` and returns the decoded body
    ///
    /// Any non-2xx status is an error; redirects are followed by the client.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        tracing::debug!("GET {}", url);

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                let error = FetchError::classify(url, e);
                tracing::warn!("{}", error);
                return Err(error);
            }
        };

        let status = response.status();
        if !status.is_success() {
            let error = FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            };
            tracing::warn!("{}", error);
            return Err(error);
        }

        match response.text().await {
            Ok(body) => {
                tracing::debug!("Fetched {} ({} bytes)", url, body.len());
                Ok(body)
            }
            Err(e) => {
                let error = if e.is_timeout() {
                    FetchError::Timeout {
                        url: url.to_string(),
                    }
                } else {
                    FetchError::Body {
                        url: url.to_string(),
                        message: e.to_string(),
                    }
                };
                tracing::warn!("{}", error);
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&FetchConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_fetch_client_from_default_config() {
        let client = FetchClient::new(&FetchConfig::default()).unwrap();
        assert!(format!("{:?}", client).contains("FetchClient"));
    }

    #[test]
    fn test_error_messages() {
        let error = FetchError::Status {
            url: "https://www.wevity.com/".to_string(),
            status: 503,
        };
        assert_eq!(error.to_string(), "HTTP 503 for https://www.wevity.com/");

        let error = FetchError::Timeout {
            url: "https://www.allforyoung.com/posts/contest?page=2".to_string(),
        };
        assert!(error.to_string().starts_with("Request timeout"));
    }

    #[tokio::test]
    async fn test_connection_refused_is_classified() {
        let config = FetchConfig {
            connect_timeout_secs: 1,
            timeout_secs: 2,
            ..FetchConfig::default()
        };
        let client = FetchClient::new(&config).unwrap();

        // Nothing listens on the discard port
        let result = client.fetch("http://127.0.0.1:9/").await;
        assert!(matches!(
            result,
            Err(FetchError::Connect { .. })
                | Err(FetchError::Timeout { .. })
                | Err(FetchError::Request { .. })
        ));
    }
}

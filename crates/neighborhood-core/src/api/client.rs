//! API client for the Smart Neighborhood backend.
//!
//! This module provides the `ApiClient` struct with generic JSON helpers
//! over the REST API, and the live `Network` used by the offline cache.

use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{header, Client, RequestBuilder, Url};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::offline::{FetchError, Network, Request, Response};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Backend base URL when neither config nor environment names one.
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// API client for the neighborhood backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl ApiClient {
    /// Create a new API client rooted at `base_url`.
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        // A trailing slash makes relative endpoints extend the path
        // instead of replacing its last segment.
        let mut base = base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url =
            Url::parse(&base).with_context(|| format!("Invalid API URL: {}", base_url))?;

        Ok(Self {
            client,
            base_url,
            token: None,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Set the token sent as `Authorization: Token <token>`.
    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    /// Create a new ApiClient with the given token, sharing the connection pool.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: Some(token),
        }
    }

    /// Resolve an endpoint such as `/residents` or `residents/3` against the
    /// base URL.
    pub fn endpoint_url(&self, endpoint: &str) -> Result<Url> {
        self.base_url
            .join(endpoint.trim_start_matches('/'))
            .with_context(|| format!("Invalid endpoint: {}", endpoint))
    }

    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        if let Some(ref token) = self.token {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Token {}", token))?,
            );
        }
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(response: reqwest::Response) -> Result<Option<reqwest::Response>> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    /// Send a request built by `build`, retrying with exponential backoff
    /// while rate limited, and parse the JSON body. An empty body parses as
    /// JSON `null`.
    async fn execute<T, F>(&self, method: &str, url: &Url, build: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: Fn() -> RequestBuilder,
    {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = build()
                .headers(self.auth_headers()?)
                .send()
                .await
                .map_err(|source| ApiError::Unreachable {
                    url: url.to_string(),
                    source,
                })
                .with_context(|| format!("{} request failed", method))?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => {
                    let text = response
                        .text()
                        .await
                        .with_context(|| format!("Failed to read response from {}", url))?;
                    debug!(method, url = %url, bytes = text.len(), "API response");
                    let body = if text.trim().is_empty() { "null" } else { text.as_str() };
                    return serde_json::from_str(body)
                        .with_context(|| format!("Failed to parse JSON response from {}", url));
                }
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited { retries: MAX_RATE_LIMIT_RETRIES }.into());
                    }
                    warn!(url = %url, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2;
                }
            }
        }
    }

    // ===== JSON helpers =====

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = self.endpoint_url(endpoint)?;
        self.execute("GET", &url, || self.client.get(url.clone())).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, endpoint: &str, body: &B) -> Result<T> {
        let url = self.endpoint_url(endpoint)?;
        self.execute("POST", &url, || self.client.post(url.clone()).json(body))
            .await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize>(&self, endpoint: &str, body: &B) -> Result<T> {
        let url = self.endpoint_url(endpoint)?;
        self.execute("PUT", &url, || self.client.put(url.clone()).json(body))
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let url = self.endpoint_url(endpoint)?;
        self.execute("DELETE", &url, || self.client.delete(url.clone()))
            .await
    }

    /// Raw fetch of an absolute URL, without API headers or retries.
    async fn fetch_raw(&self, request: &Request) -> Result<Response, FetchError> {
        let response = self
            .client
            .request(request.method.clone(), request.url.clone())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                } else {
                    FetchError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        let url = response.url().to_string();
        let headers: BTreeMap<String, String> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Response {
            url,
            status,
            headers,
            body: body.to_vec(),
        })
    }
}

impl Network for ApiClient {
    fn fetch(&self, request: &Request) -> impl std::future::Future<Output = Result<Response, FetchError>> + Send {
        self.fetch_raw(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url_keeps_base_path() {
        let client = ApiClient::new(DEFAULT_API_URL).unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:8000/api/");
        assert_eq!(
            client.endpoint_url("/residents").unwrap().as_str(),
            "http://localhost:8000/api/residents"
        );
        assert_eq!(
            client.endpoint_url("residents/3/").unwrap().as_str(),
            "http://localhost:8000/api/residents/3/"
        );
    }

    #[test]
    fn test_base_url_with_trailing_slash() {
        let client = ApiClient::new("https://rt05.example.org/api/v1/").unwrap();
        assert_eq!(
            client.endpoint_url("announcements").unwrap().as_str(),
            "https://rt05.example.org/api/v1/announcements"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(ApiClient::new("not a url").is_err());
    }

    #[test]
    fn test_token_header() {
        let client = ApiClient::new(DEFAULT_API_URL).unwrap();
        let headers = client.auth_headers().unwrap();
        assert!(headers.get(header::AUTHORIZATION).is_none());

        let authed = client.with_token("abc123".to_string());
        let headers = authed.auth_headers().unwrap();
        assert_eq!(headers.get(header::AUTHORIZATION).unwrap(), "Token abc123");
        assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "application/json");
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_typed() {
        // Nothing listens on the discard port
        let client = ApiClient::new("http://127.0.0.1:9/api").unwrap();
        let err = client.get::<serde_json::Value>("residents").await.unwrap_err();
        let api_error = err.downcast_ref::<ApiError>().unwrap();
        assert!(api_error.is_unreachable());
        assert!(err.to_string().contains("GET request failed"));
    }

    #[test]
    fn test_token_with_newline_rejected() {
        let mut client = ApiClient::new(DEFAULT_API_URL).unwrap();
        client.set_token("bad\ntoken".to_string());
        assert!(client.auth_headers().is_err());
    }
}

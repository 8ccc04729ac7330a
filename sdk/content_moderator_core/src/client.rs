//! HTTP client for the Azure Content Moderator service.
//!
//! This module provides [`ModeratorClient`], the entry point every endpoint
//! crate builds on. The client handles authentication, HTTP transport,
//! endpoint management, and retry on transient errors.
//!
//! # Examples
//!
//! ## Using an explicit endpoint
//! ```rust,no_run
//! use content_moderator_core::client::ModeratorClient;
//! use content_moderator_core::auth::ModeratorCredential;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ModeratorClient::builder()
//!     .endpoint("https://westus.api.cognitive.microsoft.com")
//!     .credential(ModeratorCredential::new("your-subscription-key"))
//!     .build()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Using a region shorthand and environment credentials
//! ```rust,no_run
//! use content_moderator_core::client::ModeratorClient;
//! use content_moderator_core::auth::ModeratorCredential;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ModeratorClient::builder()
//!     .region("westeurope")
//!     .credential(ModeratorCredential::from_env()?)
//!     .build()?;
//! # Ok(())
//! # }
//! ```

use crate::auth::ModeratorCredential;
use crate::error::{ModeratorError, ModeratorResult};
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client as HttpClient;
use url::Url;

use std::time::Duration;

/// Header carrying the subscription key on every request.
pub const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

/// Environment variable holding the service endpoint URL.
pub const ENDPOINT_ENV: &str = "CONTENT_MODERATOR_ENDPOINT";

/// Default connection timeout (10 seconds).
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default read/response timeout (60 seconds).
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(60);

/// Determines if an HTTP status code represents a retriable error.
///
/// Retriable errors are transient server-side issues that may succeed on retry:
/// - 429 Too Many Requests (rate limiting)
/// - 500 Internal Server Error
/// - 502 Bad Gateway
/// - 503 Service Unavailable
/// - 504 Gateway Timeout
#[inline]
pub fn is_retriable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Configuration for automatic retry behavior on transient errors.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts (not counting the initial request).
    pub max_retries: u32,
    /// Initial backoff duration before the first retry.
    /// Subsequent retries use exponential backoff (2^attempt * initial_backoff).
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(500),
        }
    }
}

/// The base client for interacting with the Content Moderator API.
///
/// Used by the endpoint crates (`content_moderator_moderation`,
/// `content_moderator_lists`) to make API calls. The client is cheaply
/// cloneable and can be shared across threads.
#[derive(Debug, Clone)]
pub struct ModeratorClient {
    pub(crate) http: HttpClient,
    pub(crate) endpoint: Url,
    pub(crate) credential: ModeratorCredential,
    pub(crate) retry_policy: RetryPolicy,
}

/// Builder for constructing a [`ModeratorClient`].
///
/// Use [`ModeratorClient::builder()`] to create a new builder.
#[derive(Debug, Default)]
pub struct ModeratorClientBuilder {
    endpoint: Option<String>,
    credential: Option<ModeratorCredential>,
    http_client: Option<HttpClient>,
    connect_timeout: Option<Duration>,
    read_timeout: Option<Duration>,
    retry_policy: Option<RetryPolicy>,
}

impl ModeratorClient {
    /// Create a new builder for configuring a `ModeratorClient`.
    pub fn builder() -> ModeratorClientBuilder {
        ModeratorClientBuilder::default()
    }

    /// Get the base endpoint URL.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Get the retry policy configuration.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    /// Build a full URL for an API path.
    ///
    /// # Errors
    ///
    /// Returns an error if the path cannot be joined to the endpoint URL.
    pub fn url(&self, path: &str) -> ModeratorResult<Url> {
        self.endpoint
            .join(path)
            .map_err(|e| ModeratorError::invalid_endpoint_with_source("failed to construct URL", e))
    }

    /// Send a GET request to the API with automatic retry on transient errors.
    pub async fn get(&self, path: &str) -> ModeratorResult<reqwest::Response> {
        let url = self.url(path)?;
        let key = self.credential.resolve();
        self.send_with_retry(|| {
            self.http
                .get(url.clone())
                .header(SUBSCRIPTION_KEY_HEADER, key.as_str())
        })
        .await
    }

    /// Send a POST request with a JSON body, retrying transient errors.
    pub async fn post<T: serde::Serialize>(
        &self,
        path: &str,
        body: &T,
    ) -> ModeratorResult<reqwest::Response> {
        let url = self.url(path)?;
        let key = self.credential.resolve();
        self.send_with_retry(|| {
            self.http
                .post(url.clone())
                .header(SUBSCRIPTION_KEY_HEADER, key.as_str())
                .json(body)
        })
        .await
    }

    /// Send a POST request with a `text/plain` body, retrying transient errors.
    ///
    /// Used by the text screening endpoint, which takes the raw text as the
    /// request body rather than a JSON document.
    pub async fn post_text(&self, path: &str, text: &str) -> ModeratorResult<reqwest::Response> {
        let url = self.url(path)?;
        let key = self.credential.resolve();
        self.send_with_retry(|| {
            self.http
                .post(url.clone())
                .header(SUBSCRIPTION_KEY_HEADER, key.as_str())
                .header(CONTENT_TYPE, "text/plain")
                .body(text.to_string())
        })
        .await
    }

    /// Send a POST request with a raw binary body, retrying transient errors.
    ///
    /// Used by the image endpoints when submitting image content directly
    /// instead of a URL reference.
    pub async fn post_bytes(
        &self,
        path: &str,
        content_type: &str,
        body: Bytes,
    ) -> ModeratorResult<reqwest::Response> {
        let url = self.url(path)?;
        let key = self.credential.resolve();
        self.send_with_retry(|| {
            self.http
                .post(url.clone())
                .header(SUBSCRIPTION_KEY_HEADER, key.as_str())
                .header(CONTENT_TYPE, content_type.to_string())
                .body(body.clone())
        })
        .await
    }

    /// Send a PUT request with a JSON body, retrying transient errors.
    pub async fn put<T: serde::Serialize>(
        &self,
        path: &str,
        body: &T,
    ) -> ModeratorResult<reqwest::Response> {
        let url = self.url(path)?;
        let key = self.credential.resolve();
        self.send_with_retry(|| {
            self.http
                .put(url.clone())
                .header(SUBSCRIPTION_KEY_HEADER, key.as_str())
                .json(body)
        })
        .await
    }

    /// Send a DELETE request, retrying transient errors.
    pub async fn delete(&self, path: &str) -> ModeratorResult<reqwest::Response> {
        let url = self.url(path)?;
        let key = self.credential.resolve();
        self.send_with_retry(|| {
            self.http
                .delete(url.clone())
                .header(SUBSCRIPTION_KEY_HEADER, key.as_str())
        })
        .await
    }

    /// Retry loop shared by all verbs.
    ///
    /// Retries retriable HTTP statuses (429, 500, 502, 503, 504) with
    /// exponential backoff and ±25% jitter. Non-retriable statuses and the
    /// final attempt surface as errors via [`Self::error_from_response`].
    async fn send_with_retry<F>(&self, build: F) -> ModeratorResult<reqwest::Response>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        for attempt in 0..=self.retry_policy.max_retries {
            let response = build().send().await?;
            let status = response.status().as_u16();

            if response.status().is_success() {
                return Ok(response);
            }

            if !is_retriable_status(status) || attempt == self.retry_policy.max_retries {
                return Self::error_from_response(response).await;
            }

            let base_backoff = self.retry_policy.initial_backoff * 2_u32.pow(attempt);
            let jitter = 0.75 + fastrand::f64() * 0.5; // 0.75 to 1.25
            let backoff = base_backoff.mul_f64(jitter);
            tracing::warn!(status, attempt, ?backoff, "transient error, retrying");
            tokio::time::sleep(backoff).await;
        }

        // The loop always returns on the last attempt.
        unreachable!("retry loop should return before reaching here")
    }

    /// Maximum length for error messages to prevent sensitive data leaks.
    const MAX_ERROR_MESSAGE_LEN: usize = 1000;

    /// Redact subscription-key values from an error message.
    ///
    /// Some proxies echo request headers back in error bodies; the key must
    /// never reach logs via `Display`.
    pub(crate) fn sanitize_error_message(msg: &str) -> String {
        let mut result = msg.to_string();

        let mut search_start = 0;
        while let Some(relative_pos) = result[search_start..].find(SUBSCRIPTION_KEY_HEADER) {
            let header_end = search_start + relative_pos + SUBSCRIPTION_KEY_HEADER.len();

            // Skip separators between the header name and the value.
            let value_start = header_end
                + result[header_end..]
                    .find(|c: char| !matches!(c, ':' | '=' | ' ' | '"' | '\''))
                    .unwrap_or(result.len() - header_end);

            if value_start >= result.len() {
                break;
            }

            let value_end = result[value_start..]
                .find(|c: char| c.is_whitespace() || c == '"' || c == '\'' || c == ',')
                .map(|pos| value_start + pos)
                .unwrap_or(result.len());

            if value_end > value_start {
                result.replace_range(value_start..value_end, "[REDACTED]");
                search_start = value_start + "[REDACTED]".len();
            } else {
                search_start = value_start;
            }
        }

        result
    }

    /// Truncate a message if it exceeds the maximum length.
    /// Also redacts sensitive data before truncating.
    pub(crate) fn truncate_message(msg: &str) -> String {
        let sanitized = Self::sanitize_error_message(msg);

        if sanitized.len() > Self::MAX_ERROR_MESSAGE_LEN {
            // Cut at a char boundary; the limit may fall inside a
            // multibyte character.
            let mut end = Self::MAX_ERROR_MESSAGE_LEN;
            while !sanitized.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated)", &sanitized[..end])
        } else {
            sanitized
        }
    }

    /// Convert a non-success response into an error.
    async fn error_from_response(response: reqwest::Response) -> ModeratorResult<reqwest::Response> {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        if let Some((code, message)) = parse_api_error(&body) {
            return Err(ModeratorError::Api {
                code,
                message: Self::truncate_message(&message),
            });
        }

        Err(ModeratorError::http(status, Self::truncate_message(&body)))
    }
}

/// Extract an error code and message from a Content Moderator error body.
///
/// The service is not consistent about its error envelope; the shapes seen
/// in practice are:
/// - `{"error": {"code": ..., "message": ...}}` (common Azure shape)
/// - `{"Error": {"Code": ..., "Message": ...}}` (moderate endpoints)
/// - `{"Errors": [{"Title": ..., "Message": ...}]}` (list management)
/// - `{"statusCode": ..., "message": ...}` (API management gateway)
pub(crate) fn parse_api_error(body: &str) -> Option<(String, String)> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;

    for key in ["error", "Error"] {
        if let Some(err) = value.get(key) {
            let code = err
                .get("code")
                .or_else(|| err.get("Code"))
                .and_then(|c| c.as_str())
                .unwrap_or("unknown")
                .to_string();
            let message = err
                .get("message")
                .or_else(|| err.get("Message"))
                .and_then(|m| m.as_str())
                .unwrap_or(body)
                .to_string();
            return Some((code, message));
        }
    }

    if let Some(first) = value.get("Errors").and_then(|e| e.as_array()).and_then(|a| a.first()) {
        let code = first
            .get("Title")
            .and_then(|t| t.as_str())
            .unwrap_or("unknown")
            .to_string();
        let message = first
            .get("Message")
            .and_then(|m| m.as_str())
            .unwrap_or(body)
            .to_string();
        return Some((code, message));
    }

    if let (Some(status), Some(message)) = (
        value.get("statusCode").and_then(|s| s.as_i64()),
        value.get("message").and_then(|m| m.as_str()),
    ) {
        return Some((status.to_string(), message.to_string()));
    }

    None
}

impl ModeratorClientBuilder {
    /// Set the Content Moderator endpoint URL.
    ///
    /// This should be in the format:
    /// `https://<region>.api.cognitive.microsoft.com` or the custom
    /// subdomain of your resource.
    ///
    /// If not set, the builder will check the `CONTENT_MODERATOR_ENDPOINT`
    /// environment variable.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the endpoint from an Azure region name (e.g. `"westus"`).
    ///
    /// Shorthand for `endpoint("https://{region}.api.cognitive.microsoft.com")`.
    pub fn region(mut self, region: impl AsRef<str>) -> Self {
        self.endpoint = Some(format!(
            "https://{}.api.cognitive.microsoft.com",
            region.as_ref()
        ));
        self
    }

    /// Set the credential to use for authentication.
    ///
    /// If not set, the builder will use [`ModeratorCredential::from_env()`],
    /// which reads `CONTENT_MODERATOR_SUBSCRIPTION_KEY`.
    pub fn credential(mut self, credential: ModeratorCredential) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Set a custom HTTP client.
    ///
    /// **Note:** If you provide a custom HTTP client, any timeout
    /// configuration via the builder will be ignored.
    pub fn http_client(mut self, client: HttpClient) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Set the connection timeout.
    ///
    /// **Note:** This setting is ignored if a custom HTTP client is provided
    /// via [`http_client`](Self::http_client).
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the read timeout.
    ///
    /// This covers the entire request/response cycle including reading the
    /// body.
    ///
    /// **Note:** This setting is ignored if a custom HTTP client is provided
    /// via [`http_client`](Self::http_client).
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    /// Set the retry policy for transient errors.
    ///
    /// Defaults to 3 retries with 500ms initial backoff.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    /// Build the `ModeratorClient`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No endpoint is provided and `CONTENT_MODERATOR_ENDPOINT` is not set
    /// - The endpoint URL is invalid
    /// - No credential is provided and `CONTENT_MODERATOR_SUBSCRIPTION_KEY`
    ///   is not set
    pub fn build(self) -> ModeratorResult<ModeratorClient> {
        let http = match self.http_client {
            Some(client) => client,
            None => {
                let connect_timeout = self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT);
                let read_timeout = self.read_timeout.unwrap_or(DEFAULT_READ_TIMEOUT);

                reqwest::Client::builder()
                    .connect_timeout(connect_timeout)
                    .timeout(read_timeout)
                    .build()
                    .map_err(ModeratorError::Request)?
            }
        };

        let endpoint_str = self
            .endpoint
            .or_else(|| std::env::var(ENDPOINT_ENV).ok())
            .ok_or_else(|| {
                ModeratorError::MissingConfig(format!(
                    "endpoint is required. Set it via builder or the {ENDPOINT_ENV} env var."
                ))
            })?;

        let endpoint = Url::parse(&endpoint_str)
            .map_err(|e| ModeratorError::invalid_endpoint_with_source("invalid endpoint URL", e))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ModeratorError::invalid_endpoint(
                "endpoint must be an http(s) URL",
            ));
        }

        let credential = self
            .credential
            .map(Ok)
            .unwrap_or_else(ModeratorCredential::from_env)?;

        Ok(ModeratorClient {
            http,
            endpoint,
            credential,
            retry_policy: self.retry_policy.unwrap_or_default(),
        })
    }
}

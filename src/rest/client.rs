//! Kleinanzeigen REST API client implementation.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, ORIGIN, USER_AGENT};
use reqwest_middleware::ClientBuilder;
use reqwest_tracing::TracingMiddleware;
use serde_json::Value;

use crate::auth::ApiKey;
use crate::config::{ClientConfig, RateLimitSettings};
use crate::error::KleinanzeigenError;
use crate::rate_limit::RateLimiter;
use crate::rest::executor::{RequestExecutor, RetryPolicy};

/// Header carrying the API key.
const API_KEY_HEADER: &str = "ads_key";
/// Origin the API expects from its clients.
const ORIGIN_VALUE: &str = "https://kleinanzeigen-agent.de";

/// The Kleinanzeigen REST API client.
///
/// Every operation validates its input, goes through the shared rate limiter
/// and retry loop, normalizes the payload and returns an
/// [`Envelope`](crate::types::Envelope). Clones share the connection pool and
/// the rate limiter.
///
/// # Example
///
/// ```rust,no_run
/// use kleinanzeigen_api_client::rest::KleinanzeigenClient;
/// use kleinanzeigen_api_client::types::SearchParams;
///
/// #[tokio::main]
/// async fn main() {
///     let client = KleinanzeigenClient::builder().api_key("my-key").build();
///
///     let params = SearchParams::new().query("fahrrad").location("Berlin");
///     let result = client.search_listings(&params).await;
///     for listing in result.data().into_iter().flatten() {
///         println!("{} {} {}", listing.title, listing.price, listing.url);
///     }
/// }
/// ```
#[derive(Clone)]
pub struct KleinanzeigenClient {
    executor: RequestExecutor,
    base_url: String,
    max_pages: u32,
    max_results_per_page: u32,
}

impl KleinanzeigenClient {
    /// Create a client with default settings.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a new client builder.
    pub fn builder() -> KleinanzeigenClientBuilder {
        KleinanzeigenClientBuilder::new()
    }

    /// Create a client from a complete configuration.
    pub fn from_config(config: ClientConfig) -> Self {
        KleinanzeigenClientBuilder::from_config(config).build()
    }

    /// Create a client configured from `KLEINANZEIGEN_*` environment variables.
    pub fn from_env() -> Result<Self, KleinanzeigenError> {
        ClientConfig::from_env().map(Self::from_config)
    }

    /// The API base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Upper bound for a search's page count.
    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }

    /// Search limit used when a search names no page count.
    pub fn max_results_per_page(&self) -> u32 {
        self.max_results_per_page
    }

    /// The rate limiter every request of this client goes through.
    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        self.executor.rate_limiter()
    }

    /// Make a GET request and return the success-checked JSON payload.
    pub(crate) async fn get_json(&self, endpoint: &str) -> Result<Value, KleinanzeigenError> {
        let url = format!("{}{}", self.base_url, endpoint);
        self.fetch_json(&url).await
    }

    /// Make a GET request with query parameters.
    pub(crate) async fn get_json_with_params<Q>(
        &self,
        endpoint: &str,
        params: &Q,
    ) -> Result<Value, KleinanzeigenError>
    where
        Q: serde::Serialize + ?Sized,
    {
        let query_string = serde_urlencoded::to_string(params)
            .map_err(|e| KleinanzeigenError::InvalidResponse(e.to_string()))?;
        let url = if query_string.is_empty() {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}{}?{}", self.base_url, endpoint, query_string)
        };
        self.fetch_json(&url).await
    }

    /// Make a GET request and return the raw body.
    pub(crate) async fn get_text(&self, endpoint: &str) -> Result<String, KleinanzeigenError> {
        let url = format!("{}{}", self.base_url, endpoint);
        self.executor.execute(Method::GET, &url).await
    }

    async fn fetch_json(&self, url: &str) -> Result<Value, KleinanzeigenError> {
        tracing::debug!("GET {}", url);
        let body = self.executor.execute(Method::GET, url).await?;
        parse_payload(&body)
    }
}

/// Parse a response body and check its top-level `success` flag.
pub(crate) fn parse_payload(body: &str) -> Result<Value, KleinanzeigenError> {
    let payload: Value = serde_json::from_str(body).map_err(|e| {
        KleinanzeigenError::InvalidResponse(format!("Failed to parse response: {}", e))
    })?;

    match payload.get("success") {
        Some(Value::Bool(true)) => Ok(payload),
        Some(Value::Bool(false)) => {
            let message = ["message", "error"]
                .into_iter()
                .filter_map(|key| payload.get(key).and_then(Value::as_str))
                .find(|m| !m.is_empty())
                .unwrap_or("no details given");
            Err(KleinanzeigenError::Unsuccessful(message.to_string()))
        }
        _ => Err(KleinanzeigenError::InvalidResponse(
            "Response missing 'success' field".to_string(),
        )),
    }
}

impl Default for KleinanzeigenClient {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for KleinanzeigenClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KleinanzeigenClient")
            .field("base_url", &self.base_url)
            .field("max_pages", &self.max_pages)
            .field("executor", &self.executor)
            .finish()
    }
}

/// Builder for [`KleinanzeigenClient`].
pub struct KleinanzeigenClientBuilder {
    config: ClientConfig,
    rate_limiter: Option<Arc<RateLimiter>>,
    user_agent: Option<String>,
}

impl KleinanzeigenClientBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::from_config(ClientConfig::default())
    }

    /// Start from an existing configuration.
    pub fn from_config(config: ClientConfig) -> Self {
        Self {
            config,
            rate_limiter: None,
            user_agent: None,
        }
    }

    /// Set the base URL (useful for testing with a mock server).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the API key.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.api_key = ApiKey::new(api_key);
        self
    }

    /// Set the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the results per page the deployment allows.
    pub fn max_results_per_page(mut self, max_results: u32) -> Self {
        self.config.max_results_per_page = max_results;
        self
    }

    /// Set the upper bound for a search's page count.
    pub fn max_pages(mut self, max_pages: u32) -> Self {
        self.config.max_pages = max_pages;
        self
    }

    /// Set the limits of a client-owned rate limiter.
    pub fn rate_limit(mut self, max_requests: u32, window: Duration) -> Self {
        self.config.rate_limit = RateLimitSettings {
            max_requests,
            window,
        };
        self
    }

    /// Use an existing rate limiter, e.g. one shared with other clients.
    ///
    /// Takes precedence over [`rate_limit`](Self::rate_limit).
    pub fn rate_limiter(mut self, rate_limiter: Arc<RateLimiter>) -> Self {
        self.rate_limiter = Some(rate_limiter);
        self
    }

    /// Set the retry policy for transient failures.
    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.config.retry = retry;
        self
    }

    /// Set the total number of attempts per request.
    pub fn max_retries(mut self, attempts: u32) -> Self {
        self.config.retry.max_attempts = attempts;
        self
    }

    /// Set the pause after the first failed attempt.
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.config.retry.initial_delay = delay;
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> KleinanzeigenClient {
        let config = self.config;

        // Build default headers.
        let mut headers = HeaderMap::new();
        let user_agent = self
            .user_agent
            .unwrap_or_else(|| format!("kleinanzeigen-api-client/{}", env!("CARGO_PKG_VERSION")));
        let header_value = HeaderValue::from_str(&user_agent)
            .unwrap_or_else(|_| HeaderValue::from_static("kleinanzeigen-api-client"));
        headers.insert(USER_AGENT, header_value);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ORIGIN, HeaderValue::from_static(ORIGIN_VALUE));

        if !config.api_key.is_empty() {
            match HeaderValue::from_str(config.api_key.expose_secret()) {
                Ok(mut value) => {
                    value.set_sensitive(true);
                    headers.insert(HeaderName::from_static(API_KEY_HEADER), value);
                }
                Err(_) => tracing::warn!("API key contains invalid header characters, sending none"),
            }
        }

        // Build the HTTP client with middleware.
        let reqwest_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        let http_client = ClientBuilder::new(reqwest_client)
            .with(TracingMiddleware::default())
            .build();

        let rate_limiter = self.rate_limiter.unwrap_or_else(|| {
            Arc::new(RateLimiter::new(
                config.rate_limit.max_requests,
                config.rate_limit.window,
            ))
        });

        KleinanzeigenClient {
            executor: RequestExecutor::new(http_client, rate_limiter, config.retry, config.timeout),
            base_url: config.base_url,
            max_pages: config.max_pages,
            max_results_per_page: config.max_results_per_page,
        }
    }
}

impl Default for KleinanzeigenClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_parse_payload_success() {
        let payload = parse_payload(r#"{"success": true, "data": {"ads": []}}"#).unwrap();
        assert!(payload["data"]["ads"].is_array());
    }

    #[test]
    fn test_parse_payload_reported_failure() {
        let err = parse_payload(r#"{"success": false, "message": "Invalid ad id"}"#).unwrap_err();
        assert_eq!(err.to_string(), "API reported failure: Invalid ad id");
        assert_eq!(err.kind(), ErrorKind::Client);
    }

    #[test]
    fn test_parse_payload_malformed() {
        let missing = parse_payload(r#"{"data": []}"#).unwrap_err();
        assert_eq!(missing.kind(), ErrorKind::MalformedResponse);

        let not_json = parse_payload("<html>").unwrap_err();
        assert_eq!(not_json.kind(), ErrorKind::MalformedResponse);
    }

    #[test]
    fn test_builder_trims_base_url() {
        let client = KleinanzeigenClient::builder()
            .base_url("http://localhost:1234/")
            .max_pages(5)
            .build();
        assert_eq!(client.base_url(), "http://localhost:1234");
        assert_eq!(client.max_pages(), 5);
    }

    #[test]
    fn test_debug_hides_api_key() {
        let client = KleinanzeigenClient::builder().api_key("top-secret").build();
        assert!(!format!("{:?}", client).contains("top-secret"));
    }
}

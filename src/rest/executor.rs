//! Rate-limited request execution with exponential backoff.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use reqwest_middleware::ClientWithMiddleware;

use crate::error::{ApiError, KleinanzeigenError};
use crate::normalize::truncate_text;
use crate::rate_limit::RateLimiter;

/// Longest response body excerpt kept in an [`ApiError`].
const ERROR_BODY_EXCERPT: usize = 200;

/// How often and how patiently a request is retried.
///
/// Attempt `n` (0-based) that fails transiently is followed by a pause of
/// `initial_delay * 2^n` before attempt `n + 1`. There is no jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Pause after the first failed attempt.
    pub initial_delay: Duration,
}

impl RetryPolicy {
    /// Create a policy.
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
        }
    }

    /// Pause after failed attempt `attempt` (0-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.initial_delay.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

/// Sends requests through the shared rate limiter and retries transient failures.
///
/// Each attempt consumes one rate limit permit. A 4xx answer ends the loop at
/// once; 5xx answers, connection failures, timeouts and any other transport
/// error are retried until the attempt budget is spent, after which the last
/// error is returned.
#[derive(Clone)]
pub struct RequestExecutor {
    http_client: ClientWithMiddleware,
    rate_limiter: Arc<RateLimiter>,
    retry: RetryPolicy,
    timeout: Duration,
}

impl RequestExecutor {
    /// Create an executor. `timeout` bounds the wait for each rate limit permit.
    pub fn new(
        http_client: ClientWithMiddleware,
        rate_limiter: Arc<RateLimiter>,
        retry: RetryPolicy,
        timeout: Duration,
    ) -> Self {
        Self {
            http_client,
            rate_limiter,
            retry,
            timeout,
        }
    }

    /// The shared rate limiter.
    pub fn rate_limiter(&self) -> &Arc<RateLimiter> {
        &self.rate_limiter
    }

    /// The retry policy.
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Execute a request, returning the body of the first 2xx response.
    ///
    /// When every attempt fails, the error of the last attempt is returned.
    pub async fn execute(&self, method: Method, url: &str) -> Result<String, KleinanzeigenError> {
        let attempts = self.retry.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            let e = match self.attempt(method.clone(), url).await {
                Ok(body) => return Ok(body),
                Err(e) => e,
            };

            if !e.is_retryable() {
                tracing::debug!("{} {} failed permanently: {}", method, url, e);
                return Err(e);
            }

            if e.is_timeout_or_connect()
                || matches!(&e, KleinanzeigenError::Api(api) if api.is_server_error())
            {
                tracing::debug!("{} {} attempt {} failed: {}", method, url, attempt + 1, e);
            } else {
                tracing::warn!(
                    "Unexpected failure on {} {} attempt {}: {}",
                    method,
                    url,
                    attempt + 1,
                    e
                );
            }

            if attempt + 1 >= attempts {
                return Err(e);
            }

            let delay = self.retry.delay_for_attempt(attempt);
            tracing::warn!(
                "Retrying {} {} in {:?} (attempt {}/{})",
                method,
                url,
                delay,
                attempt + 2,
                attempts
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// One permit, one HTTP call, one body read.
    async fn attempt(&self, method: Method, url: &str) -> Result<String, KleinanzeigenError> {
        if !self.rate_limiter.acquire(Some(self.timeout)).await {
            return Err(KleinanzeigenError::RateLimitTimeout);
        }

        let response = self.http_client.request(method, url).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.text().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let message = if body.trim().is_empty() {
            status.canonical_reason().unwrap_or_default().to_string()
        } else {
            truncate_text(body.trim(), ERROR_BODY_EXCERPT)
        };
        Err(KleinanzeigenError::Api(ApiError::new(status.as_u16(), message)))
    }
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("retry", &self.retry)
            .field("timeout", &self.timeout)
            .finish()
    }
}

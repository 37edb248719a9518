//! Client configuration with environment variable overrides.

use std::time::Duration;

use crate::auth::{API_KEY_ENV_VAR, ApiKey};
use crate::error::KleinanzeigenError;
use crate::rate_limit::limits;
use crate::rest::RetryPolicy;
use crate::rest::endpoints::DEFAULT_BASE_URL;

/// Environment variable overriding [`ClientConfig::base_url`].
pub const BASE_URL_ENV_VAR: &str = "KLEINANZEIGEN_API_URL";
/// Environment variable overriding [`ClientConfig::timeout`] (seconds).
pub const TIMEOUT_ENV_VAR: &str = "KLEINANZEIGEN_TIMEOUT";
/// Environment variable overriding [`ClientConfig::max_results_per_page`].
pub const MAX_RESULTS_ENV_VAR: &str = "KLEINANZEIGEN_MAX_RESULTS";
/// Environment variable overriding [`ClientConfig::max_pages`].
pub const MAX_PAGES_ENV_VAR: &str = "KLEINANZEIGEN_MAX_PAGES";

/// Rate limit settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitSettings {
    /// Maximum requests per window.
    pub max_requests: u32,
    /// Window length.
    pub window: Duration,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            max_requests: limits::MAX_REQUESTS,
            window: Duration::from_secs(limits::WINDOW_SECONDS),
        }
    }
}

/// Everything needed to build a [`KleinanzeigenClient`](crate::rest::KleinanzeigenClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL without trailing slash.
    pub base_url: String,
    /// API key sent in the `ads_key` header.
    pub api_key: ApiKey,
    /// Per-request timeout, also bounding the wait for a rate limit permit.
    pub timeout: Duration,
    /// Search limit used when a search names no page count, capped at the
    /// API's own per-request maximum.
    pub max_results_per_page: u32,
    /// Upper bound for a search's page count.
    pub max_pages: u32,
    /// Rate limit applied to all requests.
    pub rate_limit: RateLimitSettings,
    /// Retry behaviour for transient failures.
    pub retry: RetryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: ApiKey::default(),
            timeout: Duration::from_secs(30),
            max_results_per_page: 50,
            max_pages: 20,
            rate_limit: RateLimitSettings::default(),
            retry: RetryPolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Default configuration overridden by `KLEINANZEIGEN_*` environment variables.
    pub fn from_env() -> Result<Self, KleinanzeigenError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Default configuration overridden by values from `lookup`.
    ///
    /// Unset values keep their defaults; values that fail to parse or fall
    /// out of range are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, KleinanzeigenError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(base_url) = lookup(BASE_URL_ENV_VAR) {
            config.base_url = normalize_base_url(&base_url)?;
        }
        if let Some(api_key) = lookup(API_KEY_ENV_VAR) {
            config.api_key = ApiKey::new(api_key);
        }
        if let Some(timeout) = lookup(TIMEOUT_ENV_VAR) {
            let secs: f64 = parse_var(TIMEOUT_ENV_VAR, &timeout)?;
            config.timeout = Duration::try_from_secs_f64(secs)
                .ok()
                .filter(|timeout| !timeout.is_zero())
                .ok_or_else(|| {
                    KleinanzeigenError::Config(format!(
                        "{TIMEOUT_ENV_VAR} must be a positive number of seconds"
                    ))
                })?;
        }
        if let Some(max_results) = lookup(MAX_RESULTS_ENV_VAR) {
            config.max_results_per_page = parse_ranged(MAX_RESULTS_ENV_VAR, &max_results, 1, 100)?;
        }
        if let Some(max_pages) = lookup(MAX_PAGES_ENV_VAR) {
            config.max_pages = parse_ranged(MAX_PAGES_ENV_VAR, &max_pages, 1, 20)?;
        }

        tracing::debug!("Loaded client config for {}", config.base_url);
        Ok(config)
    }
}

/// Check that `url` is absolute and strip trailing slashes.
pub(crate) fn normalize_base_url(url: &str) -> Result<String, KleinanzeigenError> {
    url::Url::parse(url)?;
    Ok(url.trim_end_matches('/').to_string())
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, KleinanzeigenError> {
    value
        .trim()
        .parse()
        .map_err(|_| KleinanzeigenError::Config(format!("{name} has invalid value '{value}'")))
}

fn parse_ranged(name: &str, value: &str, min: u32, max: u32) -> Result<u32, KleinanzeigenError> {
    let parsed: u32 = parse_var(name, value)?;
    if (min..=max).contains(&parsed) {
        Ok(parsed)
    } else {
        Err(KleinanzeigenError::Config(format!(
            "{name} must be between {min} and {max}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "https://api.kleinanzeigen-agent.de");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.max_results_per_page, 50);
        assert_eq!(config.max_pages, 20);
        assert_eq!(config.rate_limit.max_requests, 60);
        assert_eq!(config.retry.max_attempts, 3);
        assert!(config.api_key.is_empty());
    }

    #[test]
    fn test_overrides() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("KLEINANZEIGEN_API_URL", "http://localhost:8080/"),
            ("KLEINANZEIGEN_API_KEY", "secret"),
            ("KLEINANZEIGEN_TIMEOUT", "2.5"),
            ("KLEINANZEIGEN_MAX_RESULTS", "25"),
            ("KLEINANZEIGEN_MAX_PAGES", "5"),
        ]))
        .unwrap();

        assert_eq!(config.base_url, "http://localhost:8080");
        assert_eq!(config.api_key.expose_secret(), "secret");
        assert_eq!(config.timeout, Duration::from_millis(2500));
        assert_eq!(config.max_results_per_page, 25);
        assert_eq!(config.max_pages, 5);
    }

    #[test]
    fn test_invalid_values() {
        let err = ClientConfig::from_lookup(lookup(&[("KLEINANZEIGEN_TIMEOUT", "soon")])).unwrap_err();
        assert!(err.to_string().contains("KLEINANZEIGEN_TIMEOUT"));

        assert!(ClientConfig::from_lookup(lookup(&[("KLEINANZEIGEN_TIMEOUT", "0")])).is_err());
        assert!(ClientConfig::from_lookup(lookup(&[("KLEINANZEIGEN_TIMEOUT", "-3")])).is_err());
        assert!(ClientConfig::from_lookup(lookup(&[("KLEINANZEIGEN_TIMEOUT", "NaN")])).is_err());

        let err = ClientConfig::from_lookup(lookup(&[("KLEINANZEIGEN_TIMEOUT", "1e20")])).unwrap_err();
        assert!(matches!(err, KleinanzeigenError::Config(_)));
        assert!(ClientConfig::from_lookup(lookup(&[("KLEINANZEIGEN_MAX_PAGES", "21")])).is_err());
        assert!(ClientConfig::from_lookup(lookup(&[("KLEINANZEIGEN_MAX_RESULTS", "-1")])).is_err());
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[("KLEINANZEIGEN_API_URL", "not a url")])),
            Err(KleinanzeigenError::Url(_))
        ));
    }
}

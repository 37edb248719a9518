//! Error types for the Kleinanzeigen client library.

use thiserror::Error;

/// The main error type for all Kleinanzeigen client operations.
#[derive(Error, Debug)]
pub enum KleinanzeigenError {
    /// Caller-supplied input was rejected before any request was made
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// HTTP request with middleware failed
    #[error("HTTP request failed: {0}")]
    HttpMiddleware(#[from] reqwest_middleware::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error
    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    /// The API answered with a non-success status code
    #[error("API error: {0}")]
    Api(ApiError),

    /// The API answered with `success: false`
    #[error("API reported failure: {0}")]
    Unsuccessful(String),

    /// No rate limit permit became available within the request timeout
    #[error("Timed out waiting for a rate limit permit")]
    RateLimitTimeout,

    /// Invalid response from the API
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse classification of a [`KleinanzeigenError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Input violated a documented constraint. Never retried.
    Validation,
    /// The API rejected the request (4xx status or `success: false`). Never retried.
    Client,
    /// Server error, connection failure or timeout. Retried.
    Transient,
    /// The API answered, but not with the expected shape.
    MalformedResponse,
    /// The client itself is misconfigured.
    Config,
}

impl KleinanzeigenError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Api(api) if api.is_client_error() => ErrorKind::Client,
            Self::Unsuccessful(_) => ErrorKind::Client,
            Self::Api(_)
            | Self::Http(_)
            | Self::HttpMiddleware(_)
            | Self::RateLimitTimeout => ErrorKind::Transient,
            Self::Json(_) | Self::InvalidResponse(_) => ErrorKind::MalformedResponse,
            Self::Url(_) | Self::Config(_) => ErrorKind::Config,
        }
    }

    /// Whether another attempt could succeed.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Transient
    }

    /// Whether the underlying transport reported a timeout or connection failure.
    pub fn is_timeout_or_connect(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::HttpMiddleware(reqwest_middleware::Error::Reqwest(e)) => {
                e.is_timeout() || e.is_connect()
            }
            Self::RateLimitTimeout => true,
            _ => false,
        }
    }
}

/// A non-success HTTP answer from the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status code
    pub status: u16,
    /// Response body excerpt or reason phrase
    pub message: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.message.is_empty() {
            write!(f, "HTTP {}", self.status)
        } else {
            write!(f, "HTTP {}: {}", self.status, self.message)
        }
    }
}

impl ApiError {
    /// Create a new API error from a status code and message.
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// 4xx: the request itself was bad.
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// 5xx: the server failed.
    pub fn is_server_error(&self) -> bool {
        self.status >= 500
    }

    /// Check if the resource was not found.
    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }

    /// Check if the API key was missing or rejected.
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401 || self.status == 403
    }
}

/// Caller-supplied input violated a documented constraint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    /// Create a validation error with a human-readable message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

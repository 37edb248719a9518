//! Rate limiting for the Kleinanzeigen API.
//!
//! The API caps the number of requests per client in a trailing time window.
//! Every request a [`KleinanzeigenClient`](crate::rest::KleinanzeigenClient)
//! sends, including retries, first acquires a permit from one shared
//! [`RateLimiter`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use kleinanzeigen_api_client::rate_limit::RateLimiter;
//! use kleinanzeigen_api_client::rest::KleinanzeigenClient;
//!
//! // Two clients drawing from the same budget
//! let limiter = Arc::new(RateLimiter::new(30, Duration::from_secs(60)));
//! let a = KleinanzeigenClient::builder().rate_limiter(Arc::clone(&limiter)).build();
//! let b = KleinanzeigenClient::builder().rate_limiter(limiter).build();
//! ```

mod limiter;
mod window;

pub use limiter::{DEFAULT_POLL_INTERVAL, RateLimiter};
pub use window::SlidingWindow;

/// Default API rate limits.
pub mod limits {
    /// Maximum requests per window.
    pub const MAX_REQUESTS: u32 = 60;
    /// Window length in seconds.
    pub const WINDOW_SECONDS: u64 = 60;
}

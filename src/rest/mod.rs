//! Kleinanzeigen REST API client.
//!
//! [`KleinanzeigenClient`] composes the pieces of the access layer: input
//! validation, the shared [`RateLimiter`](crate::rate_limit::RateLimiter),
//! the retrying [`RequestExecutor`] and payload normalization. Each operation
//! returns an [`Envelope`](crate::types::Envelope); no error escapes it.

mod client;
pub mod endpoints;
mod executor;
mod operations;

pub use client::{KleinanzeigenClient, KleinanzeigenClientBuilder};
pub use executor::{RequestExecutor, RetryPolicy};
pub use operations::result_limit;

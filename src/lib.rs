//! # Kleinanzeigen API Client
//!
//! A resilient async Rust client for the Kleinanzeigen classifieds search API.
//!
//! ## Features
//!
//! - Listing search, listing details, location search, categories and docs
//! - Shared sliding-window rate limiting across all requests
//! - Exponential backoff retries for server errors, timeouts and connection failures
//! - Input validation before any request is sent
//! - Normalization of loosely typed payloads into stable display records
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kleinanzeigen_api_client::rest::KleinanzeigenClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = KleinanzeigenClient::from_env()?;
//!     let categories = client.get_categories().await;
//!     println!("Categories: {:?}", categories.data());
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod normalize;
pub mod rate_limit;
pub mod rest;
pub mod types;
pub mod validate;

// Re-export commonly used types at crate root
pub use config::ClientConfig;
pub use error::{ErrorKind, KleinanzeigenError, ValidationError};
pub use rest::KleinanzeigenClient;
pub use types::{Category, Envelope, Listing, Location, SearchParams, SortOrder};

/// Result type alias using KleinanzeigenError
pub type Result<T> = std::result::Result<T, KleinanzeigenError>;

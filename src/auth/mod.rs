//! Authentication for the Kleinanzeigen API.
//!
//! Requests carry a static API key in the `ads_key` header. The key is held
//! in secure storage and never printed.

mod api_key;

pub use api_key::{API_KEY_ENV_VAR, ApiKey};

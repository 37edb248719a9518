//! API key management.

use secrecy::{ExposeSecret, SecretString};

/// Environment variable read by [`ApiKey::from_env`].
pub const API_KEY_ENV_VAR: &str = "KLEINANZEIGEN_API_KEY";

/// The API key sent with every request.
#[derive(Clone)]
pub struct ApiKey {
    key: SecretString,
}

impl ApiKey {
    /// Create a key from its raw value.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: SecretString::from(key.into()),
        }
    }

    /// Read the key from `KLEINANZEIGEN_API_KEY`, defaulting to an empty key.
    pub fn from_env() -> Self {
        Self::try_from_env().unwrap_or_default()
    }

    /// Read the key from `KLEINANZEIGEN_API_KEY`.
    ///
    /// Returns `None` if the variable is not set.
    pub fn try_from_env() -> Option<Self> {
        Self::try_from_env_var(API_KEY_ENV_VAR)
    }

    /// Read the key from a custom environment variable.
    pub fn try_from_env_var(var: &str) -> Option<Self> {
        std::env::var(var).ok().map(Self::new)
    }

    /// Get the raw key for the request header.
    ///
    /// This method exposes the secret - use carefully.
    pub fn expose_secret(&self) -> &str {
        self.key.expose_secret()
    }

    /// Whether no key was configured.
    pub fn is_empty(&self) -> bool {
        self.key.expose_secret().is_empty()
    }
}

impl Default for ApiKey {
    fn default() -> Self {
        Self::new("")
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ApiKey").field(&"[REDACTED]").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_debug_redacted() {
        let key = ApiKey::new("super_secret");
        let debug_str = format!("{:?}", key);
        assert!(!debug_str.contains("super_secret"));
        assert!(debug_str.contains("[REDACTED]"));
    }

    #[test]
    fn test_api_key_expose() {
        let key = ApiKey::new("abc123");
        assert_eq!(key.expose_secret(), "abc123");
        assert!(!key.is_empty());
        assert!(ApiKey::default().is_empty());
    }

    #[test]
    fn test_missing_env_var() {
        assert!(ApiKey::try_from_env_var("KLEINANZEIGEN_TEST_UNSET_VARIABLE").is_none());
    }
}

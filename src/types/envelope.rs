//! Uniform operation result wrapper.

use serde::Serialize;

use crate::error::KleinanzeigenError;

/// The result of a client operation.
///
/// Either `success` is true and `data` is set, or `success` is false and
/// `error` describes why. The constructors are the only way to build one,
/// so the two halves never disagree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope<T> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
}

impl<T> Envelope<T> {
    /// A successful result.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// A failed result.
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    /// Whether the operation succeeded.
    pub fn is_ok(&self) -> bool {
        self.success
    }

    /// The payload of a successful result.
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// The message of a failed result.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Convert into a standard `Result`.
    pub fn into_result(self) -> Result<T, String> {
        match (self.data, self.error) {
            (Some(data), None) => Ok(data),
            (_, error) => Err(error.unwrap_or_default()),
        }
    }
}

impl<T> From<Result<T, KleinanzeigenError>> for Envelope<T> {
    fn from(result: Result<T, KleinanzeigenError>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(err) => Self::err(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;

    #[test]
    fn test_ok_envelope() {
        let envelope = Envelope::ok(vec![1, 2]);
        assert!(envelope.is_ok());
        assert_eq!(envelope.data(), Some(&vec![1, 2]));
        assert!(envelope.error().is_none());
    }

    #[test]
    fn test_from_error() {
        let envelope: Envelope<Vec<u8>> =
            Err(KleinanzeigenError::Api(ApiError::new(404, "Not Found"))).into();
        assert!(!envelope.is_ok());
        assert!(envelope.data().is_none());
        assert_eq!(envelope.error(), Some("API error: HTTP 404: Not Found"));
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(Envelope::<String>::err("boom")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "success": false, "data": null, "error": "boom" })
        );
    }
}

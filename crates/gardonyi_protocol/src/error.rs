//! Error types for the wire protocol.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors raised while encoding or decoding wire data.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// JSON encoding or decoding failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A list query parameter could not be parsed.
    #[error("invalid query parameter `{name}`: {reason}")]
    InvalidQuery {
        /// Parameter name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A request path does not address an API resource.
    #[error("invalid path: {0}")]
    InvalidPath(String),
}

impl ProtocolError {
    /// Creates an invalid query error.
    pub fn invalid_query(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidQuery {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ProtocolError::invalid_query("size", "not a number");
        assert_eq!(
            err.to_string(),
            "invalid query parameter `size`: not a number"
        );
        let err = ProtocolError::InvalidPath("/nope".into());
        assert!(err.to_string().contains("/nope"));
    }
}

//! Error types for record validation.

use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised while checking a record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A field holds a value the schema does not accept.
    #[error("invalid {entity}.{field}: {reason}")]
    ValidationFailure {
        /// Entity name (e.g. `page`).
        entity: &'static str,
        /// Offending field.
        field: &'static str,
        /// Human-readable reason.
        reason: String,
    },
}

impl ModelError {
    /// Creates a validation failure.
    pub fn validation(entity: &'static str, field: &'static str, reason: impl Into<String>) -> Self {
        Self::ValidationFailure {
            entity,
            field,
            reason: reason.into(),
        }
    }

    /// Returns the offending field name.
    pub fn field(&self) -> &'static str {
        match self {
            ModelError::ValidationFailure { field, .. } => field,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ModelError::validation("page", "title", "too long");
        assert_eq!(err.to_string(), "invalid page.title: too long");
        assert_eq!(err.field(), "title");
    }
}

//! Error types for the admin client.

use gardonyi_model::{EntityId, ModelError};
use gardonyi_protocol::ProtocolError;
use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while synchronizing records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The operation referenced a record that does not exist.
    #[error("{entity} not found: {}", describe_id(id))]
    NotFound {
        /// Entity name.
        entity: String,
        /// Requested id, `None` if the record had none.
        id: Option<EntityId>,
    },

    /// A create was issued for a record that already has an id.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Transport-level failure.
    #[error("network failure: {0}")]
    NetworkFailure(String),

    /// The record was rejected as malformed.
    #[error("validation failed: {0}")]
    ValidationFailure(String),

    /// The server answered something that does not fit the protocol.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The server failed.
    #[error("server error {status}: {message}")]
    Server {
        /// HTTP status.
        status: u16,
        /// Error title or body.
        message: String,
    },

    /// The operation cannot be dispatched in the current state.
    #[error("invalid state transition from {from} to {to}")]
    InvalidStateTransition {
        /// Current status.
        from: String,
        /// Refused operation.
        to: String,
    },

    /// No store is registered under this entity key.
    #[error("unknown entity: {0}")]
    UnknownEntity(String),

    /// The path does not match any route.
    #[error("invalid route: {0}")]
    InvalidRoute(String),
}

impl ClientError {
    /// Creates a not-found error for `entity`.
    pub fn not_found(entity: &str, id: Option<EntityId>) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            id,
        }
    }

    /// Returns true if re-invoking the same operation may succeed.
    ///
    /// The client never retries on its own; views use this to decide
    /// whether to offer a retry.
    pub fn is_user_retryable(&self) -> bool {
        matches!(
            self,
            ClientError::NetworkFailure(_)
                | ClientError::Server { .. }
                | ClientError::InvalidStateTransition { .. }
        )
    }
}

fn describe_id(id: &Option<EntityId>) -> String {
    match id {
        Some(id) => id.to_string(),
        None => "missing id".to_string(),
    }
}

impl From<ProtocolError> for ClientError {
    fn from(err: ProtocolError) -> Self {
        ClientError::Protocol(err.to_string())
    }
}

impl From<ModelError> for ClientError {
    fn from(err: ModelError) -> Self {
        ClientError::ValidationFailure(err.to_string())
    }
}

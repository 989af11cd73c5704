//! Error types for the resource server.

use gardonyi_model::{EntityId, ModelError};
use gardonyi_protocol::{ErrorBody, ProtocolError};
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur while handling a request.
#[derive(Error, Debug)]
pub enum ServerError {
    /// The request violates a resource rule (`idexists`, `idnull`, ...).
    #[error("bad request ({entity}/{key}): {message}")]
    BadRequest {
        /// Entity name.
        entity: String,
        /// Error key.
        key: &'static str,
        /// Description.
        message: String,
    },

    /// The addressed record does not exist.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity name.
        entity: String,
        /// Requested id.
        id: EntityId,
    },

    /// The method is not supported on this path.
    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),

    /// No resource is mounted under this collection segment.
    #[error("unknown resource: {0}")]
    UnknownResource(String),

    /// Malformed request (bad JSON, query or path).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Creates a bad request error.
    pub fn bad_request(entity: &str, key: &'static str, message: impl Into<String>) -> Self {
        Self::BadRequest {
            entity: entity.to_string(),
            key,
            message: message.into(),
        }
    }

    /// HTTP status code of the error.
    pub fn status(&self) -> u16 {
        match self {
            ServerError::BadRequest { .. } | ServerError::InvalidRequest(_) => 400,
            ServerError::NotFound { .. } | ServerError::UnknownResource(_) => 404,
            ServerError::MethodNotAllowed(_) => 405,
            ServerError::Internal(_) => 500,
        }
    }

    /// Returns true if this is a client error (4xx).
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status())
    }

    /// Returns true if this is a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        self.status() >= 500
    }

    /// Renders the JSON error body.
    pub fn to_body(&self) -> ErrorBody {
        match self {
            ServerError::BadRequest {
                entity,
                key,
                message,
            } => ErrorBody::bad_request(entity.as_str(), *key, message.as_str()),
            ServerError::NotFound { entity, .. } => {
                let mut body = ErrorBody::new(404, "Not Found");
                body.entity_name = Some(entity.clone());
                body.message = Some("error.http.404".into());
                body
            }
            ServerError::UnknownResource(_) => ErrorBody::new(404, "Not Found"),
            ServerError::MethodNotAllowed(_) => ErrorBody::new(405, "Method Not Allowed"),
            ServerError::InvalidRequest(msg) => ErrorBody::new(400, msg.as_str()),
            ServerError::Internal(_) => ErrorBody::new(500, "Internal Server Error"),
        }
    }
}

impl From<ProtocolError> for ServerError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::InvalidPath(path) => ServerError::UnknownResource(path),
            other => ServerError::InvalidRequest(other.to_string()),
        }
    }
}

impl From<ModelError> for ServerError {
    fn from(err: ModelError) -> Self {
        match &err {
            ModelError::ValidationFailure { entity, .. } => {
                ServerError::bad_request(entity, "invalid", err.to_string())
            }
        }
    }
}

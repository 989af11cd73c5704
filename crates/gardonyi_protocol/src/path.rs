//! REST resource paths.

use crate::error::{ProtocolError, ProtocolResult};
use gardonyi_model::EntityId;

/// Path prefix under which every resource is mounted.
pub const DEFAULT_API_PREFIX: &str = "/api";

/// A parsed resource path: `/api/<resource>` or `/api/<resource>/<id>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiPath {
    /// Collection segment, e.g. `pages`.
    pub resource: String,
    /// Item id, if the path addresses a single record.
    pub id: Option<EntityId>,
}

impl ApiPath {
    /// Builds the collection path.
    pub fn collection(prefix: &str, resource: &str) -> String {
        format!("{}/{}", prefix.trim_end_matches('/'), resource)
    }

    /// Builds the item path.
    pub fn item(prefix: &str, resource: &str, id: EntityId) -> String {
        format!("{}/{}/{}", prefix.trim_end_matches('/'), resource, id)
    }

    /// Parses a request path under `prefix`.
    pub fn parse(prefix: &str, path: &str) -> ProtocolResult<Self> {
        let path = path.split('?').next().unwrap_or(path);
        let rest = path
            .strip_prefix(prefix.trim_end_matches('/'))
            .ok_or_else(|| ProtocolError::InvalidPath(path.to_string()))?;

        let segments: Vec<&str> = rest.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [resource] => Ok(Self {
                resource: (*resource).to_string(),
                id: None,
            }),
            [resource, id] => {
                let id = id
                    .parse::<EntityId>()
                    .map_err(|_| ProtocolError::InvalidPath(path.to_string()))?;
                Ok(Self {
                    resource: (*resource).to_string(),
                    id: Some(id),
                })
            }
            _ => Err(ProtocolError::InvalidPath(path.to_string())),
        }
    }
}

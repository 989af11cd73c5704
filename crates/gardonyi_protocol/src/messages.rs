//! Response payloads.

use serde::{Deserialize, Serialize};

/// A page of records together with the total record count.
#[derive(Debug, Clone, PartialEq)]
pub struct ListResponse<R> {
    /// Records of the requested page.
    pub items: Vec<R>,
    /// Total number of records across all pages.
    pub total_count: u64,
}

impl<R> ListResponse<R> {
    /// Creates a list response.
    pub fn new(items: Vec<R>, total_count: u64) -> Self {
        Self { items, total_count }
    }
}

/// JSON body of an API error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// Short description.
    pub title: String,
    /// HTTP status code.
    pub status: u16,
    /// Entity the error concerns, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,
    /// Machine-readable key (e.g. `idexists`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_key: Option<String>,
    /// Translation key of the message, `error.<errorKey>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorBody {
    /// Creates an error body without entity context.
    pub fn new(status: u16, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            status,
            entity_name: None,
            error_key: None,
            message: None,
        }
    }

    /// Creates a bad-request body for an entity.
    pub fn bad_request(
        entity_name: impl Into<String>,
        error_key: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        let error_key = error_key.into();
        Self {
            title: title.into(),
            status: 400,
            entity_name: Some(entity_name.into()),
            message: Some(format!("error.{}", error_key)),
            error_key: Some(error_key),
        }
    }
}

//! The `Record` trait shared by every entity type.

use crate::error::{ModelError, ModelResult};
use crate::id::EntityId;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

/// Maximum length of a `varchar` column in the CMS schema.
pub const MAX_VARCHAR_LEN: usize = 255;

/// A domain entity synchronized with the remote API.
///
/// The default value of an implementor is the empty record: no id and
/// every field `None`.
pub trait Record:
    Clone + Debug + Default + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Route key and entity name (e.g. `page`).
    const ENTITY_NAME: &'static str;

    /// REST collection segment (e.g. `pages`).
    const RESOURCE_PATH: &'static str;

    /// Names of the non-id fields, in display order.
    const FIELD_NAMES: &'static [&'static str];

    /// Returns the id, `None` if the record was never persisted.
    fn id(&self) -> Option<EntityId>;

    /// Sets the id.
    fn set_id(&mut self, id: Option<EntityId>);

    /// Returns the value of a named field.
    ///
    /// The outer `None` means the field does not exist.
    fn field(&self, name: &str) -> Option<Option<&str>>;

    /// Copies every non-`None` field of `patch` into `self`. The id is kept.
    fn merge_from(&mut self, patch: &Self);

    /// Checks field constraints.
    fn validate(&self) -> ModelResult<()>;

    /// Returns the record with the given id.
    fn with_id(mut self, id: EntityId) -> Self {
        self.set_id(Some(id));
        self
    }

    /// Returns `(name, value)` pairs for every non-id field.
    fn fields(&self) -> Vec<(&'static str, Option<&str>)> {
        Self::FIELD_NAMES
            .iter()
            .map(|name| (*name, self.field(name).flatten()))
            .collect()
    }

    /// True if every non-id field equals the other record's.
    fn same_fields(&self, other: &Self) -> bool {
        self.fields() == other.fields()
    }
}

/// Checks that an optional text field fits in a `varchar` column.
pub fn validate_length(
    entity: &'static str,
    field: &'static str,
    value: Option<&str>,
) -> ModelResult<()> {
    match value {
        Some(v) if v.chars().count() > MAX_VARCHAR_LEN => Err(ModelError::validation(
            entity,
            field,
            format!("longer than {} characters", MAX_VARCHAR_LEN),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_limit() {
        assert!(validate_length("page", "title", None).is_ok());
        assert!(validate_length("page", "title", Some("")).is_ok());
        let max = "x".repeat(MAX_VARCHAR_LEN);
        assert!(validate_length("page", "title", Some(&max)).is_ok());
        let over = "x".repeat(MAX_VARCHAR_LEN + 1);
        let err = validate_length("page", "title", Some(&over)).unwrap_err();
        assert_eq!(err.field(), "title");
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let accented = "é".repeat(MAX_VARCHAR_LEN);
        assert!(validate_length("post", "author", Some(&accented)).is_ok());
    }
}

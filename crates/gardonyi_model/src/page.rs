//! The `Page` record.

use crate::error::ModelResult;
use crate::id::EntityId;
use crate::record::{validate_length, Record};
use serde::{Deserialize, Serialize};

/// A static CMS page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Server-assigned id.
    #[serde(default)]
    pub id: Option<EntityId>,
    /// Page title.
    #[serde(default)]
    pub title: Option<String>,
    /// Page body.
    #[serde(default)]
    pub content: Option<String>,
}

impl Page {
    /// Creates an unsaved page.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: None,
            title: Some(title.into()),
            content: Some(content.into()),
        }
    }
}

impl Record for Page {
    const ENTITY_NAME: &'static str = "page";
    const RESOURCE_PATH: &'static str = "pages";
    const FIELD_NAMES: &'static [&'static str] = &["title", "content"];

    fn id(&self) -> Option<EntityId> {
        self.id
    }

    fn set_id(&mut self, id: Option<EntityId>) {
        self.id = id;
    }

    fn field(&self, name: &str) -> Option<Option<&str>> {
        match name {
            "title" => Some(self.title.as_deref()),
            "content" => Some(self.content.as_deref()),
            _ => None,
        }
    }

    fn merge_from(&mut self, patch: &Self) {
        if let Some(title) = &patch.title {
            self.title = Some(title.clone());
        }
        if let Some(content) = &patch.content {
            self.content = Some(content.clone());
        }
    }

    fn validate(&self) -> ModelResult<()> {
        validate_length(Self::ENTITY_NAME, "title", self.title.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_empty() {
        let page = Page::default();
        assert_eq!(page.id(), None);
        assert_eq!(page.fields(), vec![("title", None), ("content", None)]);
    }

    #[test]
    fn json_shape() {
        let page = Page::new("Home", "Welcome").with_id(EntityId::new(1));
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 1, "title": "Home", "content": "Welcome"})
        );

        let parsed: Page = serde_json::from_str(r#"{"title":"About"}"#).unwrap();
        assert_eq!(parsed.id, None);
        assert_eq!(parsed.title.as_deref(), Some("About"));
        assert_eq!(parsed.content, None);
    }

    #[test]
    fn merge_keeps_missing_fields() {
        let mut page = Page::new("Home", "Welcome").with_id(EntityId::new(3));
        let patch = Page {
            id: Some(EntityId::new(3)),
            title: None,
            content: Some("Updated".into()),
        };
        page.merge_from(&patch);
        assert_eq!(page.title.as_deref(), Some("Home"));
        assert_eq!(page.content.as_deref(), Some("Updated"));
    }

    #[test]
    fn long_content_is_allowed() {
        let page = Page::new("Home", "x".repeat(10_000));
        assert!(page.validate().is_ok());

        let page = Page::new("x".repeat(300), "body");
        assert!(page.validate().is_err());
    }
}

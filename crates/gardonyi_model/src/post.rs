//! The `Post` record.

use crate::error::ModelResult;
use crate::id::EntityId;
use crate::record::{validate_length, Record};
use serde::{Deserialize, Serialize};

/// A blog post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Server-assigned id.
    #[serde(default)]
    pub id: Option<EntityId>,
    /// Post title.
    #[serde(default)]
    pub title: Option<String>,
    /// Post body.
    #[serde(default)]
    pub content: Option<String>,
    /// Author display name.
    #[serde(default)]
    pub author: Option<String>,
}

impl Post {
    /// Creates an unsaved post.
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            title: Some(title.into()),
            content: Some(content.into()),
            author: Some(author.into()),
        }
    }
}

impl Record for Post {
    const ENTITY_NAME: &'static str = "post";
    const RESOURCE_PATH: &'static str = "posts";
    const FIELD_NAMES: &'static [&'static str] = &["title", "content", "author"];

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
            "author" => Some(self.author.as_deref()),
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
        if let Some(author) = &patch.author {
            self.author = Some(author.clone());
        }
    }

    fn validate(&self) -> ModelResult<()> {
        validate_length(Self::ENTITY_NAME, "title", self.title.as_deref())?;
        validate_length(Self::ENTITY_NAME, "author", self.author.as_deref())
    }
}

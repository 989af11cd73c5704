//! Admin routes.

use crate::error::{ClientError, ClientResult};
use gardonyi_model::EntityId;
use std::fmt;
use std::str::FromStr;

/// A view of one entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// `/<entity>`
    List,
    /// `/<entity>/new`
    Create,
    /// `/<entity>/:id`
    Detail(EntityId),
    /// `/<entity>/:id/edit`
    Edit(EntityId),
    /// `/<entity>/:id/delete`
    Delete(EntityId),
}

impl View {
    /// The record a view works on, if any.
    pub fn id(&self) -> Option<EntityId> {
        match self {
            View::List | View::Create => None,
            View::Detail(id) | View::Edit(id) | View::Delete(id) => Some(*id),
        }
    }
}

/// A parsed admin path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Entity key, e.g. `page`.
    pub entity: String,
    /// Selected view.
    pub view: View,
}

impl Route {
    /// Creates a route.
    pub fn new(entity: impl Into<String>, view: View) -> Self {
        Self {
            entity: entity.into(),
            view,
        }
    }

    /// Parses a path such as `/page/5/edit`. Query strings are ignored.
    pub fn parse(path: &str) -> ClientResult<Self> {
        let invalid = || ClientError::InvalidRoute(path.to_string());
        let without_query = path.split(['?', '#']).next().unwrap_or_default();
        let segments: Vec<&str> = without_query
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        let (entity, rest) = segments.split_first().ok_or_else(invalid)?;
        let view = match rest {
            [] => View::List,
            ["new"] => View::Create,
            [id] => View::Detail(id.parse().map_err(|_| invalid())?),
            [id, "edit"] => View::Edit(id.parse().map_err(|_| invalid())?),
            [id, "delete"] => View::Delete(id.parse().map_err(|_| invalid())?),
            _ => return Err(invalid()),
        };
        Ok(Self::new(*entity, view))
    }

    /// Renders the route as a path.
    pub fn path(&self) -> String {
        match self.view {
            View::List => format!("/{}", self.entity),
            View::Create => format!("/{}/new", self.entity),
            View::Detail(id) => format!("/{}/{}", self.entity, id),
            View::Edit(id) => format!("/{}/{}/edit", self.entity, id),
            View::Delete(id) => format!("/{}/{}/delete", self.entity, id),
        }
    }
}

impl FromStr for Route {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_views() {
        assert_eq!(Route::parse("/page").unwrap(), Route::new("page", View::List));
        assert_eq!(Route::parse("/page/").unwrap(), Route::new("page", View::List));
        assert_eq!(Route::parse("/post/new").unwrap(), Route::new("post", View::Create));

        let id = EntityId::new(7);
        assert_eq!(Route::parse("/page/7").unwrap().view, View::Detail(id));
        assert_eq!(Route::parse("/page/7/edit").unwrap().view, View::Edit(id));
        assert_eq!(Route::parse("/page/7/delete").unwrap().view, View::Delete(id));
    }

    #[test]
    fn query_is_ignored() {
        let route = Route::parse("/page?page=2&sort=title,desc").unwrap();
        assert_eq!(route, Route::new("page", View::List));
    }

    #[test]
    fn invalid_paths() {
        for path in ["", "/", "/page/abc", "/page/7/publish", "/page/7/edit/x"] {
            assert!(
                matches!(Route::parse(path), Err(ClientError::InvalidRoute(_))),
                "{path}"
            );
        }
    }

    #[test]
    fn path_round_trip() {
        for path in ["/page", "/post/new", "/page/3", "/page/3/edit", "/post/12/delete"] {
            let route: Route = path.parse().unwrap();
            assert_eq!(route.to_string(), path);
        }
    }
}

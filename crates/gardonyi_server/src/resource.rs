//! Per-entity REST resources.

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::repository::Repository;
use gardonyi_model::{EntityId, Record};
use gardonyi_protocol::{
    decode_json, ApiPath, HttpRequest, HttpResponse, ListQuery, ListResponse, Method,
    TOTAL_COUNT_HEADER,
};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

/// Type-erased handler for one mounted resource.
pub trait ResourceHandler: Send + Sync {
    /// Entity name, e.g. `page`.
    fn entity_name(&self) -> &'static str;

    /// Collection segment, e.g. `pages`.
    fn resource_path(&self) -> &'static str;

    /// Handles a request addressed to this resource.
    fn handle(&self, request: &HttpRequest, id: Option<EntityId>) -> ServerResult<HttpResponse>;

    /// Number of stored records.
    fn record_count(&self) -> usize;
}

/// REST resource managing records of type `R`.
pub struct EntityResource<R: Record> {
    repository: Arc<Repository<R>>,
    defaults: ListQuery,
    max_page_size: u32,
    api_prefix: String,
    application_name: String,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> EntityResource<R> {
    /// Creates a resource backed by a fresh repository.
    pub fn new(config: &ServerConfig) -> Self {
        Self::with_repository(config, Arc::new(Repository::new()))
    }

    /// Creates a resource backed by an existing repository.
    pub fn with_repository(config: &ServerConfig, repository: Arc<Repository<R>>) -> Self {
        Self {
            repository,
            defaults: ListQuery::new(0, config.default_page_size),
            max_page_size: config.max_page_size,
            api_prefix: config.api_prefix.clone(),
            application_name: config.application_name.clone(),
            _record: PhantomData,
        }
    }

    /// Returns the backing repository.
    pub fn repository(&self) -> &Arc<Repository<R>> {
        &self.repository
    }

    /// Creates a new record. The record must not carry an id.
    pub fn create(&self, record: R) -> ServerResult<R> {
        debug!("request to save {}: {:?}", R::ENTITY_NAME, record);
        if record.id().is_some() {
            return Err(ServerError::bad_request(
                R::ENTITY_NAME,
                "idexists",
                format!("A new {} cannot already have an ID", R::ENTITY_NAME),
            ));
        }
        record.validate()?;
        Ok(self.repository.insert(record))
    }

    /// Replaces an existing record.
    pub fn update(&self, id: EntityId, record: R) -> ServerResult<R> {
        debug!("request to update {} {}: {:?}", R::ENTITY_NAME, id, record);
        self.check_target(id, record.id())?;
        record.validate()?;
        self.repository.save(record)
    }

    /// Updates the non-null fields of an existing record.
    pub fn partial_update(&self, id: EntityId, patch: R) -> ServerResult<R> {
        debug!("request to partially update {} {}: {:?}", R::ENTITY_NAME, id, patch);
        self.check_target(id, patch.id())?;

        self.repository.modify(id, |stored| {
            stored.merge_from(&patch);
            stored.validate()?;
            Ok(())
        })
    }

    /// Returns one page of records.
    pub fn list(&self, query: &ListQuery) -> ServerResult<ListResponse<R>> {
        debug!("request to get a page of {}", R::RESOURCE_PATH);
        let mut query = query.clone();
        query.size = query.size.min(self.max_page_size);
        self.repository.find_page(&query)
    }

    /// Returns one record.
    pub fn get(&self, id: EntityId) -> ServerResult<R> {
        debug!("request to get {} {}", R::ENTITY_NAME, id);
        self.repository.find(id).ok_or_else(|| ServerError::NotFound {
            entity: R::ENTITY_NAME.to_string(),
            id,
        })
    }

    /// Deletes a record. Deleting a missing record succeeds.
    pub fn delete(&self, id: EntityId) {
        debug!("request to delete {} {}", R::ENTITY_NAME, id);
        self.repository.delete(id);
    }

    fn check_target(&self, path_id: EntityId, body_id: Option<EntityId>) -> ServerResult<()> {
        let body_id = body_id
            .ok_or_else(|| ServerError::bad_request(R::ENTITY_NAME, "idnull", "Invalid id"))?;
        if body_id != path_id {
            return Err(ServerError::bad_request(
                R::ENTITY_NAME,
                "idinvalid",
                "Invalid ID",
            ));
        }
        if !self.repository.exists(path_id) {
            return Err(ServerError::bad_request(
                R::ENTITY_NAME,
                "idnotfound",
                "Entity not found",
            ));
        }
        Ok(())
    }

    fn decode_body(&self, request: &HttpRequest) -> ServerResult<R> {
        let body = request
            .body
            .as_deref()
            .ok_or_else(|| ServerError::InvalidRequest("missing request body".into()))?;
        Ok(decode_json(body)?)
    }

    fn alert(&self, response: HttpResponse, action: &str, id: EntityId) -> HttpResponse {
        response
            .with_header(
                format!("X-{}-alert", self.application_name),
                format!("{}.{}.{}", self.application_name, R::ENTITY_NAME, action),
            )
            .with_header(format!("X-{}-params", self.application_name), id.to_string())
    }

    fn json(status: u16, record: &R) -> ServerResult<HttpResponse> {
        HttpResponse::json(status, record).map_err(|e| ServerError::Internal(e.to_string()))
    }
}

impl<R: Record> ResourceHandler for EntityResource<R> {
    fn entity_name(&self) -> &'static str {
        R::ENTITY_NAME
    }

    fn resource_path(&self) -> &'static str {
        R::RESOURCE_PATH
    }

    fn handle(&self, request: &HttpRequest, id: Option<EntityId>) -> ServerResult<HttpResponse> {
        match (request.method, id) {
            (Method::Post, None) => {
                let created = self.create(self.decode_body(request)?)?;
                let id = created
                    .id()
                    .ok_or_else(|| ServerError::Internal("created record has no id".into()))?;
                let response = Self::json(201, &created)?.with_header(
                    "Location",
                    ApiPath::item(&self.api_prefix, R::RESOURCE_PATH, id),
                );
                Ok(self.alert(response, "created", id))
            }
            (Method::Get, None) => {
                let query = ListQuery::parse(request.query.as_deref().unwrap_or(""), &self.defaults)?;
                let page = self.list(&query)?;
                HttpResponse::json(200, &page.items)
                    .map(|r| r.with_header(TOTAL_COUNT_HEADER, page.total_count.to_string()))
                    .map_err(|e| ServerError::Internal(e.to_string()))
            }
            (Method::Get, Some(id)) => Self::json(200, &self.get(id)?),
            (Method::Put, Some(id)) => {
                let updated = self.update(id, self.decode_body(request)?)?;
                Ok(self.alert(Self::json(200, &updated)?, "updated", id))
            }
            (Method::Patch, Some(id)) => {
                let updated = self.partial_update(id, self.decode_body(request)?)?;
                Ok(self.alert(Self::json(200, &updated)?, "updated", id))
            }
            (Method::Delete, Some(id)) => {
                self.delete(id);
                Ok(self.alert(HttpResponse::empty(204), "deleted", id))
            }
            (method, _) => Err(ServerError::MethodNotAllowed(format!(
                "{} {}",
                method, request.path
            ))),
        }
    }

    fn record_count(&self) -> usize {
        self.repository.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gardonyi_model::{Page, Post};

    fn pages() -> EntityResource<Page> {
        EntityResource::new(&ServerConfig::default())
    }

    #[test]
    fn create_assigns_id() {
        let resource = pages();
        let page = resource.create(Page::new("Home", "Welcome")).unwrap();
        assert_eq!(page.id, Some(EntityId::new(1)));
        assert_eq!(resource.record_count(), 1);
    }

    #[test]
    fn create_with_id_is_rejected() {
        let resource = pages();
        let result = resource.create(Page::new("Home", "Welcome").with_id(EntityId::new(5)));
        assert!(matches!(
            result,
            Err(ServerError::BadRequest { key: "idexists", .. })
        ));
        assert_eq!(resource.record_count(), 0);
    }

    #[test]
    fn update_checks_ids() {
        let resource = pages();
        let page = resource.create(Page::new("Home", "Welcome")).unwrap();
        let id = page.id.unwrap();

        let no_id = Page::new("x", "y");
        assert!(matches!(
            resource.update(id, no_id),
            Err(ServerError::BadRequest { key: "idnull", .. })
        ));

        let other = Page::new("x", "y").with_id(EntityId::new(99));
        assert!(matches!(
            resource.update(id, other),
            Err(ServerError::BadRequest { key: "idinvalid", .. })
        ));

        let missing = Page::new("x", "y").with_id(EntityId::new(99));
        assert!(matches!(
            resource.update(EntityId::new(99), missing),
            Err(ServerError::BadRequest { key: "idnotfound", .. })
        ));

        let changed = Page::new("About", "Us").with_id(id);
        assert_eq!(resource.update(id, changed.clone()).unwrap(), changed);
        assert_eq!(resource.get(id).unwrap(), changed);
    }

    #[test]
    fn partial_update_merges() {
        let resource: EntityResource<Post> = EntityResource::new(&ServerConfig::default());
        let post = resource.create(Post::new("Title", "Body", "Ann")).unwrap();
        let id = post.id.unwrap();

        let patch = Post {
            id: Some(id),
            content: Some("New body".into()),
            ..Post::default()
        };
        let merged = resource.partial_update(id, patch).unwrap();
        assert_eq!(merged.title.as_deref(), Some("Title"));
        assert_eq!(merged.content.as_deref(), Some("New body"));
        assert_eq!(merged.author.as_deref(), Some("Ann"));
    }

    #[test]
    fn list_caps_page_size() {
        let config = ServerConfig::default().with_max_page_size(2);
        let resource: EntityResource<Page> = EntityResource::new(&config);
        for i in 0..5 {
            resource.create(Page::new(format!("p{}", i), "")).unwrap();
        }
        let page = resource.list(&ListQuery::new(0, 50)).unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total_count, 5);
    }

    #[test]
    fn get_missing_is_not_found() {
        let resource = pages();
        assert!(matches!(
            resource.get(EntityId::new(999)),
            Err(ServerError::NotFound { .. })
        ));
    }

    #[test]
    fn handle_create_sets_location_and_alert() {
        let resource = pages();
        let request = HttpRequest::new(Method::Post, "/api/pages")
            .with_json(&Page::new("Home", "Welcome"))
            .unwrap();
        let response = resource.handle(&request, None).unwrap();
        assert_eq!(response.status, 201);
        assert_eq!(response.header("Location"), Some("/api/pages/1"));
        assert_eq!(
            response.header("X-gardonyiCmsApp-alert"),
            Some("gardonyiCmsApp.page.created")
        );
    }

    #[test]
    fn handle_rejects_unsupported_methods() {
        let resource = pages();
        let request = HttpRequest::new(Method::Put, "/api/pages");
        let err = resource.handle(&request, None).unwrap_err();
        assert_eq!(err.status(), 405);
    }

    #[test]
    fn handle_missing_body() {
        let resource = pages();
        let request = HttpRequest::new(Method::Post, "/api/pages");
        let err = resource.handle(&request, None).unwrap_err();
        assert!(matches!(err, ServerError::InvalidRequest(_)));
    }
}

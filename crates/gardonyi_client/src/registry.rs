//! Store registry and route dispatch.

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::route::{Route, View};
use crate::state::StoreStatus;
use crate::store::EntityStore;
use crate::transport::EntityTransport;
use async_trait::async_trait;
use gardonyi_model::{Page, Post, Record};
use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// A store reachable by route, without knowing its record type.
#[async_trait]
pub trait RouteTarget: Send + Sync {
    /// Entity key the target is mounted under.
    fn entity_name(&self) -> &'static str;

    /// Current status of the underlying store.
    fn status(&self) -> StoreStatus;

    /// Runs the side effect of entering `view`.
    ///
    /// The list view loads the current query, the create view resets the
    /// store and the record views load the record.
    async fn enter(&self, view: View) -> ClientResult<()>;
}

#[async_trait]
impl<R, T> RouteTarget for EntityStore<R, T>
where
    R: Record,
    T: EntityTransport<R> + 'static,
{
    fn entity_name(&self) -> &'static str {
        R::ENTITY_NAME
    }

    fn status(&self) -> StoreStatus {
        EntityStore::status(self)
    }

    async fn enter(&self, view: View) -> ClientResult<()> {
        match view {
            View::List => self.refresh().await.map(|_| ()),
            View::Create => {
                self.reset();
                Ok(())
            }
            View::Detail(id) | View::Edit(id) | View::Delete(id) => {
                self.get_entity(id).await.map(|_| ())
            }
        }
    }
}

/// Application-scoped set of entity stores keyed by entity name.
#[derive(Default)]
pub struct StoreRegistry {
    targets: BTreeMap<&'static str, Arc<dyn RouteTarget>>,
    stores: BTreeMap<&'static str, Arc<dyn Any + Send + Sync>>,
}

impl StoreRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with `page` and `post` stores sharing `transport`.
    pub fn with_default_stores<T>(config: &ClientConfig, transport: Arc<T>) -> Self
    where
        T: EntityTransport<Page> + EntityTransport<Post> + 'static,
    {
        let mut registry = Self::new();
        registry.register(Arc::new(EntityStore::<Page, T>::with_shared_transport(
            config.clone(),
            Arc::clone(&transport),
        )));
        registry.register(Arc::new(EntityStore::<Post, T>::with_shared_transport(
            config.clone(),
            transport,
        )));
        registry
    }

    /// Registers a store under its entity name, replacing any previous one.
    pub fn register<R, T>(&mut self, store: Arc<EntityStore<R, T>>)
    where
        R: Record,
        T: EntityTransport<R> + 'static,
    {
        self.targets.insert(R::ENTITY_NAME, store.clone());
        self.stores.insert(R::ENTITY_NAME, store);
    }

    /// Registered entity names.
    pub fn entity_names(&self) -> Vec<&'static str> {
        self.targets.keys().copied().collect()
    }

    /// Returns the typed store for `R`.
    pub fn store<R, T>(&self) -> ClientResult<Arc<EntityStore<R, T>>>
    where
        R: Record,
        T: EntityTransport<R> + 'static,
    {
        self.stores
            .get(R::ENTITY_NAME)
            .cloned()
            .and_then(|store| store.downcast::<EntityStore<R, T>>().ok())
            .ok_or_else(|| ClientError::UnknownEntity(R::ENTITY_NAME.to_string()))
    }

    /// Returns the store mounted under `entity`.
    pub fn target(&self, entity: &str) -> ClientResult<Arc<dyn RouteTarget>> {
        self.targets
            .get(entity)
            .cloned()
            .ok_or_else(|| ClientError::UnknownEntity(entity.to_string()))
    }

    /// Parses `path`, selects the store and enters the view.
    pub async fn navigate(&self, path: &str) -> ClientResult<Route> {
        let route = Route::parse(path)?;
        let target = self.target(&route.entity)?;
        debug!("navigate {}", route);
        target.enter(route.view).await?;
        Ok(route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;
    use gardonyi_model::EntityId;

    type PageStore = EntityStore<Page, MockTransport<Page>>;

    fn registry() -> (StoreRegistry, Arc<PageStore>) {
        let mock = MockTransport::with_records([Page::new("Home", "Welcome"), Page::new("About", "")]);
        let store = Arc::new(EntityStore::new(ClientConfig::default(), mock));
        let mut registry = StoreRegistry::new();
        registry.register(Arc::clone(&store));
        (registry, store)
    }

    #[tokio::test]
    async fn navigate_list_loads_current_query() {
        let (registry, store) = registry();
        let route = registry.navigate("/page").await.unwrap();
        assert_eq!(route.view, View::List);
        assert_eq!(store.snapshot().entities().len(), 2);
    }

    #[tokio::test]
    async fn navigate_record_views_load_entity() {
        let (registry, store) = registry();
        registry.navigate("/page/2/edit").await.unwrap();
        assert_eq!(store.snapshot().entity().id, Some(EntityId::new(2)));

        registry.navigate("/page/new").await.unwrap();
        assert_eq!(store.snapshot().entity(), &Page::default());

        let err = registry.navigate("/page/99").await.unwrap_err();
        assert!(matches!(err, ClientError::NotFound { .. }));
    }

    #[tokio::test]
    async fn unknown_entity() {
        let (registry, _) = registry();
        assert_eq!(
            registry.navigate("/comment").await.unwrap_err(),
            ClientError::UnknownEntity("comment".into())
        );
        assert!(matches!(
            registry.navigate("/page/x/y/z").await,
            Err(ClientError::InvalidRoute(_))
        ));
    }

    #[test]
    fn typed_access() {
        let (registry, store) = registry();
        let typed = registry.store::<Page, MockTransport<Page>>().unwrap();
        assert!(Arc::ptr_eq(&typed, &store));
        assert!(registry.store::<Post, MockTransport<Post>>().is_err());
        assert_eq!(registry.entity_names(), vec!["page"]);
        assert_eq!(registry.target("page").unwrap().status(), StoreStatus::Idle);
    }
}

//! Integration tests for entity stores against the in-memory server.

use async_trait::async_trait;
use gardonyi_client::{
    ClientConfig, ClientError, ClientResult, EntityStore, EntityTransport, HttpTransport,
    LoopbackClient, ReadOrdering, StoreEvent, StoreRegistry, StoreStatus, View,
};
use gardonyi_model::{EntityId, Page, Post, Record};
use gardonyi_protocol::{ListQuery, ListResponse, Sort};
use gardonyi_server::{CmsServer, ServerConfig};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::oneshot;

type Loopback = HttpTransport<LoopbackClient<Arc<CmsServer>>>;

fn loopback(config: &ClientConfig) -> (Arc<CmsServer>, Arc<Loopback>) {
    let server = Arc::new(CmsServer::with_default_resources(ServerConfig::default()));
    let transport = HttpTransport::new(config, LoopbackClient::new(Arc::clone(&server)));
    (server, Arc::new(transport))
}

fn page_store() -> (Arc<CmsServer>, EntityStore<Page, Loopback>) {
    let config = ClientConfig::default();
    let (server, transport) = loopback(&config);
    (server, EntityStore::with_shared_transport(config, transport))
}

#[tokio::test]
async fn create_home_page() {
    let (server, store) = page_store();

    let created = store
        .create_entity(Page::new("Home", "Welcome"))
        .await
        .unwrap();

    let state = store.snapshot();
    assert_eq!(state.entities().len(), 1);
    let listed = &state.entities()[0];
    assert!(listed.id.is_some());
    assert_eq!(listed.title.as_deref(), Some("Home"));
    assert_eq!(listed.content.as_deref(), Some("Welcome"));
    assert_eq!(listed, &created);
    assert_eq!(state.total_items(), 1);
    assert_eq!(server.record_count::<Page>(), Some(1));
}

#[tokio::test]
async fn get_unknown_page() {
    let (_, store) = page_store();
    let home = store.create_entity(Page::new("Home", "Welcome")).await.unwrap();

    let err = store.get_entity(EntityId::new(999)).await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound { .. }));

    let state = store.snapshot();
    assert_eq!(state.entity(), &home);
    assert!(state.error_message().is_some());
    assert_eq!(state.status(), StoreStatus::Idle);
}

#[tokio::test]
async fn update_then_get_round_trips() {
    let (_, store) = page_store();
    let home = store.create_entity(Page::new("Home", "Welcome")).await.unwrap();

    let changed = Page::new("Home", "Welcome back").with_id(home.id.unwrap());
    store.update_entity(changed.clone()).await.unwrap();
    assert_eq!(store.get_entity(home.id.unwrap()).await.unwrap(), changed);
    assert_eq!(store.snapshot().entity(), &changed);
}

#[tokio::test]
async fn update_of_missing_record_is_not_found() {
    let (_, store) = page_store();
    let err = store
        .update_entity(Page::new("x", "y").with_id(EntityId::new(42)))
        .await
        .unwrap_err();
    assert_eq!(err, ClientError::not_found("page", Some(EntityId::new(42))));
}

#[tokio::test]
async fn create_with_id_is_conflict() {
    let (server, store) = page_store();
    let err = store
        .create_entity(Page::new("x", "y").with_id(EntityId::new(1)))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Conflict(_)));
    assert_eq!(server.record_count::<Page>(), Some(0));
}

#[tokio::test]
async fn delete_removes_from_list() {
    let (_, store) = page_store();
    let mut events = store.subscribe();
    let a = store.create_entity(Page::new("a", "")).await.unwrap();
    let b = store.create_entity(Page::new("b", "")).await.unwrap();

    store.delete_entity(a.id.unwrap()).await.unwrap();
    let state = store.snapshot();
    assert_eq!(state.entities(), &[b]);
    assert_eq!(state.entity(), &Page::default());

    let mut deleted = false;
    while let Ok(event) = events.try_recv() {
        deleted |= event == StoreEvent::Deleted(a.id.unwrap());
    }
    assert!(deleted);
}

#[tokio::test]
async fn paging_uses_total_count() {
    let config = ClientConfig::default().with_page_size(2);
    let (_, transport) = loopback(&config);
    let store: EntityStore<Post, _> = EntityStore::with_shared_transport(config, transport);

    for i in 0..5 {
        store
            .create_entity(Post::new(format!("t{}", i), "", "ann"))
            .await
            .unwrap();
    }
    assert_eq!(store.snapshot().entities().len(), 2);
    assert_eq!(store.snapshot().total_items(), 5);

    let page = store
        .list(ListQuery::new(0, 2).with_sort(Sort::desc("title")))
        .await
        .unwrap();
    let titles: Vec<_> = page.items.iter().filter_map(|p| p.title.clone()).collect();
    assert_eq!(titles, vec!["t4", "t3"]);
}

#[tokio::test]
async fn partial_update_keeps_other_fields() {
    let config = ClientConfig::default();
    let (_, transport) = loopback(&config);
    let store: EntityStore<Post, _> = EntityStore::with_shared_transport(config, transport);

    let post = store
        .create_entity(Post::new("Title", "Body", "Ann"))
        .await
        .unwrap();
    let patch = Post {
        id: post.id,
        content: Some("Edited".into()),
        ..Post::default()
    };
    let merged = store.partial_update_entity(patch).await.unwrap();
    assert_eq!(merged.title.as_deref(), Some("Title"));
    assert_eq!(merged.content.as_deref(), Some("Edited"));
    assert_eq!(merged.author.as_deref(), Some("Ann"));
}

#[tokio::test]
async fn registry_navigates_between_stores() {
    let config = ClientConfig::default();
    let (_, transport) = loopback(&config);
    let registry = StoreRegistry::with_default_stores(&config, transport);
    assert_eq!(registry.entity_names(), vec!["page", "post"]);

    let posts = registry.store::<Post, Loopback>().unwrap();
    let post = posts
        .create_entity(Post::new("Hello", "World", "Ann"))
        .await
        .unwrap();

    let route = registry
        .navigate(&format!("/post/{}/edit", post.id.unwrap()))
        .await
        .unwrap();
    assert_eq!(route.view, View::Edit(post.id.unwrap()));
    assert_eq!(posts.snapshot().entity(), &post);

    registry.navigate("/post/new").await.unwrap();
    assert_eq!(posts.snapshot().entity(), &Post::default());

    registry.navigate("/page").await.unwrap();
    let pages = registry.store::<Page, Loopback>().unwrap();
    assert!(pages.snapshot().entities().is_empty());
}

/// A transport whose `get` calls complete only when the test releases them.
struct GatedTransport {
    gates: Mutex<HashMap<EntityId, oneshot::Receiver<Page>>>,
}

impl GatedTransport {
    fn new(ids: &[i64]) -> (Self, HashMap<EntityId, oneshot::Sender<Page>>) {
        let mut gates = HashMap::new();
        let mut senders = HashMap::new();
        for id in ids {
            let (tx, rx) = oneshot::channel();
            senders.insert(EntityId::new(*id), tx);
            gates.insert(EntityId::new(*id), rx);
        }
        (
            Self {
                gates: Mutex::new(gates),
            },
            senders,
        )
    }
}

#[async_trait]
impl EntityTransport<Page> for GatedTransport {
    async fn list(&self, _query: &ListQuery) -> ClientResult<ListResponse<Page>> {
        Err(ClientError::Protocol("unsupported".into()))
    }

    async fn get(&self, id: EntityId) -> ClientResult<Page> {
        let gate = self.gates.lock().remove(&id);
        let gate = gate.ok_or_else(|| ClientError::not_found("page", Some(id)))?;
        gate.await
            .map_err(|_| ClientError::NetworkFailure("gate dropped".into()))
    }

    async fn create(&self, _record: &Page) -> ClientResult<Page> {
        Err(ClientError::Protocol("unsupported".into()))
    }

    async fn update(&self, _record: &Page) -> ClientResult<Page> {
        Err(ClientError::Protocol("unsupported".into()))
    }

    async fn partial_update(&self, _record: &Page) -> ClientResult<Page> {
        Err(ClientError::Protocol("unsupported".into()))
    }

    async fn delete(&self, _id: EntityId) -> ClientResult<()> {
        Err(ClientError::Protocol("unsupported".into()))
    }
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..10_000 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition not reached");
}

/// Dispatches `get_entity(1)` then `get_entity(2)`, settles 2 first and
/// returns the final `entity` id.
async fn race(ordering: ReadOrdering) -> Option<EntityId> {
    let (transport, mut senders) = GatedTransport::new(&[1, 2]);
    let config = ClientConfig::default().with_read_ordering(ordering);
    let store = Arc::new(EntityStore::new(config, transport));
    let page = |id: i64| Page::new(format!("p{}", id), "").with_id(EntityId::new(id));

    let first = {
        let store = Arc::clone(&store);
        tokio::spawn(async move { store.get_entity(EntityId::new(1)).await })
    };
    wait_until(|| store.snapshot().reads_in_flight() == 1).await;

    let second = {
        let store = Arc::clone(&store);
        tokio::spawn(async move { store.get_entity(EntityId::new(2)).await })
    };
    wait_until(|| store.snapshot().reads_in_flight() == 2).await;

    senders
        .remove(&EntityId::new(2))
        .unwrap()
        .send(page(2))
        .unwrap();
    wait_until(|| store.snapshot().reads_in_flight() == 1).await;
    assert_eq!(store.snapshot().entity().id(), Some(EntityId::new(2)));
    assert!(store.snapshot().loading());

    senders
        .remove(&EntityId::new(1))
        .unwrap()
        .send(page(1))
        .unwrap();
    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();

    let state = store.snapshot();
    assert!(!state.loading());
    assert!(state.is_consistent());
    state.entity().id()
}

#[tokio::test]
async fn concurrent_gets_last_settle_wins() {
    assert_eq!(
        race(ReadOrdering::LastSettleWins).await,
        Some(EntityId::new(1))
    );
}

#[tokio::test]
async fn concurrent_gets_sequenced_keeps_latest_dispatch() {
    assert_eq!(race(ReadOrdering::Sequenced).await, Some(EntityId::new(2)));
}

#[tokio::test]
async fn writes_are_refused_while_reading() {
    let (transport, mut senders) = GatedTransport::new(&[1]);
    let store = Arc::new(EntityStore::new(ClientConfig::default(), transport));

    let read = {
        let store = Arc::clone(&store);
        tokio::spawn(async move { store.get_entity(EntityId::new(1)).await })
    };
    wait_until(|| store.status() == StoreStatus::Loading).await;

    let err = store
        .create_entity(Page::new("a", "b"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::InvalidStateTransition { .. }));
    assert!(err.is_user_retryable());

    senders
        .remove(&EntityId::new(1))
        .unwrap()
        .send(Page::new("p", "").with_id(EntityId::new(1)))
        .unwrap();
    read.await.unwrap().unwrap();
    assert_eq!(store.status(), StoreStatus::Idle);
}

//! Transport layer abstraction for entity operations.

use crate::error::{ClientError, ClientResult};
use async_trait::async_trait;
use gardonyi_model::{EntityId, Record};
use gardonyi_protocol::{Direction, ListQuery, ListResponse};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// An entity transport performs the remote calls of one entity type.
///
/// This trait abstracts the network layer, allowing for different
/// implementations (HTTP, in-process loopback, mock for testing).
#[async_trait]
pub trait EntityTransport<R: Record>: Send + Sync {
    /// Fetches one page of records.
    async fn list(&self, query: &ListQuery) -> ClientResult<ListResponse<R>>;

    /// Fetches one record.
    async fn get(&self, id: EntityId) -> ClientResult<R>;

    /// Creates a record. The server assigns the id.
    async fn create(&self, record: &R) -> ClientResult<R>;

    /// Replaces the record with `record.id()`.
    async fn update(&self, record: &R) -> ClientResult<R>;

    /// Merges the non-null fields of `record` into the stored one.
    async fn partial_update(&self, record: &R) -> ClientResult<R>;

    /// Deletes a record.
    async fn delete(&self, id: EntityId) -> ClientResult<()>;
}

/// A mock transport for testing.
///
/// Keeps records in memory and answers the way the REST API does.
pub struct MockTransport<R: Record> {
    records: Mutex<BTreeMap<EntityId, R>>,
    next_id: Mutex<i64>,
    connected: AtomicBool,
    calls: AtomicUsize,
}

impl<R: Record> MockTransport<R> {
    /// Creates an empty mock transport.
    pub fn new() -> Self {
        Self {
            records: Mutex::new(BTreeMap::new()),
            next_id: Mutex::new(1),
            connected: AtomicBool::new(true),
            calls: AtomicUsize::new(0),
        }
    }

    /// Creates a mock transport holding `records`, assigning ids from 1.
    pub fn with_records(records: impl IntoIterator<Item = R>) -> Self {
        let mock = Self::new();
        for record in records {
            mock.insert(record);
        }
        mock
    }

    /// Stores a record under a fresh id.
    pub fn insert(&self, mut record: R) -> R {
        let mut next = self.next_id.lock();
        let id = EntityId::new(*next);
        *next += 1;
        record.set_id(Some(id));
        self.records.lock().insert(id, record.clone());
        record
    }

    /// Sets the connected state. A disconnected mock fails every call.
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::SeqCst);
    }

    /// Number of calls received so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    fn enter(&self) -> ClientResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.connected.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ClientError::NetworkFailure("not connected".into()))
        }
    }

    fn existing_id(&self, record: &R) -> ClientResult<EntityId> {
        let id = record
            .id()
            .ok_or_else(|| ClientError::not_found(R::ENTITY_NAME, None))?;
        if self.records.lock().contains_key(&id) {
            Ok(id)
        } else {
            Err(ClientError::not_found(R::ENTITY_NAME, Some(id)))
        }
    }
}

impl<R: Record> Default for MockTransport<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: Record> EntityTransport<R> for MockTransport<R> {
    async fn list(&self, query: &ListQuery) -> ClientResult<ListResponse<R>> {
        self.enter()?;
        let field = query.sort.field.as_str();
        if field != "id" && !R::FIELD_NAMES.contains(&field) {
            return Err(ClientError::ValidationFailure(format!(
                "cannot sort {} by `{}`",
                R::ENTITY_NAME,
                field
            )));
        }

        let records = self.records.lock();
        let mut items: Vec<R> = records.values().cloned().collect();
        if field != "id" {
            // Ties keep id order.
            items.sort_by(|a, b| a.field(field).flatten().cmp(&b.field(field).flatten()));
        }
        if query.sort.direction == Direction::Desc {
            items.reverse();
        }
        let items = items
            .into_iter()
            .skip(query.offset())
            .take(query.size as usize)
            .collect();
        Ok(ListResponse::new(items, records.len() as u64))
    }

    async fn get(&self, id: EntityId) -> ClientResult<R> {
        self.enter()?;
        self.records
            .lock()
            .get(&id)
            .cloned()
            .ok_or_else(|| ClientError::not_found(R::ENTITY_NAME, Some(id)))
    }

    async fn create(&self, record: &R) -> ClientResult<R> {
        self.enter()?;
        if record.id().is_some() {
            return Err(ClientError::Conflict(format!(
                "A new {} cannot already have an ID",
                R::ENTITY_NAME
            )));
        }
        Ok(self.insert(record.clone()))
    }

    async fn update(&self, record: &R) -> ClientResult<R> {
        self.enter()?;
        let id = self.existing_id(record)?;
        self.records.lock().insert(id, record.clone());
        Ok(record.clone())
    }

    async fn partial_update(&self, record: &R) -> ClientResult<R> {
        self.enter()?;
        let id = self.existing_id(record)?;
        let mut records = self.records.lock();
        let stored = records
            .get_mut(&id)
            .ok_or_else(|| ClientError::not_found(R::ENTITY_NAME, Some(id)))?;
        stored.merge_from(record);
        Ok(stored.clone())
    }

    async fn delete(&self, id: EntityId) -> ClientResult<()> {
        self.enter()?;
        self.records.lock().remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gardonyi_model::{Page, Post};
    use gardonyi_protocol::Sort;

    #[tokio::test]
    async fn mock_crud() {
        let mock: MockTransport<Page> = MockTransport::new();
        let created = mock.create(&Page::new("Home", "Welcome")).await.unwrap();
        let id = created.id.unwrap();
        assert_eq!(id, EntityId::new(1));

        let changed = Page::new("Home", "Changed").with_id(id);
        mock.update(&changed).await.unwrap();
        assert_eq!(mock.get(id).await.unwrap(), changed);

        mock.delete(id).await.unwrap();
        assert!(mock.is_empty());
        assert_eq!(mock.call_count(), 4);
    }

    #[tokio::test]
    async fn mock_error_mapping() {
        let mock: MockTransport<Page> = MockTransport::new();
        assert!(matches!(
            mock.create(&Page::new("a", "b").with_id(EntityId::new(3))).await,
            Err(ClientError::Conflict(_))
        ));
        assert_eq!(
            mock.update(&Page::new("a", "b")).await.unwrap_err(),
            ClientError::not_found("page", None)
        );
        assert_eq!(
            mock.get(EntityId::new(9)).await.unwrap_err(),
            ClientError::not_found("page", Some(EntityId::new(9)))
        );
    }

    #[tokio::test]
    async fn mock_paging() {
        let mock = MockTransport::with_records((0..5).map(|i| Page::new(format!("p{}", i), "")));
        let page = mock.list(&ListQuery::new(1, 2)).await.unwrap();
        assert_eq!(page.total_count, 5);
        let ids: Vec<_> = page.items.iter().map(|p| p.id.unwrap().get()).collect();
        assert_eq!(ids, vec![3, 4]);
    }

    #[tokio::test]
    async fn mock_sorts_like_the_server() {
        let mock = MockTransport::with_records(
            ["b", "c", "a"].iter().map(|t| Page::new(*t, "")),
        );
        let page = mock
            .list(&ListQuery::new(0, 10).with_sort(Sort::desc("title")))
            .await
            .unwrap();
        let titles: Vec<_> = page.items.iter().map(|p| p.title.clone().unwrap()).collect();
        assert_eq!(titles, vec!["c", "b", "a"]);

        let err = mock
            .list(&ListQuery::new(0, 10).with_sort(Sort::asc("author")))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::ValidationFailure(_)));
    }

    #[tokio::test]
    async fn mock_partial_update_merges() {
        let mock = MockTransport::with_records([Post::new("T", "C", "Ann")]);
        let patch = Post {
            id: Some(EntityId::new(1)),
            author: Some("Bob".into()),
            ..Post::default()
        };
        let merged = mock.partial_update(&patch).await.unwrap();
        assert_eq!(merged.title.as_deref(), Some("T"));
        assert_eq!(merged.author.as_deref(), Some("Bob"));
    }

    #[tokio::test]
    async fn mock_disconnected() {
        let mock: MockTransport<Page> = MockTransport::new();
        mock.set_connected(false);
        assert!(matches!(
            mock.list(&ListQuery::default()).await,
            Err(ClientError::NetworkFailure(_))
        ));
    }
}

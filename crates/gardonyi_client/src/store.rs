//! Per-entity stores.

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::state::{Action, Operation, StoreStatus, SyncState, Transition};
use crate::transport::EntityTransport;
use gardonyi_model::{EntityId, Record};
use gardonyi_protocol::{ListQuery, ListResponse};
use parking_lot::RwLock;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Completion signal published by a store.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent<R> {
    /// A list read was applied.
    Listed {
        /// Total record count.
        total: u64,
    },
    /// A single-record read was applied.
    Loaded(R),
    /// A create, update or partial update completed.
    Saved(R),
    /// A delete completed.
    Deleted(EntityId),
    /// An operation failed.
    Failed {
        /// The failed operation.
        operation: Operation,
        /// Error message.
        message: String,
    },
    /// The store was reset.
    Reset,
}

/// Sync state and remote operations for one entity type.
///
/// Every state change goes through [`SyncState::reduce`] under a write lock
/// that is never held across an `.await`. Operations dispatch a pending
/// action, await the transport and then settle.
pub struct EntityStore<R: Record, T: EntityTransport<R>> {
    config: ClientConfig,
    transport: Arc<T>,
    state: RwLock<SyncState<R>>,
    query: RwLock<ListQuery>,
    list_seq: AtomicU64,
    entity_seq: AtomicU64,
    events: broadcast::Sender<StoreEvent<R>>,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record, T: EntityTransport<R>> EntityStore<R, T> {
    /// Creates a store owning `transport`.
    pub fn new(config: ClientConfig, transport: T) -> Self {
        Self::with_shared_transport(config, Arc::new(transport))
    }

    /// Creates a store over a transport shared with other stores.
    pub fn with_shared_transport(config: ClientConfig, transport: Arc<T>) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        let query = config.default_query();
        Self {
            config,
            transport,
            state: RwLock::new(SyncState::new()),
            query: RwLock::new(query),
            list_seq: AtomicU64::new(0),
            entity_seq: AtomicU64::new(0),
            events,
            _record: PhantomData,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the transport.
    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    /// Returns a copy of the current state.
    pub fn snapshot(&self) -> SyncState<R> {
        self.state.read().clone()
    }

    /// Returns the current status.
    pub fn status(&self) -> StoreStatus {
        self.state.read().status()
    }

    /// Subscribes to completion events.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent<R>> {
        self.events.subscribe()
    }

    /// The list query used by refreshes and the list view.
    pub fn current_query(&self) -> ListQuery {
        self.query.read().clone()
    }

    /// Fetches a page of records.
    ///
    /// `query` becomes the current query once its response is applied. A
    /// failed or discarded list keeps the previous one.
    pub async fn list(&self, query: ListQuery) -> ClientResult<ListResponse<R>> {
        let seq = self.dispatch(Operation::List)?;
        debug!("list {} ({}) #{}", R::RESOURCE_PATH, query.to_query_string(), seq);

        match self.transport.list(&query).await {
            Ok(page) => {
                let total = page.total_count;
                let transition = self.settle(Action::ListFulfilled {
                    items: page.items.clone(),
                    total,
                    seq,
                })?;
                if transition == Transition::Applied {
                    *self.query.write() = query;
                    self.emit(StoreEvent::Listed { total });
                }
                Ok(page)
            }
            Err(err) => {
                self.fail(Operation::List, seq, &err);
                Err(err)
            }
        }
    }

    /// Fetches the list again with the current query.
    pub async fn refresh(&self) -> ClientResult<ListResponse<R>> {
        self.list(self.current_query()).await
    }

    /// Fetches one record into `entity`.
    pub async fn get_entity(&self, id: EntityId) -> ClientResult<R> {
        let seq = self.dispatch(Operation::Get)?;
        debug!("get {} {} #{}", R::ENTITY_NAME, id, seq);

        match self.transport.get(id).await {
            Ok(record) => {
                let transition = self.settle(Action::EntityFulfilled {
                    record: record.clone(),
                    seq,
                })?;
                if transition == Transition::Applied {
                    self.emit(StoreEvent::Loaded(record.clone()));
                }
                Ok(record)
            }
            Err(err) => {
                self.fail(Operation::Get, seq, &err);
                Err(err)
            }
        }
    }

    /// Creates a record. `record` must not carry an id.
    pub async fn create_entity(&self, record: R) -> ClientResult<R> {
        record.validate()?;
        self.dispatch(Operation::Create)?;
        debug!("create {}: {:?}", R::ENTITY_NAME, record);
        let result = self.transport.create(&record).await;
        self.finish_write(Operation::Create, result).await
    }

    /// Replaces an existing record.
    pub async fn update_entity(&self, record: R) -> ClientResult<R> {
        record.validate()?;
        self.dispatch(Operation::Update)?;
        debug!("update {}: {:?}", R::ENTITY_NAME, record);
        let result = self.transport.update(&record).await;
        self.finish_write(Operation::Update, result).await
    }

    /// Applies the non-null fields of `record` to the stored record.
    pub async fn partial_update_entity(&self, record: R) -> ClientResult<R> {
        record.validate()?;
        self.dispatch(Operation::PartialUpdate)?;
        debug!("partial update {}: {:?}", R::ENTITY_NAME, record);
        let result = self.transport.partial_update(&record).await;
        self.finish_write(Operation::PartialUpdate, result).await
    }

    /// Deletes a record.
    pub async fn delete_entity(&self, id: EntityId) -> ClientResult<()> {
        self.dispatch(Operation::Delete)?;
        debug!("delete {} {}", R::ENTITY_NAME, id);

        match self.transport.delete(id).await {
            Ok(()) => {
                self.settle(Action::DeleteFulfilled)?;
                self.emit(StoreEvent::Deleted(id));
                self.refresh_after_write(Operation::Delete).await;
                Ok(())
            }
            Err(err) => {
                self.fail(Operation::Delete, 0, &err);
                Err(err)
            }
        }
    }

    /// Clears the edited record and the success flags.
    pub fn reset(&self) {
        match self.settle(Action::Reset) {
            Ok(_) => self.emit(StoreEvent::Reset),
            Err(e) => warn!("{} reset refused: {}", R::ENTITY_NAME, e),
        }
    }

    async fn finish_write(&self, operation: Operation, result: ClientResult<R>) -> ClientResult<R> {
        match result {
            Ok(saved) => {
                self.settle(Action::WriteFulfilled(saved.clone()))?;
                self.emit(StoreEvent::Saved(saved.clone()));
                self.refresh_after_write(operation).await;
                Ok(saved)
            }
            Err(err) => {
                self.fail(operation, 0, &err);
                Err(err)
            }
        }
    }

    async fn refresh_after_write(&self, operation: Operation) {
        if !self.config.refresh_after_write {
            return;
        }
        if let Err(e) = self.refresh().await {
            warn!("{} refresh after {} failed: {}", R::RESOURCE_PATH, operation, e);
        }
    }

    fn dispatch(&self, operation: Operation) -> ClientResult<u64> {
        let mut state = self.state.write();
        if let Err(e) = state.reduce(Action::Pending(operation), self.config.read_ordering) {
            warn!("{} {} refused: {}", R::ENTITY_NAME, operation, e);
            return Err(e);
        }
        let seq = match operation {
            Operation::List => self.list_seq.fetch_add(1, Ordering::SeqCst) + 1,
            Operation::Get => self.entity_seq.fetch_add(1, Ordering::SeqCst) + 1,
            _ => 0,
        };
        Ok(seq)
    }

    fn settle(&self, action: Action<R>) -> ClientResult<Transition> {
        let transition = self
            .state
            .write()
            .reduce(action, self.config.read_ordering)?;
        if transition == Transition::Discarded {
            warn!("discarded stale {} response", R::ENTITY_NAME);
        }
        Ok(transition)
    }

    fn fail(&self, operation: Operation, seq: u64, err: &ClientError) {
        warn!("{} {} failed: {}", R::ENTITY_NAME, operation, err);
        let message = err.to_string();
        let action = Action::Rejected {
            operation,
            message: message.clone(),
            seq,
        };
        match self.settle(action) {
            Ok(Transition::Applied) => self.emit(StoreEvent::Failed { operation, message }),
            Ok(Transition::Discarded) => {}
            Err(e) => warn!("{} {} could not settle: {}", R::ENTITY_NAME, operation, e),
        }
    }

    fn emit(&self, event: StoreEvent<R>) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

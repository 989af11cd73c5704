//! Entity sync state machine.

use crate::config::ReadOrdering;
use crate::error::{ClientError, ClientResult};
use gardonyi_model::Record;
use std::fmt;

/// Coarse status of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreStatus {
    /// Nothing is in flight.
    Idle,
    /// At least one read is in flight.
    Loading,
    /// A write is in flight.
    Updating,
}

impl StoreStatus {
    /// Returns true if an operation is in flight.
    pub fn is_active(&self) -> bool {
        !matches!(self, StoreStatus::Idle)
    }
}

/// A remote operation a store can dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Fetch a page of records.
    List,
    /// Fetch one record.
    Get,
    /// Create a record.
    Create,
    /// Replace a record.
    Update,
    /// Merge the non-null fields of a record.
    PartialUpdate,
    /// Delete a record.
    Delete,
}

impl Operation {
    /// Returns true for `List` and `Get`.
    pub fn is_read(&self) -> bool {
        matches!(self, Operation::List | Operation::Get)
    }

    /// Short name used in logs and errors.
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::Get => "get",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::PartialUpdate => "partial_update",
            Operation::Delete => "delete",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input of [`SyncState::reduce`].
///
/// Read settle actions carry the sequence number the read was dispatched
/// with. It is only consulted under [`ReadOrdering::Sequenced`].
#[derive(Debug, Clone, PartialEq)]
pub enum Action<R> {
    /// An operation was dispatched.
    Pending(Operation),
    /// A list read succeeded.
    ListFulfilled {
        /// Records of the requested page.
        items: Vec<R>,
        /// Total number of records on the server.
        total: u64,
        /// Dispatch sequence number.
        seq: u64,
    },
    /// A single-record read succeeded.
    EntityFulfilled {
        /// The fetched record.
        record: R,
        /// Dispatch sequence number.
        seq: u64,
    },
    /// A create, update or partial update succeeded.
    WriteFulfilled(R),
    /// A delete succeeded.
    DeleteFulfilled,
    /// An operation failed.
    Rejected {
        /// The failed operation.
        operation: Operation,
        /// Error message to record.
        message: String,
        /// Dispatch sequence number, for reads.
        seq: u64,
    },
    /// The edited record and success flags were reset.
    Reset,
}

/// Outcome of a successful [`SyncState::reduce`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The action changed the state.
    Applied,
    /// A stale read settled; only its in-flight count was released.
    Discarded,
}

/// Client-side cache and request status for one entity type.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncState<R> {
    entities: Vec<R>,
    entity: R,
    total_items: u64,
    loading: bool,
    updating: bool,
    update_success: bool,
    delete_success: bool,
    error_message: Option<String>,
    stale: bool,
    reads_in_flight: usize,
    applied_list_seq: u64,
    applied_entity_seq: u64,
}

impl<R: Record> Default for SyncState<R> {
    fn default() -> Self {
        Self {
            entities: Vec::new(),
            entity: R::default(),
            total_items: 0,
            loading: false,
            updating: false,
            update_success: false,
            delete_success: false,
            error_message: None,
            stale: false,
            reads_in_flight: 0,
            applied_list_seq: 0,
            applied_entity_seq: 0,
        }
    }
}

impl<R: Record> SyncState<R> {
    /// Creates the initial state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached page of records.
    pub fn entities(&self) -> &[R] {
        &self.entities
    }

    /// Currently viewed or edited record.
    pub fn entity(&self) -> &R {
        &self.entity
    }

    /// Total record count reported by the last list.
    pub fn total_items(&self) -> u64 {
        self.total_items
    }

    /// True while a read is in flight.
    pub fn loading(&self) -> bool {
        self.loading
    }

    /// True while a write is in flight.
    pub fn updating(&self) -> bool {
        self.updating
    }

    /// True after a create or update completed.
    pub fn update_success(&self) -> bool {
        self.update_success
    }

    /// True after a delete completed.
    pub fn delete_success(&self) -> bool {
        self.delete_success
    }

    /// Message of the last failure.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// True when `entities` is known to be outdated.
    pub fn stale(&self) -> bool {
        self.stale
    }

    /// Number of reads in flight.
    pub fn reads_in_flight(&self) -> usize {
        self.reads_in_flight
    }

    /// Current status.
    pub fn status(&self) -> StoreStatus {
        if self.updating {
            StoreStatus::Updating
        } else if self.loading {
            StoreStatus::Loading
        } else {
            StoreStatus::Idle
        }
    }

    /// Returns true if `operation` may be dispatched now.
    ///
    /// Reads may overlap each other but not a write; a write needs an idle
    /// store.
    pub fn can_dispatch(&self, operation: Operation) -> bool {
        if operation.is_read() {
            !self.updating
        } else {
            !self.updating && !self.loading
        }
    }

    /// Checks the state invariants.
    ///
    /// A store is never loading and updating at once, never reports a
    /// success flag while an operation is in flight, and is loading exactly
    /// when reads are in flight.
    pub fn is_consistent(&self) -> bool {
        let in_flight = self.loading || self.updating;
        !(self.loading && self.updating)
            && !(in_flight && (self.update_success || self.delete_success))
            && self.loading == (self.reads_in_flight > 0)
    }

    /// Applies `action`.
    ///
    /// Returns `InvalidStateTransition` and leaves the state untouched when
    /// the action is not allowed in the current state.
    pub fn reduce(&mut self, action: Action<R>, ordering: ReadOrdering) -> ClientResult<Transition> {
        match action {
            Action::Pending(operation) => {
                if !self.can_dispatch(operation) {
                    return Err(self.refuse(operation.as_str()));
                }
                self.update_success = false;
                self.delete_success = false;
                self.error_message = None;
                if operation.is_read() {
                    self.reads_in_flight += 1;
                    self.loading = true;
                } else {
                    self.updating = true;
                }
                Ok(Transition::Applied)
            }
            Action::ListFulfilled { items, total, seq } => {
                self.settle_read("list_fulfilled")?;
                if is_stale(ordering, seq, self.applied_list_seq) {
                    return Ok(Transition::Discarded);
                }
                self.applied_list_seq = self.applied_list_seq.max(seq);
                self.entities = items;
                self.total_items = total;
                self.error_message = None;
                self.stale = false;
                Ok(Transition::Applied)
            }
            Action::EntityFulfilled { record, seq } => {
                self.settle_read("entity_fulfilled")?;
                if is_stale(ordering, seq, self.applied_entity_seq) {
                    return Ok(Transition::Discarded);
                }
                self.applied_entity_seq = self.applied_entity_seq.max(seq);
                self.entity = record;
                self.error_message = None;
                Ok(Transition::Applied)
            }
            Action::WriteFulfilled(record) => {
                self.settle_write("write_fulfilled")?;
                self.entity = record;
                self.update_success = true;
                self.stale = true;
                Ok(Transition::Applied)
            }
            Action::DeleteFulfilled => {
                self.settle_write("delete_fulfilled")?;
                self.entity = R::default();
                self.delete_success = true;
                self.stale = true;
                Ok(Transition::Applied)
            }
            Action::Rejected {
                operation,
                message,
                seq,
            } => {
                match operation {
                    Operation::List => {
                        self.settle_read("rejected")?;
                        if is_stale(ordering, seq, self.applied_list_seq) {
                            return Ok(Transition::Discarded);
                        }
                        self.applied_list_seq = self.applied_list_seq.max(seq);
                    }
                    Operation::Get => {
                        self.settle_read("rejected")?;
                        if is_stale(ordering, seq, self.applied_entity_seq) {
                            return Ok(Transition::Discarded);
                        }
                        self.applied_entity_seq = self.applied_entity_seq.max(seq);
                    }
                    _ => self.settle_write("rejected")?,
                }
                self.error_message = Some(message);
                Ok(Transition::Applied)
            }
            Action::Reset => {
                self.reset();
                Ok(Transition::Applied)
            }
        }
    }

    // In-flight flags and the cached list are untouched.
    fn reset(&mut self) {
        self.entity = R::default();
        self.update_success = false;
        self.delete_success = false;
    }

    fn settle_read(&mut self, to: &str) -> ClientResult<()> {
        if self.reads_in_flight == 0 {
            return Err(self.refuse(to));
        }
        self.reads_in_flight -= 1;
        self.loading = self.reads_in_flight > 0;
        Ok(())
    }

    fn settle_write(&mut self, to: &str) -> ClientResult<()> {
        if !self.updating {
            return Err(self.refuse(to));
        }
        self.updating = false;
        Ok(())
    }

    fn refuse(&self, to: &str) -> ClientError {
        ClientError::InvalidStateTransition {
            from: format!("{:?}", self.status()),
            to: to.to_string(),
        }
    }
}

fn is_stale(ordering: ReadOrdering, seq: u64, applied: u64) -> bool {
    ordering == ReadOrdering::Sequenced && seq < applied
}

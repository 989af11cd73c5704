//! Configuration for the admin client.

use gardonyi_protocol::{ListQuery, Sort, DEFAULT_API_PREFIX, DEFAULT_PAGE_SIZE};
use std::time::Duration;

/// How concurrently settling reads are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadOrdering {
    /// Every settling read is applied; the last one to settle wins.
    #[default]
    LastSettleWins,
    /// Reads carry a sequence number; a response older than the newest
    /// applied one of the same kind is discarded.
    Sequenced,
}

/// Configuration for entity stores and transports.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server base URL, e.g. `http://localhost:8080`.
    pub base_url: String,
    /// Path prefix of the REST resources.
    pub api_prefix: String,
    /// Page size of list requests.
    pub page_size: u32,
    /// Sort order of list requests.
    pub sort: Sort,
    /// Ordering policy for concurrent reads.
    pub read_ordering: ReadOrdering,
    /// Whether a successful write triggers a list refresh.
    pub refresh_after_write: bool,
    /// Request timeout.
    pub timeout: Duration,
    /// Bearer token sent with every request.
    pub bearer_token: Option<String>,
    /// Capacity of each store's event channel.
    pub event_capacity: usize,
}

impl ClientConfig {
    /// Creates a configuration for the given server.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            sort: Sort::default(),
            read_ordering: ReadOrdering::default(),
            refresh_after_write: true,
            timeout: Duration::from_secs(30),
            bearer_token: None,
            event_capacity: 64,
        }
    }

    /// Sets the path prefix.
    pub fn with_api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = prefix.into();
        self
    }

    /// Sets the list page size.
    pub fn with_page_size(mut self, size: u32) -> Self {
        self.page_size = size;
        self
    }

    /// Sets the list sort order.
    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }

    /// Sets the read ordering policy.
    pub fn with_read_ordering(mut self, ordering: ReadOrdering) -> Self {
        self.read_ordering = ordering;
        self
    }

    /// Enables or disables the list refresh after writes.
    pub fn with_refresh_after_write(mut self, refresh: bool) -> Self {
        self.refresh_after_write = refresh;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the bearer token.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Sets the event channel capacity.
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }

    /// The list query a store starts with.
    pub fn default_query(&self) -> ListQuery {
        ListQuery::new(0, self.page_size).with_sort(self.sort.clone())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080")
    }
}

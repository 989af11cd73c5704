//! Test fixtures and store helpers.
//!
//! Provides an in-process CMS (server, loopback transport and stores) and
//! sample content.

use gardonyi_client::{ClientConfig, EntityStore, HttpTransport, LoopbackClient, StoreRegistry};
use gardonyi_model::{Page, Post, Record};
use gardonyi_server::{CmsServer, ServerConfig};
use std::future::Future;
use std::sync::Arc;

/// Transport reaching an in-process server.
pub type LoopbackTransport = HttpTransport<LoopbackClient<Arc<CmsServer>>>;

/// A store backed by an in-process server.
pub type LoopbackStore<R> = EntityStore<R, LoopbackTransport>;

/// An in-process CMS: a server and a registry of stores talking to it.
pub struct TestCms {
    /// The server.
    pub server: Arc<CmsServer>,
    /// The registry holding the `page` and `post` stores.
    pub registry: StoreRegistry,
    /// The client configuration.
    pub config: ClientConfig,
}

impl TestCms {
    /// Creates an empty CMS with the default client configuration.
    pub fn new() -> Self {
        Self::with_config(ClientConfig::new("memory://"))
    }

    /// Creates an empty CMS with the given client configuration.
    pub fn with_config(config: ClientConfig) -> Self {
        let server = Arc::new(CmsServer::with_default_resources(ServerConfig::default()));
        let transport = Arc::new(HttpTransport::new(
            &config,
            LoopbackClient::new(Arc::clone(&server)),
        ));
        let registry = StoreRegistry::with_default_stores(&config, transport);
        Self {
            server,
            registry,
            config,
        }
    }

    /// Returns the store for `R`.
    pub fn store<R: Record>(&self) -> Arc<LoopbackStore<R>> {
        self.registry
            .store::<R, LoopbackTransport>()
            .expect("store not registered")
    }

    /// Returns the page store.
    pub fn pages(&self) -> Arc<LoopbackStore<Page>> {
        self.store::<Page>()
    }

    /// Returns the post store.
    pub fn posts(&self) -> Arc<LoopbackStore<Post>> {
        self.store::<Post>()
    }

    /// Creates every record of `records` through the store for `R`.
    pub async fn seed<R: Record>(&self, records: impl IntoIterator<Item = R>) -> Vec<R> {
        let store = self.store::<R>();
        let mut created = Vec::new();
        for record in records {
            created.push(store.create_entity(record).await.expect("Failed to seed record"));
        }
        created
    }
}

impl Default for TestCms {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs `future` to completion on a fresh single-threaded runtime.
///
/// Property tests use this since proptest cases are synchronous.
pub fn block_on<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to build runtime")
        .block_on(future)
}

/// Sample pages.
pub fn sample_pages() -> Vec<Page> {
    vec![
        Page::new("Home", "Welcome"),
        Page::new("About", "Who we are"),
        Page::new("Contact", "Write to us"),
    ]
}

/// Sample posts.
pub fn sample_posts() -> Vec<Post> {
    vec![
        Post::new("Hello", "First post", "admin"),
        Post::new("Release", "Version 0.3 is out", "editor"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_cms() {
        let cms = TestCms::new();
        let pages = block_on(cms.seed(sample_pages()));
        assert_eq!(pages.len(), 3);
        assert!(pages.iter().all(|p| p.id.is_some()));
        assert_eq!(cms.server.record_count::<Page>(), Some(3));
        assert_eq!(cms.server.record_count::<Post>(), Some(0));
    }
}

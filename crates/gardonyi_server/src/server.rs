//! The resource server.

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::resource::{EntityResource, ResourceHandler};
use gardonyi_model::{Page, Post, Record};
use gardonyi_protocol::{ApiPath, HttpRequest, HttpResponse, LoopbackServer};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// The CMS REST server.
///
/// Routes requests to the resource mounted under the collection segment
/// of the path and turns errors into JSON error responses.
///
/// # Example
///
/// ```
/// use gardonyi_model::Page;
/// use gardonyi_server::{CmsServer, ServerConfig};
///
/// let server = CmsServer::with_default_resources(ServerConfig::default());
/// assert_eq!(server.record_count::<Page>(), Some(0));
/// ```
pub struct CmsServer {
    config: ServerConfig,
    resources: BTreeMap<&'static str, Arc<dyn ResourceHandler>>,
}

impl CmsServer {
    /// Creates a server with no mounted resources.
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            resources: BTreeMap::new(),
        }
    }

    /// Creates a server serving `pages` and `posts`.
    pub fn with_default_resources(config: ServerConfig) -> Self {
        let mut server = Self::new(config);
        server.mount::<Page>();
        server.mount::<Post>();
        server
    }

    /// Mounts a fresh resource for `R`.
    pub fn mount<R: Record>(&mut self) {
        let resource = EntityResource::<R>::new(&self.config);
        self.mount_handler(Arc::new(resource));
    }

    /// Mounts a handler under its resource path, replacing any previous one.
    pub fn mount_handler(&mut self, handler: Arc<dyn ResourceHandler>) {
        self.resources.insert(handler.resource_path(), handler);
    }

    /// Returns the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the mounted collection segments.
    pub fn resource_paths(&self) -> Vec<&'static str> {
        self.resources.keys().copied().collect()
    }

    /// Returns the number of stored records of `R`, if it is mounted.
    pub fn record_count<R: Record>(&self) -> Option<usize> {
        self.resources
            .get(R::RESOURCE_PATH)
            .map(|handler| handler.record_count())
    }

    fn dispatch(&self, request: &HttpRequest) -> Result<HttpResponse, ServerError> {
        let path = ApiPath::parse(&self.config.api_prefix, &request.path)?;
        let handler = self
            .resources
            .get(path.resource.as_str())
            .ok_or_else(|| ServerError::UnknownResource(path.resource.clone()))?;
        handler.handle(request, path.id)
    }
}

impl LoopbackServer for CmsServer {
    fn handle(&self, request: HttpRequest) -> HttpResponse {
        debug!("{} {}", request.method, request.path_and_query());
        match self.dispatch(&request) {
            Ok(response) => response,
            Err(err) => {
                warn!("{} {} failed: {}", request.method, request.path, err);
                let status = err.status();
                HttpResponse::json(status, &err.to_body())
                    .unwrap_or_else(|_| HttpResponse::empty(status))
            }
        }
    }
}

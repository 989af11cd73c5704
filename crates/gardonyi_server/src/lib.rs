//! # Gardonyi Server
//!
//! Reference in-memory REST resource server for the Gardonyi CMS API.
//!
//! This crate provides:
//! - Per-entity REST resources (create, update, partial update, list, get, delete)
//! - An in-memory repository with server-assigned ids
//! - Paging, sorting and the `X-Total-Count` header
//! - JSON error bodies with stable error keys
//!
//! # Architecture
//!
//! `CmsServer` routes an `HttpRequest` to the resource registered for the
//! collection segment of its path. The server is transport-agnostic: it
//! implements `LoopbackServer`, so clients reach it in-process, and a real
//! HTTP front-end only has to translate requests into `HttpRequest`s.
//!
//! ```
//! use gardonyi_protocol::{HttpRequest, LoopbackServer, Method};
//! use gardonyi_server::{CmsServer, ServerConfig};
//!
//! let server = CmsServer::with_default_resources(ServerConfig::default());
//! let response = server.handle(HttpRequest::new(Method::Get, "/api/pages"));
//! assert_eq!(response.status, 200);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod config;
mod error;
mod repository;
mod resource;
mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use repository::Repository;
pub use resource::{EntityResource, ResourceHandler};
pub use server::CmsServer;

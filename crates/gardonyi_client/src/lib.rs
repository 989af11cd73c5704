//! # Gardonyi Client
//!
//! Entity sync state machine and REST client for the Gardonyi CMS admin.
//!
//! This crate provides:
//! - `SyncState`, the per-entity cache and request status tracker
//! - `EntityStore`, which runs list/get/create/update/patch/delete against
//!   a transport and keeps a `SyncState` consistent
//! - Transport abstraction with HTTP, loopback and mock implementations
//! - Admin routes and a `StoreRegistry` dispatching them to stores
//!
//! ## Architecture
//!
//! Every operation dispatches a pending action, awaits the transport and
//! settles with a fulfilled or rejected action. Writes that succeed mark the
//! cached list stale and refresh it with the store's current query.
//!
//! ## Key Invariants
//!
//! - A store is never loading and updating at the same time
//! - No success flag is reported while an operation is in flight
//! - Reads may overlap; a write needs an idle store
//! - Errors are recorded in the state and returned to the caller; nothing
//!   is retried automatically

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod config;
mod error;
mod http;
mod registry;
mod route;
mod state;
mod store;
mod transport;

pub use config::{ClientConfig, ReadOrdering};
pub use error::{ClientError, ClientResult};
#[cfg(feature = "reqwest")]
pub use http::ReqwestClient;
pub use http::{error_from_response, HttpClient, HttpTransport, LoopbackClient};
pub use registry::{RouteTarget, StoreRegistry};
pub use route::{Route, View};
pub use state::{Action, Operation, StoreStatus, SyncState, Transition};
pub use store::{EntityStore, StoreEvent};
pub use transport::{EntityTransport, MockTransport};

//! # Gardonyi Protocol
//!
//! REST wire types and JSON codecs for the Gardonyi CMS API.
//!
//! This crate provides:
//! - `ListQuery` paging/sort parameters and their query-string form
//! - `ListResponse` carrying a page of records and the total count
//! - HTTP request/response envelopes independent of any HTTP library
//! - REST path building and parsing
//! - `ErrorBody`, the JSON error payload of the API
//! - The `LoopbackServer` seam used to reach a server in-process
//!
//! This is a pure protocol crate with no I/O operations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod codec;
mod error;
mod http;
mod messages;
mod path;
mod query;

pub use codec::{decode_json, encode_json};
pub use error::{ProtocolError, ProtocolResult};
pub use http::{
    HttpRequest, HttpResponse, LoopbackServer, Method, AUTHORIZATION_HEADER, TOTAL_COUNT_HEADER,
};
pub use messages::{ErrorBody, ListResponse};
pub use path::{ApiPath, DEFAULT_API_PREFIX};
pub use query::{Direction, ListQuery, Sort, DEFAULT_PAGE_SIZE};

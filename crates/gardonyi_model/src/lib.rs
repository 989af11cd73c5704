//! # Gardonyi Model
//!
//! Record types exchanged with the Gardonyi CMS API.
//!
//! This crate provides:
//! - `EntityId`, the server-assigned identifier
//! - The `Record` trait every entity type implements
//! - `Page` and `Post`
//! - Field validation
//!
//! This is a pure data crate with no I/O operations.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod id;
mod page;
mod post;
mod record;

pub use error::{ModelError, ModelResult};
pub use id::EntityId;
pub use page::Page;
pub use post::Post;
pub use record::{validate_length, Record, MAX_VARCHAR_LEN};

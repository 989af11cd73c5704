//! # Gardonyi Testkit
//!
//! Test utilities for the Gardonyi CMS admin.
//!
//! This crate provides:
//! - An in-process CMS fixture (server, loopback transport, stores)
//! - Sample content
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gardonyi_testkit::prelude::*;
//!
//! #[test]
//! fn lists_sample_pages() {
//!     let cms = TestCms::new();
//!     block_on(async {
//!         cms.seed(sample_pages()).await;
//!         assert_eq!(cms.pages().snapshot().total_items(), 3);
//!     });
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use generators::*;

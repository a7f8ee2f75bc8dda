//! Topolab Testing Infrastructure
//!
//! Shared helpers for the Topolab test suites: description builders,
//! ready-made fixtures, proptest strategies and an in-memory backend.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! topolab-testkit = { path = "../topolab-testkit" }
//! ```
//!
//! ```rust
//! use topolab_testkit::{DescriptionBuilder, MockBackend};
//! use topolab_core::{LinkType, NodeType};
//!
//! let description = DescriptionBuilder::new()
//!     .node(NodeType::Router, 1)
//!     .node(NodeType::Router, 2)
//!     .link((NodeType::Router, 1), (NodeType::Router, 2), LinkType::Backbone)
//!     .build();
//! let backend = MockBackend::new().with_preset("ring", description);
//! assert_eq!(backend.calls().len(), 0);
//! ```

pub mod builders;
pub mod fixtures;
pub mod mock_backend;
pub mod strategies;

pub use builders::DescriptionBuilder;
pub use fixtures::*;
pub use mock_backend::{BackendCall, MockBackend};

//! Topolab Core - Topology Model Layer
//!
//! Types shared by every Topolab crate:
//!
//! - Identities: `NodeType`, `NodeId` (`Type_index`), container names (`Type-index`)
//! - Wire types: `Node`, `Link`, `TopologyDescription`, `StartRequest`,
//!   `TopologyStateResponse`, `LinkParameterLookup`
//! - Model: `Topology` with its `IdentityAllocator`
//! - Experiments: `AttackPlan`/`AttackRequest`, `TxRateSample`
//!
//! # Example
//!
//! ```
//! use topolab_core::{LinkType, NodeType, Topology};
//!
//! let mut topology = Topology::new();
//! let r1 = topology.add_node(NodeType::Router, 0.0, 0.0).unwrap().id();
//! let r2 = topology.add_node(NodeType::Router, 120.0, 0.0).unwrap().id();
//! topology.add_link(r1, r2, LinkType::Backbone).unwrap();
//!
//! // The reverse orientation is the same pair.
//! assert!(topology.add_link(r2, r1, LinkType::Backbone).is_err());
//! ```

pub mod allocator;
pub mod attack;
pub mod description;
pub mod error;
pub mod link;
pub mod link_params;
pub mod node;
pub mod state;
pub mod topology;

pub use allocator::IdentityAllocator;
pub use attack::{AttackPlan, AttackRequest, AttackType, TxRateSample};
pub use description::{
    BlockchainType, SessionConfig, StartRequest, TopologyDescription, CUSTOM_NETWORK_ENV,
};
pub use error::{TopologyError, TopologyResult};
pub use link::{Link, LinkKey, LinkRecord, LinkType};
pub use link_params::{InterfaceParams, LinkParameterLookup, LinkParameters};
pub use node::{Node, NodeId, NodeType};
pub use state::{RunState, TopologyStateResponse};
pub use topology::{LoadReport, Topology};

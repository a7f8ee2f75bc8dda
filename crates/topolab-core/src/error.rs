//! Topology error types
//!
//! Structural and parsing errors raised by the topology model. None of these
//! are fatal to an editing session: every variant describes a request that was
//! refused while the model stayed valid.

use crate::node::{NodeId, NodeType};
use thiserror::Error;

/// Errors from topology model operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TopologyError {
    /// A link between the two nodes already exists in either orientation.
    #[error("cannot create multiple edges between two nodes ({source_id} <-> {target_id})")]
    DuplicateLink {
        /// Requested source endpoint
        source_id: NodeId,
        /// Requested target endpoint
        target_id: NodeId,
    },

    /// The link would connect a node to itself.
    #[error("cannot create an edge point to itself ({node})")]
    SelfLoop {
        /// The node the link would loop on
        node: NodeId,
    },

    /// A referenced node is not part of the topology.
    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    /// The referenced link does not exist.
    #[error("no link between {0} and {1}")]
    LinkNotFound(NodeId, NodeId),

    /// A node with this identity is already present.
    #[error("node {0} already exists")]
    NodeExists(NodeId),

    /// The topology has no nodes.
    #[error("topology must contain at least one node")]
    EmptyTopology,

    /// A string could not be parsed as a node identity.
    #[error("invalid node identity {identity:?}: {reason}")]
    InvalidIdentity {
        /// The offending identity string
        identity: String,
        /// Why parsing failed
        reason: String,
    },

    /// A node type name is not one of the supported types.
    #[error("unsupported node type {0:?}")]
    UnknownNodeType(String),

    /// A link type name is not `access` or `backbone`.
    #[error("unsupported link type {0:?}")]
    UnknownLinkType(String),

    /// Every index of a node type has been issued.
    #[error("no identities left for node type {0}")]
    IdentitiesExhausted(NodeType),

    /// The backend reported a state other than `up` or `down`.
    #[error("unsupported topology state {0:?}")]
    UnsupportedState(String),

    /// An attack plan the backend cannot run.
    #[error("invalid attack: {0}")]
    InvalidAttack(String),

    /// A description document could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl TopologyError {
    /// Create a duplicate link error.
    pub fn duplicate_link(source_id: NodeId, target_id: NodeId) -> Self {
        Self::DuplicateLink {
            source_id,
            target_id,
        }
    }

    /// Create a self-loop error.
    pub fn self_loop(node: NodeId) -> Self {
        Self::SelfLoop { node }
    }

    /// Create an invalid identity error.
    pub fn invalid_identity(identity: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidIdentity {
            identity: identity.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid attack error.
    pub fn invalid_attack(reason: impl Into<String>) -> Self {
        Self::InvalidAttack(reason.into())
    }

    /// Whether this error is a structural link rejection (duplicate or self-loop).
    pub fn is_link_rejection(&self) -> bool {
        matches!(self, Self::DuplicateLink { .. } | Self::SelfLoop { .. })
    }
}

impl From<serde_json::Error> for TopologyError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result alias for topology operations.
pub type TopologyResult<T> = Result<T, TopologyError>;

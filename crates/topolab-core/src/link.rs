//! Link types
//!
//! Links keep the orientation they were created with, but uniqueness is
//! judged on the unordered endpoint pair (see [`LinkKey`]).

use crate::error::TopologyError;
use crate::node::{Node, NodeId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Link class; decides bandwidth on the backend and line style on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    /// Host-to-router access link (thin line)
    Access,
    /// Router-to-router backbone link (thick line)
    Backbone,
}

impl LinkType {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkType::Access => "access",
            LinkType::Backbone => "backbone",
        }
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LinkType {
    type Err = TopologyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "access" => Ok(LinkType::Access),
            "backbone" => Ok(LinkType::Backbone),
            other => Err(TopologyError::UnknownLinkType(other.to_string())),
        }
    }
}

/// Unordered endpoint pair used for the one-link-per-pair invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkKey(NodeId, NodeId);

impl LinkKey {
    /// Build the key for two endpoints; argument order does not matter.
    pub fn new(a: NodeId, b: NodeId) -> Self {
        if a <= b {
            Self(a, b)
        } else {
            Self(b, a)
        }
    }

    /// Whether `node` is one of the endpoints.
    pub fn touches(&self, node: NodeId) -> bool {
        self.0 == node || self.1 == node
    }

    /// Endpoints in canonical order.
    pub fn endpoints(&self) -> (NodeId, NodeId) {
        (self.0, self.1)
    }
}

/// A link as stored in the topology model: endpoints by identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkRecord {
    /// Endpoint the link was drawn from
    pub source: NodeId,
    /// Endpoint the link was drawn to
    pub target: NodeId,
    /// Link class
    pub link_type: LinkType,
}

impl LinkRecord {
    /// Create a record.
    pub fn new(source: NodeId, target: NodeId, link_type: LinkType) -> Self {
        Self {
            source,
            target,
            link_type,
        }
    }

    /// Unordered key of this link.
    pub fn key(&self) -> LinkKey {
        LinkKey::new(self.source, self.target)
    }
}

/// A link in the shape exchanged with the backend: endpoints carry full
/// node records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Link {
    /// Source endpoint
    pub source_node: Node,
    /// Target endpoint
    pub target_node: Node,
    /// Link class
    pub link_type: LinkType,
}

impl Link {
    /// Create a wire link.
    pub fn new(source_node: Node, target_node: Node, link_type: LinkType) -> Self {
        Self {
            source_node,
            target_node,
            link_type,
        }
    }

    /// Identity-only view of this link.
    pub fn record(&self) -> LinkRecord {
        LinkRecord::new(self.source_node.id(), self.target_node.id(), self.link_type)
    }
}

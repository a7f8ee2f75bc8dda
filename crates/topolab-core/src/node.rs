//! Node types and identities
//!
//! A node is identified by its type plus a per-type index. The canonical
//! string form is `Type_index` (the editor identity); the backend addresses
//! running infrastructure by the hyphenated container name `Type-index`.

use crate::error::{TopologyError, TopologyResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Every kind of node the topology editor can place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeType {
    /// Network router
    Router,
    /// Plain end host
    NormalNode,
    /// Generic consensus participant
    ConsensusNode,
    /// ChainMaker blockchain node
    ChainMakerNode,
    /// Attacker-controlled node
    MaliciousNode,
    /// Local internet registry node
    LirNode,
    /// Hyperledger Fabric peer
    FabricPeerNode,
    /// Hyperledger Fabric orderer
    FabricOrderNode,
}

impl NodeType {
    /// All node types, in menu order.
    pub const ALL: [NodeType; 8] = [
        NodeType::Router,
        NodeType::NormalNode,
        NodeType::ConsensusNode,
        NodeType::ChainMakerNode,
        NodeType::MaliciousNode,
        NodeType::LirNode,
        NodeType::FabricPeerNode,
        NodeType::FabricOrderNode,
    ];

    /// Canonical name, identical to the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::Router => "Router",
            NodeType::NormalNode => "NormalNode",
            NodeType::ConsensusNode => "ConsensusNode",
            NodeType::ChainMakerNode => "ChainMakerNode",
            NodeType::MaliciousNode => "MaliciousNode",
            NodeType::LirNode => "LirNode",
            NodeType::FabricPeerNode => "FabricPeerNode",
            NodeType::FabricOrderNode => "FabricOrderNode",
        }
    }

    /// Icon asset rendered for nodes of this type.
    pub fn icon(&self) -> &'static str {
        match self {
            NodeType::Router => "./pictures/router.png",
            NodeType::NormalNode => "./pictures/normalNode.png",
            NodeType::ConsensusNode => "./pictures/consensusNode.png",
            NodeType::ChainMakerNode => "./pictures/chainMakerNode.png",
            NodeType::MaliciousNode => "./pictures/maliciousNode.png",
            NodeType::LirNode => "./pictures/lirNode.png",
            NodeType::FabricPeerNode => "./pictures/fabricPeerNode.png",
            NodeType::FabricOrderNode => "./pictures/fabricOrderNode.png",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeType {
    type Err = TopologyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodeType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| TopologyError::UnknownNodeType(s.to_string()))
    }
}

/// Identity of a node within one topology: `(type, index)`.
///
/// Indices start at 1. Ordering is by type first, then index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodeId {
    /// Node type
    pub node_type: NodeType,
    /// Per-type index, never zero
    pub index: u32,
}

impl NodeId {
    /// Create an identity from its parts.
    pub fn new(node_type: NodeType, index: u32) -> Self {
        Self { node_type, index }
    }

    /// Backend container name (`Type-index`).
    pub fn container_name(&self) -> String {
        format!("{}-{}", self.node_type, self.index)
    }

    /// Parse a backend container name (`Type-index`).
    pub fn from_container_name(name: &str) -> TopologyResult<Self> {
        let (type_part, index_part) = name
            .rsplit_once('-')
            .ok_or_else(|| TopologyError::invalid_identity(name, "missing '-' separator"))?;
        Self::from_parts(name, type_part, index_part)
    }

    fn from_parts(raw: &str, type_part: &str, index_part: &str) -> TopologyResult<Self> {
        let node_type = type_part.parse::<NodeType>()?;
        let index = index_part
            .parse::<u32>()
            .map_err(|e| TopologyError::invalid_identity(raw, format!("bad index: {e}")))?;
        if index == 0 {
            return Err(TopologyError::invalid_identity(raw, "index must be positive"));
        }
        Ok(Self { node_type, index })
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.node_type, self.index)
    }
}

impl FromStr for NodeId {
    type Err = TopologyError;

    /// Splits on the last underscore into type and index.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (type_part, index_part) = s
            .rsplit_once('_')
            .ok_or_else(|| TopologyError::invalid_identity(s, "missing '_' separator"))?;
        Self::from_parts(s, type_part, index_part)
    }
}

impl TryFrom<String> for NodeId {
    type Error = TopologyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<NodeId> for String {
    fn from(id: NodeId) -> Self {
        id.to_string()
    }
}

/// A positioned node, in the shape exchanged with the backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Per-type index
    pub index: u32,
    /// Node type
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// Horizontal canvas coordinate
    pub x: f64,
    /// Vertical canvas coordinate
    pub y: f64,
}

impl Node {
    /// Create a node for an identity at the given coordinates.
    pub fn new(id: NodeId, x: f64, y: f64) -> Self {
        Self {
            index: id.index,
            node_type: id.node_type,
            x,
            y,
        }
    }

    /// This node's identity.
    pub fn id(&self) -> NodeId {
        NodeId::new(self.node_type, self.index)
    }
}

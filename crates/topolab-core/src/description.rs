//! Canonical topology descriptions
//!
//! [`TopologyDescription`] is the transport form of a topology: the JSON
//! document exported to files, saved on the backend and replayed by a
//! rebuild. [`StartRequest`] is the same description merged with the session
//! configuration sent when a topology is started.

use crate::error::TopologyResult;
use crate::link::Link;
use crate::node::{Node, NodeType};
use serde::{Deserialize, Serialize};

/// Network environment name used when the operator builds a topology by hand.
pub const CUSTOM_NETWORK_ENV: &str = "custom";

/// Canonical `{ nodes, links }` description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopologyDescription {
    /// Nodes in creation order
    #[serde(default)]
    pub nodes: Vec<Node>,
    /// Links in creation order
    #[serde(default)]
    pub links: Vec<Link>,
}

impl TopologyDescription {
    /// Create a description from its parts.
    pub fn new(nodes: Vec<Node>, links: Vec<Link>) -> Self {
        Self { nodes, links }
    }

    /// Whether the description has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of nodes of the given type.
    pub fn count_of(&self, node_type: NodeType) -> usize {
        self.nodes.iter().filter(|n| n.node_type == node_type).count()
    }

    /// Parse a description from JSON text.
    pub fn from_json(text: &str) -> TopologyResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Encode as compact JSON (the form stored by the backend).
    pub fn to_json(&self) -> TopologyResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Encode as pretty-printed JSON (the form written to export files).
    pub fn to_json_pretty(&self) -> TopologyResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Blockchain family implied by the node types present.
    pub fn infer_blockchain(&self) -> BlockchainType {
        if self.count_of(NodeType::FabricOrderNode) > 0 {
            BlockchainType::Fabric
        } else if self.count_of(NodeType::ChainMakerNode) > 0 {
            BlockchainType::ChainMaker
        } else {
            BlockchainType::None
        }
    }
}

/// Blockchain family deployed on the consensus nodes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockchainType {
    /// ChainMaker
    #[default]
    #[serde(rename = "chainmaker", alias = "长安链")]
    ChainMaker,
    /// Hyperledger Fabric
    #[serde(rename = "fabric")]
    Fabric,
    /// No blockchain workload
    #[serde(rename = "")]
    None,
}

impl BlockchainType {
    /// Consensus protocols the backend supports for this family; the first
    /// entry is the default.
    pub fn consensus_options(&self) -> &'static [&'static str] {
        match self {
            BlockchainType::ChainMaker => &["TBFT", "RAFT"],
            BlockchainType::Fabric => &["BFT-SMaRt"],
            BlockchainType::None => &[],
        }
    }

    /// Default consensus protocol, empty when the family has none.
    pub fn default_consensus(&self) -> String {
        self.consensus_options()
            .first()
            .map(|c| (*c).to_string())
            .unwrap_or_default()
    }
}

/// Session-level parameters sent alongside the description on start.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Preset environment name, or [`CUSTOM_NETWORK_ENV`]
    pub network_env: String,
    /// Blockchain family
    pub blockchain_type: BlockchainType,
    /// Consensus protocol name
    pub consensus_type: String,
    /// Access link bandwidth in Mbps
    pub access_link_bandwidth: u32,
    /// CPU limit per consensus node
    pub consensus_node_cpu: u32,
    /// Memory limit per consensus node, in MB
    pub consensus_node_memory: u32,
    /// Consensus worker threads
    pub consensus_thread_count: u32,
    /// Whether defensive measures are enabled
    pub start_defence: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        let blockchain_type = BlockchainType::default();
        Self {
            network_env: CUSTOM_NETWORK_ENV.to_string(),
            consensus_type: blockchain_type.default_consensus(),
            blockchain_type,
            access_link_bandwidth: 8,
            consensus_node_cpu: 2,
            consensus_node_memory: 1024,
            consensus_thread_count: 25,
            start_defence: false,
        }
    }
}

impl SessionConfig {
    /// Switch blockchain family and reset the consensus protocol to its default.
    pub fn set_blockchain(&mut self, blockchain_type: BlockchainType) {
        self.blockchain_type = blockchain_type;
        self.consensus_type = blockchain_type.default_consensus();
    }
}

/// Payload of a start request: configuration merged with the description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StartRequest {
    /// Session parameters
    #[serde(flatten)]
    pub config: SessionConfig,
    /// Topology to deploy
    #[serde(flatten)]
    pub description: TopologyDescription,
}

impl StartRequest {
    /// Merge a description with session parameters.
    pub fn new(config: SessionConfig, description: TopologyDescription) -> Self {
        Self {
            config,
            description,
        }
    }
}

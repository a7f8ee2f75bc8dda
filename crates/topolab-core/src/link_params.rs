//! Link addressing metadata
//!
//! The backend reports, for every deployed link, the network segment and the
//! interface on each side. The editor only uses this to label edges, so a
//! missing entry is never an error.

use crate::node::NodeId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One side of a deployed link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceParams {
    /// Interface name inside the container
    #[serde(rename = "IfName", default)]
    pub if_name: String,
    /// IPv4 address assigned to the interface
    #[serde(rename = "source-ipv4", default)]
    pub ipv4: String,
}

/// Addressing metadata for one deployed link.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkParameters {
    /// IPv4 segment shared by both interfaces
    #[serde(rename = "network-segment-ipv4", default)]
    pub network_segment_ipv4: String,
    /// Interface on the source container
    #[serde(rename = "source-interface", default)]
    pub source_interface: InterfaceParams,
    /// Interface on the target container
    #[serde(rename = "target-interface", default)]
    pub target_interface: InterfaceParams,
}

impl LinkParameters {
    /// Multi-line edge label: segment, then one line per interface.
    pub fn label(&self) -> String {
        format!(
            "net: {}\n{}: {}\n{}: {}",
            self.network_segment_ipv4,
            self.source_interface.if_name,
            self.source_interface.ipv4,
            self.target_interface.if_name,
            self.target_interface.ipv4
        )
    }
}

/// Addressing metadata keyed by `(source container, target container)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkParameterLookup {
    entries: IndexMap<String, IndexMap<String, LinkParameters>>,
}

impl LinkParameterLookup {
    /// Create an empty lookup.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record parameters for a container pair in the given orientation.
    pub fn insert(
        &mut self,
        source_container: impl Into<String>,
        target_container: impl Into<String>,
        params: LinkParameters,
    ) {
        self.entries
            .entry(source_container.into())
            .or_default()
            .insert(target_container.into(), params);
    }

    /// Look up a container pair, trying the reverse orientation on a miss.
    pub fn get(&self, source_container: &str, target_container: &str) -> Option<&LinkParameters> {
        self.get_oriented(source_container, target_container)
            .or_else(|| self.get_oriented(target_container, source_container))
    }

    /// Look up the pair for two node identities.
    pub fn for_nodes(&self, source: NodeId, target: NodeId) -> Option<&LinkParameters> {
        self.get(&source.container_name(), &target.container_name())
    }

    /// Edge label for two node identities, if the backend reported one.
    pub fn label_for(&self, source: NodeId, target: NodeId) -> Option<String> {
        self.for_nodes(source, target).map(LinkParameters::label)
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.values().map(IndexMap::len).sum()
    }

    /// Whether no entries are recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get_oriented(&self, source: &str, target: &str) -> Option<&LinkParameters> {
        self.entries.get(source).and_then(|inner| inner.get(target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeType;

    fn sample() -> LinkParameters {
        LinkParameters {
            network_segment_ipv4: "10.0.0.0/30".to_string(),
            source_interface: InterfaceParams {
                if_name: "eth0".to_string(),
                ipv4: "10.0.0.1".to_string(),
            },
            target_interface: InterfaceParams {
                if_name: "eth1".to_string(),
                ipv4: "10.0.0.2".to_string(),
            },
        }
    }

    #[test]
    fn test_lookup_tries_both_orientations() {
        let mut lookup = LinkParameterLookup::new();
        lookup.insert("Router-1", "Router-2", sample());

        let a = NodeId::new(NodeType::Router, 1);
        let b = NodeId::new(NodeType::Router, 2);
        let c = NodeId::new(NodeType::Router, 3);
        assert!(lookup.for_nodes(a, b).is_some());
        assert!(lookup.for_nodes(b, a).is_some());
        assert!(lookup.for_nodes(a, c).is_none());
        assert_eq!(lookup.len(), 1);
    }

    #[test]
    fn test_label_format() {
        assert_eq!(
            sample().label(),
            "net: 10.0.0.0/30\neth0: 10.0.0.1\neth1: 10.0.0.2"
        );
    }

    #[test]
    fn test_wire_shape() {
        let json = serde_json::json!({
            "Router-1": {
                "NormalNode-1": {
                    "network-segment-ipv4": "10.0.1.0/30",
                    "source-interface": {"IfName": "r1-eth0", "source-ipv4": "10.0.1.1"},
                    "target-interface": {"IfName": "n1-eth0", "source-ipv4": "10.0.1.2"}
                }
            }
        });
        let lookup: LinkParameterLookup = serde_json::from_value(json).unwrap();
        let label = lookup
            .label_for(
                NodeId::new(NodeType::NormalNode, 1),
                NodeId::new(NodeType::Router, 1),
            )
            .unwrap();
        assert!(label.starts_with("net: 10.0.1.0/30"));
        assert!(label.contains("r1-eth0: 10.0.1.1"));
    }

    #[test]
    fn test_serialization_keeps_insertion_order() {
        let mut lookup = LinkParameterLookup::new();
        lookup.insert("Router-2", "Router-1", LinkParameters::default());
        lookup.insert("LirNode-1", "Router-2", LinkParameters::default());
        let json = serde_json::to_string(&lookup).unwrap();
        let first = json.find("Router-2").unwrap();
        let second = json.find("LirNode-1").unwrap();
        assert!(first < second);
    }
}

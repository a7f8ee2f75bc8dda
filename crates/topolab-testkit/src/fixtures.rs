//! Ready-made topologies, lookups and editors

use crate::builders::DescriptionBuilder;
use topolab_core::{
    InterfaceParams, LinkParameterLookup, LinkParameters, LinkType, NodeType, TopologyDescription,
};
use topolab_editor::{EditorConfig, MemoryCanvas, TopologyEditor};

/// Two routers joined by a backbone link.
pub fn router_pair() -> TopologyDescription {
    DescriptionBuilder::new()
        .node(NodeType::Router, 1)
        .node(NodeType::Router, 2)
        .link((NodeType::Router, 1), (NodeType::Router, 2), LinkType::Backbone)
        .build()
}

/// A small ChainMaker deployment: two routers, three chain nodes, an
/// attacker.
pub fn chainmaker_network() -> TopologyDescription {
    DescriptionBuilder::new()
        .node(NodeType::Router, 1)
        .node(NodeType::Router, 2)
        .node(NodeType::ChainMakerNode, 1)
        .node(NodeType::ChainMakerNode, 2)
        .node(NodeType::ChainMakerNode, 3)
        .node(NodeType::MaliciousNode, 1)
        .link((NodeType::Router, 1), (NodeType::Router, 2), LinkType::Backbone)
        .link((NodeType::ChainMakerNode, 1), (NodeType::Router, 1), LinkType::Access)
        .link((NodeType::ChainMakerNode, 2), (NodeType::Router, 1), LinkType::Access)
        .link((NodeType::ChainMakerNode, 3), (NodeType::Router, 2), LinkType::Access)
        .link((NodeType::MaliciousNode, 1), (NodeType::Router, 2), LinkType::Access)
        .build()
}

/// A Fabric deployment with one orderer and two peers behind one router.
pub fn fabric_network() -> TopologyDescription {
    DescriptionBuilder::new()
        .node(NodeType::Router, 1)
        .node(NodeType::FabricOrderNode, 1)
        .node(NodeType::FabricPeerNode, 1)
        .node(NodeType::FabricPeerNode, 2)
        .link((NodeType::FabricOrderNode, 1), (NodeType::Router, 1), LinkType::Access)
        .link((NodeType::FabricPeerNode, 1), (NodeType::Router, 1), LinkType::Access)
        .link((NodeType::FabricPeerNode, 2), (NodeType::Router, 1), LinkType::Access)
        .build()
}

/// Addressing metadata for every link of `description`, numbered in link
/// order and stored in the link's own orientation.
pub fn lookup_for(description: &TopologyDescription) -> LinkParameterLookup {
    let mut lookup = LinkParameterLookup::new();
    for (i, link) in description.links.iter().enumerate() {
        let record = link.record();
        lookup.insert(
            record.source.container_name(),
            record.target.container_name(),
            LinkParameters {
                network_segment_ipv4: format!("10.0.{i}.0/30"),
                source_interface: InterfaceParams {
                    if_name: "eth0".to_string(),
                    ipv4: format!("10.0.{i}.1"),
                },
                target_interface: InterfaceParams {
                    if_name: format!("eth{}", i + 1),
                    ipv4: format!("10.0.{i}.2"),
                },
            },
        );
    }
    lookup
}

/// Editor on a fresh headless canvas with default configuration.
pub fn memory_editor() -> TopologyEditor<MemoryCanvas> {
    TopologyEditor::new(MemoryCanvas::new(), EditorConfig::default())
}

/// Install a test subscriber once; later calls are no-ops.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

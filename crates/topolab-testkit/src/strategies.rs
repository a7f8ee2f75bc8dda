//! Property test strategies for Topolab types

use proptest::prelude::*;

// Re-export proptest for convenience
pub use proptest;

use std::collections::BTreeMap;
use topolab_core::{LinkType, Node, NodeId, NodeType, Topology, TopologyDescription};

/// Any node type.
pub fn arb_node_type() -> impl Strategy<Value = NodeType> {
    prop::sample::select(NodeType::ALL.to_vec())
}

/// Any link type.
pub fn arb_link_type() -> impl Strategy<Value = LinkType> {
    prop_oneof![Just(LinkType::Access), Just(LinkType::Backbone)]
}

/// A valid description: unique identities (with gaps, as after deletions),
/// no self-loops, no duplicate pairs, no dangling endpoints.
pub fn arb_description(max_nodes: usize) -> impl Strategy<Value = TopologyDescription> {
    let nodes = prop::collection::vec(
        (arb_node_type(), 1u32..3, -500.0f64..500.0, -500.0f64..500.0),
        0..=max_nodes,
    );
    let links = prop::collection::vec(
        (any::<prop::sample::Index>(), any::<prop::sample::Index>(), arb_link_type()),
        0..=max_nodes * 2,
    );
    (nodes, links).prop_map(|(nodes, links)| {
        let mut next: BTreeMap<NodeType, u32> = BTreeMap::new();
        let mut topology = Topology::new();
        for (node_type, gap, x, y) in nodes {
            let counter = next.entry(node_type).or_insert(0);
            *counter += gap;
            let _ = topology.insert_node(Node::new(NodeId::new(node_type, *counter), x, y));
        }
        let ids: Vec<NodeId> = topology.nodes().map(Node::id).collect();
        if !ids.is_empty() {
            for (a, b, link_type) in links {
                let _ = topology.add_link(*a.get(&ids), *b.get(&ids), link_type);
            }
        }
        topology.to_description()
    })
}

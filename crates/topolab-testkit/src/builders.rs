//! Description builder
//!
//! Builds descriptions with explicit identities, including malformed ones
//! (dangling links, repeated nodes) that the editor never produces itself.

use topolab_core::{Link, LinkType, Node, NodeId, NodeType, TopologyDescription};

/// Fluent builder for [`TopologyDescription`].
#[derive(Debug, Clone, Default)]
pub struct DescriptionBuilder {
    nodes: Vec<Node>,
    links: Vec<Link>,
    next_x: f64,
}

impl DescriptionBuilder {
    /// Start an empty description.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node, laid out left to right.
    pub fn node(mut self, node_type: NodeType, index: u32) -> Self {
        let x = self.next_x;
        self.next_x += 100.0;
        self.nodes
            .push(Node::new(NodeId::new(node_type, index), x, 0.0));
        self
    }

    /// Add a node at explicit coordinates.
    pub fn node_at(mut self, node_type: NodeType, index: u32, x: f64, y: f64) -> Self {
        self.nodes.push(Node::new(NodeId::new(node_type, index), x, y));
        self
    }

    /// Add a link. Endpoints not added as nodes are still written, at the
    /// origin, which makes the link dangling.
    pub fn link(
        mut self,
        source: (NodeType, u32),
        target: (NodeType, u32),
        link_type: LinkType,
    ) -> Self {
        let source = self.lookup(NodeId::new(source.0, source.1));
        let target = self.lookup(NodeId::new(target.0, target.1));
        self.links.push(Link::new(source, target, link_type));
        self
    }

    /// Finish.
    pub fn build(self) -> TopologyDescription {
        TopologyDescription::new(self.nodes, self.links)
    }

    fn lookup(&self, id: NodeId) -> Node {
        self.nodes
            .iter()
            .find(|n| n.id() == id)
            .copied()
            .unwrap_or_else(|| Node::new(id, 0.0, 0.0))
    }
}

//! Topology model
//!
//! The in-memory graph of nodes and links. Nodes live in an arena keyed by
//! identity and links refer to their endpoints by identity only, so the model
//! has no reference cycles and compares structurally.
//!
//! Invariants held after every public operation:
//! - `total_node_count() == nodes().count()`
//! - no link connects a node to itself
//! - at most one link per unordered endpoint pair
//! - every link endpoint is a present node

use crate::allocator::IdentityAllocator;
use crate::description::TopologyDescription;
use crate::error::{TopologyError, TopologyResult};
use crate::link::{Link, LinkKey, LinkRecord, LinkType};
use crate::node::{Node, NodeId, NodeType};
use indexmap::IndexMap;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Outcome of replaying a description into the model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    /// Nodes inserted
    pub nodes_loaded: usize,
    /// Links inserted
    pub links_loaded: usize,
    /// Links dropped, with the reason each was refused
    pub skipped_links: Vec<(Link, TopologyError)>,
}

impl LoadReport {
    /// Whether every link of the description was accepted.
    pub fn is_complete(&self) -> bool {
        self.skipped_links.is_empty()
    }
}

/// Node/link graph with per-type membership and identity allocation.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    nodes: IndexMap<NodeId, Node>,
    links: IndexMap<LinkKey, LinkRecord>,
    membership: BTreeMap<NodeType, Vec<NodeId>>,
    total_node_count: usize,
    allocator: IdentityAllocator,
}

impl Topology {
    /// Create an empty topology.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an identity and place a new node at `(x, y)`.
    ///
    /// Only fails when the type has no identities left.
    pub fn add_node(&mut self, node_type: NodeType, x: f64, y: f64) -> TopologyResult<Node> {
        let id = self.allocator.allocate(node_type)?;
        let node = Node::new(id, x, y);
        self.insert_unchecked(node);
        debug!(node = %id, x, y, "node added");
        Ok(node)
    }

    /// Insert a node that already carries an identity.
    ///
    /// The allocator is advanced past the node's index so later
    /// [`add_node`](Self::add_node) calls continue the sequence.
    pub fn insert_node(&mut self, node: Node) -> TopologyResult<()> {
        let id = node.id();
        if self.nodes.contains_key(&id) {
            return Err(TopologyError::NodeExists(id));
        }
        self.allocator.observe(id);
        self.insert_unchecked(node);
        debug!(node = %id, "node inserted");
        Ok(())
    }

    fn insert_unchecked(&mut self, node: Node) {
        let id = node.id();
        self.nodes.insert(id, node);
        self.membership.entry(id.node_type).or_default().push(id);
        self.total_node_count += 1;
    }

    /// Remove a node and every link touching it.
    ///
    /// Returns the removed node and the links removed with it.
    pub fn remove_node(&mut self, id: NodeId) -> TopologyResult<(Node, Vec<LinkRecord>)> {
        let node = self
            .nodes
            .shift_remove(&id)
            .ok_or(TopologyError::NodeNotFound(id))?;
        if let Some(members) = self.membership.get_mut(&id.node_type) {
            members.retain(|m| *m != id);
        }
        self.total_node_count -= 1;

        let touching: Vec<LinkKey> = self
            .links
            .keys()
            .filter(|key| key.touches(id))
            .copied()
            .collect();
        let removed: Vec<LinkRecord> = touching
            .iter()
            .filter_map(|key| self.links.shift_remove(key))
            .collect();

        debug!(node = %id, cascaded_links = removed.len(), "node removed");
        Ok((node, removed))
    }

    /// Update a node's coordinates.
    pub fn move_node(&mut self, id: NodeId, x: f64, y: f64) -> TopologyResult<()> {
        let node = self
            .nodes
            .get_mut(&id)
            .ok_or(TopologyError::NodeNotFound(id))?;
        node.x = x;
        node.y = y;
        Ok(())
    }

    /// Connect two nodes.
    ///
    /// Refused when the endpoints are equal, when either endpoint is absent,
    /// or when the pair is already connected in either orientation. A refused
    /// request leaves the model untouched.
    pub fn add_link(
        &mut self,
        source: NodeId,
        target: NodeId,
        link_type: LinkType,
    ) -> TopologyResult<LinkRecord> {
        if source == target {
            return Err(TopologyError::self_loop(source));
        }
        for endpoint in [source, target] {
            if !self.nodes.contains_key(&endpoint) {
                return Err(TopologyError::NodeNotFound(endpoint));
            }
        }
        let record = LinkRecord::new(source, target, link_type);
        let key = record.key();
        if self.links.contains_key(&key) {
            return Err(TopologyError::duplicate_link(source, target));
        }
        self.links.insert(key, record);
        debug!(%source, %target, %link_type, "link added");
        Ok(record)
    }

    /// Remove the link between two nodes, in whichever orientation it was stored.
    pub fn remove_link(&mut self, a: NodeId, b: NodeId) -> Option<LinkRecord> {
        let removed = self.links.shift_remove(&LinkKey::new(a, b));
        if let Some(record) = &removed {
            debug!(source = %record.source, target = %record.target, "link removed");
        }
        removed
    }

    /// Drop every node and link. Identity counters are left alone; see
    /// [`reset`](Self::reset).
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.links.clear();
        self.membership.clear();
        self.total_node_count = 0;
    }

    /// [`clear`](Self::clear) and restart every identity sequence.
    pub fn reset(&mut self) {
        self.clear();
        self.allocator.reset();
    }

    /// Look up a node.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Whether a node is present.
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Links in insertion order.
    pub fn links(&self) -> impl Iterator<Item = &LinkRecord> {
        self.links.values()
    }

    /// The link connecting two nodes, in either orientation.
    pub fn link_between(&self, a: NodeId, b: NodeId) -> Option<&LinkRecord> {
        self.links.get(&LinkKey::new(a, b))
    }

    /// Links with `id` as an endpoint.
    pub fn links_touching(&self, id: NodeId) -> impl Iterator<Item = &LinkRecord> {
        self.links.iter().filter(move |(key, _)| key.touches(id)).map(|(_, l)| l)
    }

    /// Identities of the nodes of one type, in creation order.
    pub fn members(&self, node_type: NodeType) -> &[NodeId] {
        self.membership
            .get(&node_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of nodes.
    pub fn total_node_count(&self) -> usize {
        self.total_node_count
    }

    /// Number of links.
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Whether there are no nodes.
    pub fn is_empty(&self) -> bool {
        self.total_node_count == 0
    }

    /// Identity counters of this topology.
    pub fn allocator(&self) -> &IdentityAllocator {
        &self.allocator
    }

    /// Canonical description of the current graph.
    pub fn to_description(&self) -> TopologyDescription {
        let nodes = self.nodes.values().copied().collect();
        let links = self
            .links
            .values()
            .filter_map(|record| {
                let source = self.nodes.get(&record.source)?;
                let target = self.nodes.get(&record.target)?;
                Some(Link::new(*source, *target, record.link_type))
            })
            .collect();
        TopologyDescription::new(nodes, links)
    }

    /// Replace the graph with a description, preserving its identities.
    ///
    /// Identity counters are reset and then advanced to the highest index per
    /// type. A repeated node entry updates the earlier one's coordinates.
    /// Links that would break an invariant are skipped and reported; they
    /// never abort the load.
    pub fn load_description(&mut self, description: &TopologyDescription) -> LoadReport {
        self.reset();
        let mut report = LoadReport::default();

        for node in &description.nodes {
            match self.insert_node(*node) {
                Ok(()) => report.nodes_loaded += 1,
                Err(TopologyError::NodeExists(id)) => {
                    warn!(node = %id, "repeated node entry in description");
                    // Cannot fail: the node was just found to exist.
                    let _ = self.move_node(id, node.x, node.y);
                }
                Err(err) => warn!(error = %err, "node not loaded"),
            }
        }

        for link in &description.links {
            let record = link.record();
            match self.add_link(record.source, record.target, record.link_type) {
                Ok(_) => report.links_loaded += 1,
                Err(err) => {
                    warn!(
                        source = %record.source,
                        target = %record.target,
                        error = %err,
                        "skipping link"
                    );
                    report.skipped_links.push((*link, err));
                }
            }
        }
        report
    }

    /// Structural equality ignoring coordinates and link orientation.
    pub fn same_structure(&self, other: &Topology) -> bool {
        self.nodes.len() == other.nodes.len()
            && self.nodes.keys().all(|id| other.nodes.contains_key(id))
            && self.links.len() == other.links.len()
            && self.links.iter().all(|(key, record)| {
                other
                    .links
                    .get(key)
                    .is_some_and(|o| o.link_type == record.link_type)
            })
    }
}

//! Canvas Adapter
//!
//! The boundary to the graph rendering surface. The editor never touches a
//! concrete surface; it drives one through [`CanvasEffects`] and reacts to
//! the raw [`CanvasEvent`]s the surface reports.
//!
//! Canvas identities are plain strings (`Type_index` for nodes), exactly as
//! a rendering surface stores them. Parsing them back into
//! [`NodeId`](topolab_core::NodeId) is the serializer's job.
//!
//! Two surface hazards shape this interface:
//! - an edge is materialized optimistically and announced through
//!   [`CanvasEvent::EdgeCreated`] before it has settled, so it must not be
//!   removed from within the handler of that event
//! - freshly added nodes are not registered until the surface settles, so
//!   edges referencing them must wait

mod memory;

pub use memory::MemoryCanvas;

use crate::error::CanvasError;
use serde::{Deserialize, Serialize};
use std::fmt;
use topolab_core::{LinkType, Node};

/// Label fill of a node whose topology is deployed.
pub const RUNNING_LABEL_FILL: &str = "#4fde07";
/// Label fill of a node whose topology is not deployed.
pub const IDLE_LABEL_FILL: &str = "#de0707";
/// Rendered node size.
pub const NODE_SIZE: u32 = 40;

/// Surface-assigned edge identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EdgeId(pub u64);

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "edge-{}", self.0)
    }
}

/// Line style of an edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeStyle {
    /// Stroke color
    pub stroke: String,
    /// Line width in pixels
    pub line_width: u32,
}

impl EdgeStyle {
    /// Thin green line drawn for access links.
    pub fn access() -> Self {
        Self {
            stroke: "#0bef1e".to_string(),
            line_width: 2,
        }
    }

    /// Thick blue line drawn for backbone links.
    pub fn backbone() -> Self {
        Self {
            stroke: "#0b39ef".to_string(),
            line_width: 5,
        }
    }

    /// Style of a link type.
    pub fn for_link_type(link_type: LinkType) -> Self {
        match link_type {
            LinkType::Access => Self::access(),
            LinkType::Backbone => Self::backbone(),
        }
    }

    /// Link type implied by the line width alone.
    pub fn implied_link_type(&self) -> Option<LinkType> {
        match self.line_width {
            2 => Some(LinkType::Access),
            5 => Some(LinkType::Backbone),
            _ => None,
        }
    }
}

/// A drawn node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeVisual {
    /// Identity string (`Type_index`)
    pub id: String,
    /// Horizontal position
    pub x: f64,
    /// Vertical position
    pub y: f64,
    /// Icon asset
    pub icon: String,
    /// Label text
    pub label: String,
    /// Label background color
    pub label_fill: String,
    /// Rendered size
    pub size: u32,
}

impl NodeVisual {
    /// Visual for a model node; the label color encodes the running state.
    pub fn for_node(node: &Node, running: bool) -> Self {
        let id = node.id().to_string();
        Self {
            label: id.clone(),
            id,
            x: node.x,
            y: node.y,
            icon: node.node_type.icon().to_string(),
            label_fill: if running {
                RUNNING_LABEL_FILL
            } else {
                IDLE_LABEL_FILL
            }
            .to_string(),
            size: NODE_SIZE,
        }
    }
}

/// Request to draw an edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeSpec {
    /// Source node identity string
    pub source: String,
    /// Target node identity string
    pub target: String,
    /// Line style
    pub style: EdgeStyle,
    /// Optional text label
    pub label: Option<String>,
    /// Link type carried as edge metadata
    pub link_type: Option<LinkType>,
}

impl EdgeSpec {
    /// Edge for a typed link, styled by its type.
    pub fn typed(source: impl Into<String>, target: impl Into<String>, link_type: LinkType) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            style: EdgeStyle::for_link_type(link_type),
            label: None,
            link_type: Some(link_type),
        }
    }

    /// Attach a label.
    pub fn with_label(mut self, label: Option<String>) -> Self {
        self.label = label;
        self
    }
}

/// A drawn edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeVisual {
    /// Surface identity
    pub id: EdgeId,
    /// Source node identity string
    pub source: String,
    /// Target node identity string
    pub target: String,
    /// Line style
    pub style: EdgeStyle,
    /// Optional text label
    pub label: Option<String>,
    /// Link type carried as edge metadata
    pub link_type: Option<LinkType>,
}

impl EdgeVisual {
    /// Whether the edge connects `a` and `b` in either orientation.
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }

    /// Whether both ends are the same node.
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// Node context menu entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeMenuAction {
    /// Open a remote shell on the node's container
    OpenShell,
    /// Delete the node
    DeleteNode,
    /// Pause the node's container
    PauseNode,
}

impl NodeMenuAction {
    /// Every node action, in menu order.
    pub const ALL: [NodeMenuAction; 3] = [
        NodeMenuAction::OpenShell,
        NodeMenuAction::DeleteNode,
        NodeMenuAction::PauseNode,
    ];
}

/// Edge context menu entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeMenuAction {
    /// Delete the edge
    DeleteEdge,
}

impl EdgeMenuAction {
    /// Every edge action, in menu order.
    pub const ALL: [EdgeMenuAction; 1] = [EdgeMenuAction::DeleteEdge];
}

/// Raw notifications raised by the surface.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    /// An edge was drawn interactively and has not settled yet.
    EdgeCreated {
        /// New edge
        edge: EdgeId,
        /// Source node identity string
        source: String,
        /// Target node identity string
        target: String,
    },
    /// A node was dragged.
    NodeMoved {
        /// Node identity string
        id: String,
        /// New horizontal position
        x: f64,
        /// New vertical position
        y: f64,
    },
    /// A node context menu entry was clicked.
    NodeMenu {
        /// Node identity string
        node: String,
        /// Clicked entry
        action: NodeMenuAction,
    },
    /// An edge context menu entry was clicked.
    EdgeMenu {
        /// Clicked edge
        edge: EdgeId,
        /// Clicked entry
        action: EdgeMenuAction,
    },
}

/// Operations the editor needs from a rendering surface.
pub trait CanvasEffects {
    /// Draw a node. It is not registered until the next [`settle`](Self::settle).
    fn add_node(&mut self, node: NodeVisual) -> Result<(), CanvasError>;

    /// Move a drawn node.
    fn move_node(&mut self, id: &str, x: f64, y: f64) -> Result<(), CanvasError>;

    /// Remove a node and every edge touching it; returns the removed edges.
    fn remove_node(&mut self, id: &str) -> Result<Vec<EdgeVisual>, CanvasError>;

    /// Draw an edge between two registered nodes.
    fn add_edge(&mut self, spec: EdgeSpec) -> Result<EdgeId, CanvasError>;

    /// Remove an edge.
    fn remove_edge(&mut self, id: EdgeId) -> Result<EdgeVisual, CanvasError>;

    /// Remove every node and edge. Raw events not yet taken refer to the
    /// removed graph and are dropped with it.
    fn clear(&mut self);

    /// Drawn nodes in drawing order.
    fn nodes(&self) -> Vec<NodeVisual>;

    /// Drawn edges in drawing order.
    fn edges(&self) -> Vec<EdgeVisual>;

    /// Style and link type given to interactively drawn edges.
    fn set_default_edge_style(&mut self, style: EdgeStyle, link_type: LinkType);

    /// Drain pending raw events.
    fn take_events(&mut self) -> Vec<CanvasEvent>;

    /// Finish internal bookkeeping for everything added so far.
    fn settle(&mut self);

    /// Install the node and edge context menus.
    fn attach_context_menus(&mut self, node_actions: &[NodeMenuAction], edge_actions: &[EdgeMenuAction]);

    /// Look up one edge.
    fn edge(&self, id: EdgeId) -> Option<EdgeVisual> {
        self.edges().into_iter().find(|e| e.id == id)
    }

    /// Edges connecting `a` and `b` in either orientation.
    fn edges_between(&self, a: &str, b: &str) -> Vec<EdgeVisual> {
        self.edges().into_iter().filter(|e| e.connects(a, b)).collect()
    }

    /// Edges whose endpoints coincide.
    fn self_loops(&self) -> Vec<EdgeVisual> {
        self.edges().into_iter().filter(EdgeVisual::is_self_loop).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use topolab_core::{NodeId, NodeType};

    #[test]
    fn test_styles_by_link_type() {
        assert_eq!(EdgeStyle::for_link_type(LinkType::Access).line_width, 2);
        assert_eq!(EdgeStyle::for_link_type(LinkType::Backbone).line_width, 5);
        assert_eq!(EdgeStyle::backbone().implied_link_type(), Some(LinkType::Backbone));
        let odd = EdgeStyle {
            stroke: "#000000".to_string(),
            line_width: 3,
        };
        assert_eq!(odd.implied_link_type(), None);
    }

    #[test]
    fn test_label_fill_follows_running_state() {
        let node = Node::new(NodeId::new(NodeType::LirNode, 3), 1.0, 2.0);
        let idle = NodeVisual::for_node(&node, false);
        let running = NodeVisual::for_node(&node, true);
        assert_eq!(idle.id, "LirNode_3");
        assert_eq!(idle.icon, "./pictures/lirNode.png");
        assert_eq!(idle.label_fill, IDLE_LABEL_FILL);
        assert_eq!(running.label_fill, RUNNING_LABEL_FILL);
    }
}

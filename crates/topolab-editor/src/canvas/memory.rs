//! Headless rendering surface
//!
//! Keeps drawn nodes and edges in insertion order and reproduces the
//! surface hazards the editor has to cope with: unregistered nodes until
//! [`settle`](CanvasEffects::settle), and interactively drawn edges that
//! cannot be removed until they have settled.

use super::{
    CanvasEffects, CanvasEvent, EdgeId, EdgeMenuAction, EdgeSpec, EdgeStyle, EdgeVisual,
    NodeMenuAction, NodeVisual,
};
use crate::error::CanvasError;
use indexmap::{IndexMap, IndexSet};
use topolab_core::LinkType;
use tracing::trace;

/// In-memory [`CanvasEffects`] implementation.
#[derive(Debug, Clone)]
pub struct MemoryCanvas {
    nodes: IndexMap<String, NodeVisual>,
    edges: IndexMap<EdgeId, EdgeVisual>,
    registered: IndexSet<String>,
    unsettled_edges: IndexSet<EdgeId>,
    events: Vec<CanvasEvent>,
    next_edge: u64,
    default_style: EdgeStyle,
    default_link_type: LinkType,
    node_actions: Vec<NodeMenuAction>,
    edge_actions: Vec<EdgeMenuAction>,
}

impl Default for MemoryCanvas {
    fn default() -> Self {
        Self {
            nodes: IndexMap::new(),
            edges: IndexMap::new(),
            registered: IndexSet::new(),
            unsettled_edges: IndexSet::new(),
            events: Vec::new(),
            next_edge: 1,
            default_style: EdgeStyle::backbone(),
            default_link_type: LinkType::Backbone,
            node_actions: Vec::new(),
            edge_actions: Vec::new(),
        }
    }
}

impl MemoryCanvas {
    /// Create an empty canvas.
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw an edge the way an operator does: optimistically, with the
    /// default style, announced through a raw [`CanvasEvent::EdgeCreated`].
    pub fn draw_edge(&mut self, source: &str, target: &str) -> Result<EdgeId, CanvasError> {
        let spec = EdgeSpec {
            source: source.to_string(),
            target: target.to_string(),
            style: self.default_style.clone(),
            label: None,
            link_type: Some(self.default_link_type),
        };
        let id = self.insert_edge(spec)?;
        self.unsettled_edges.insert(id);
        self.events.push(CanvasEvent::EdgeCreated {
            edge: id,
            source: source.to_string(),
            target: target.to_string(),
        });
        Ok(id)
    }

    /// Drag a node and report the move.
    pub fn drag_node(&mut self, id: &str, x: f64, y: f64) -> Result<(), CanvasError> {
        self.move_node(id, x, y)?;
        self.events.push(CanvasEvent::NodeMoved {
            id: id.to_string(),
            x,
            y,
        });
        Ok(())
    }

    /// Click a node context menu entry.
    pub fn click_node_menu(&mut self, node: &str, action: NodeMenuAction) -> Result<(), CanvasError> {
        if !self.nodes.contains_key(node) {
            return Err(CanvasError::NodeNotFound(node.to_string()));
        }
        if !self.node_actions.contains(&action) {
            return Err(CanvasError::MenuNotAttached(format!("{action:?}")));
        }
        self.events.push(CanvasEvent::NodeMenu {
            node: node.to_string(),
            action,
        });
        Ok(())
    }

    /// Click an edge context menu entry.
    pub fn click_edge_menu(&mut self, edge: EdgeId, action: EdgeMenuAction) -> Result<(), CanvasError> {
        if !self.edges.contains_key(&edge) {
            return Err(CanvasError::EdgeNotFound(edge.0));
        }
        if !self.edge_actions.contains(&action) {
            return Err(CanvasError::MenuNotAttached(format!("{action:?}")));
        }
        self.events.push(CanvasEvent::EdgeMenu { edge, action });
        Ok(())
    }

    /// Look up a drawn node.
    pub fn node(&self, id: &str) -> Option<&NodeVisual> {
        self.nodes.get(id)
    }

    /// Whether a node has been registered by a settle.
    pub fn is_registered(&self, id: &str) -> bool {
        self.registered.contains(id)
    }

    /// Number of drawn nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of drawn edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Default style of interactively drawn edges.
    pub fn default_edge_style(&self) -> (&EdgeStyle, LinkType) {
        (&self.default_style, self.default_link_type)
    }

    /// Overwrite an edge's style without touching its metadata.
    pub fn restyle_edge(&mut self, id: EdgeId, style: EdgeStyle) -> Result<(), CanvasError> {
        let edge = self.edges.get_mut(&id).ok_or(CanvasError::EdgeNotFound(id.0))?;
        edge.style = style;
        Ok(())
    }

    /// Drop an edge's link-type metadata, leaving only its style.
    pub fn strip_edge_metadata(&mut self, id: EdgeId) -> Result<(), CanvasError> {
        let edge = self.edges.get_mut(&id).ok_or(CanvasError::EdgeNotFound(id.0))?;
        edge.link_type = None;
        Ok(())
    }

    fn insert_edge(&mut self, spec: EdgeSpec) -> Result<EdgeId, CanvasError> {
        for end in [&spec.source, &spec.target] {
            if !self.nodes.contains_key(end.as_str()) {
                return Err(CanvasError::NodeNotFound(end.clone()));
            }
            if !self.registered.contains(end.as_str()) {
                return Err(CanvasError::NodeNotRegistered(end.clone()));
            }
        }
        let id = EdgeId(self.next_edge);
        self.next_edge += 1;
        trace!(edge = %id, source = %spec.source, target = %spec.target, "edge drawn");
        self.edges.insert(
            id,
            EdgeVisual {
                id,
                source: spec.source,
                target: spec.target,
                style: spec.style,
                label: spec.label,
                link_type: spec.link_type,
            },
        );
        Ok(id)
    }
}

impl CanvasEffects for MemoryCanvas {
    fn add_node(&mut self, node: NodeVisual) -> Result<(), CanvasError> {
        if self.nodes.contains_key(&node.id) {
            return Err(CanvasError::NodeExists(node.id));
        }
        trace!(node = %node.id, "node drawn");
        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    fn move_node(&mut self, id: &str, x: f64, y: f64) -> Result<(), CanvasError> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| CanvasError::NodeNotFound(id.to_string()))?;
        node.x = x;
        node.y = y;
        Ok(())
    }

    fn remove_node(&mut self, id: &str) -> Result<Vec<EdgeVisual>, CanvasError> {
        if self.nodes.shift_remove(id).is_none() {
            return Err(CanvasError::NodeNotFound(id.to_string()));
        }
        self.registered.shift_remove(id);
        let touching: Vec<EdgeId> = self
            .edges
            .values()
            .filter(|e| e.source == id || e.target == id)
            .map(|e| e.id)
            .collect();
        let removed = touching
            .into_iter()
            .filter_map(|edge| {
                self.unsettled_edges.shift_remove(&edge);
                self.edges.shift_remove(&edge)
            })
            .collect();
        Ok(removed)
    }

    fn add_edge(&mut self, spec: EdgeSpec) -> Result<EdgeId, CanvasError> {
        self.insert_edge(spec)
    }

    fn remove_edge(&mut self, id: EdgeId) -> Result<EdgeVisual, CanvasError> {
        if self.unsettled_edges.contains(&id) {
            return Err(CanvasError::Reentrant(format!(
                "{id} is still being created"
            )));
        }
        self.edges.shift_remove(&id).ok_or(CanvasError::EdgeNotFound(id.0))
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.registered.clear();
        self.unsettled_edges.clear();
        self.events.clear();
    }

    fn nodes(&self) -> Vec<NodeVisual> {
        self.nodes.values().cloned().collect()
    }

    fn edges(&self) -> Vec<EdgeVisual> {
        self.edges.values().cloned().collect()
    }

    fn set_default_edge_style(&mut self, style: EdgeStyle, link_type: LinkType) {
        self.default_style = style;
        self.default_link_type = link_type;
    }

    fn take_events(&mut self) -> Vec<CanvasEvent> {
        std::mem::take(&mut self.events)
    }

    fn settle(&mut self) {
        let pending: Vec<String> = self
            .nodes
            .keys()
            .filter(|id| !self.registered.contains(id.as_str()))
            .cloned()
            .collect();
        self.registered.extend(pending);
        self.unsettled_edges.clear();
    }

    fn attach_context_menus(&mut self, node_actions: &[NodeMenuAction], edge_actions: &[EdgeMenuAction]) {
        self.node_actions = node_actions.to_vec();
        self.edge_actions = edge_actions.to_vec();
    }

    fn edge(&self, id: EdgeId) -> Option<EdgeVisual> {
        self.edges.get(&id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use topolab_core::{Node, NodeId, NodeType};

    fn visual(t: NodeType, i: u32) -> NodeVisual {
        NodeVisual::for_node(&Node::new(NodeId::new(t, i), 0.0, 0.0), false)
    }

    fn canvas_with_routers() -> MemoryCanvas {
        let mut canvas = MemoryCanvas::new();
        canvas.add_node(visual(NodeType::Router, 1)).unwrap();
        canvas.add_node(visual(NodeType::Router, 2)).unwrap();
        canvas.settle();
        canvas
    }

    #[test]
    fn test_edges_wait_for_registration() {
        let mut canvas = MemoryCanvas::new();
        canvas.add_node(visual(NodeType::Router, 1)).unwrap();
        canvas.add_node(visual(NodeType::Router, 2)).unwrap();
        assert_matches!(
            canvas.add_edge(EdgeSpec::typed("Router_1", "Router_2", LinkType::Access)),
            Err(CanvasError::NodeNotRegistered(_))
        );
        canvas.settle();
        assert!(canvas
            .add_edge(EdgeSpec::typed("Router_1", "Router_2", LinkType::Access))
            .is_ok());
    }

    #[test]
    fn test_drawn_edge_is_not_removable_until_settled() {
        let mut canvas = canvas_with_routers();
        let edge = canvas.draw_edge("Router_1", "Router_2").unwrap();
        assert_matches!(
            canvas.take_events().as_slice(),
            [CanvasEvent::EdgeCreated { edge: e, .. }] if *e == edge
        );
        assert_matches!(canvas.remove_edge(edge), Err(CanvasError::Reentrant(_)));
        canvas.settle();
        assert!(canvas.remove_edge(edge).is_ok());
    }

    #[test]
    fn test_drawn_edge_uses_default_style() {
        let mut canvas = canvas_with_routers();
        canvas.set_default_edge_style(EdgeStyle::access(), LinkType::Access);
        let edge = canvas.draw_edge("Router_2", "Router_1").unwrap();
        let drawn = canvas.edge(edge).unwrap();
        assert_eq!(drawn.style, EdgeStyle::access());
        assert_eq!(drawn.link_type, Some(LinkType::Access));
    }

    #[test]
    fn test_remove_node_takes_its_edges() {
        let mut canvas = canvas_with_routers();
        canvas.add_node(visual(NodeType::NormalNode, 1)).unwrap();
        canvas.settle();
        canvas
            .add_edge(EdgeSpec::typed("Router_1", "Router_2", LinkType::Backbone))
            .unwrap();
        canvas
            .add_edge(EdgeSpec::typed("NormalNode_1", "Router_2", LinkType::Access))
            .unwrap();

        let removed = canvas.remove_node("Router_2").unwrap();
        assert_eq!(removed.len(), 2);
        assert_eq!(canvas.edge_count(), 0);
        assert_eq!(canvas.node_count(), 2);
    }

    #[test]
    fn test_edge_queries() {
        let mut canvas = canvas_with_routers();
        canvas.draw_edge("Router_1", "Router_2").unwrap();
        canvas.draw_edge("Router_2", "Router_1").unwrap();
        canvas.draw_edge("Router_1", "Router_1").unwrap();
        assert_eq!(canvas.edges_between("Router_1", "Router_2").len(), 2);
        assert_eq!(canvas.self_loops().len(), 1);
    }

    #[test]
    fn test_menus_must_be_attached() {
        let mut canvas = canvas_with_routers();
        assert_matches!(
            canvas.click_node_menu("Router_1", NodeMenuAction::DeleteNode),
            Err(CanvasError::MenuNotAttached(_))
        );
        canvas.attach_context_menus(&NodeMenuAction::ALL, &EdgeMenuAction::ALL);
        canvas
            .click_node_menu("Router_1", NodeMenuAction::DeleteNode)
            .unwrap();
        assert_matches!(
            canvas.click_node_menu("Router_9", NodeMenuAction::DeleteNode),
            Err(CanvasError::NodeNotFound(_))
        );
        assert_eq!(canvas.take_events().len(), 1);
    }

    #[test]
    fn test_clear_drops_pending_events() {
        let mut canvas = canvas_with_routers();
        canvas.draw_edge("Router_1", "Router_2").unwrap();
        canvas.clear();
        assert!(canvas.take_events().is_empty());
        assert_eq!(canvas.edge_count(), 0);
    }
}

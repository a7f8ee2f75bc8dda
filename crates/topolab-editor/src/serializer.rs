//! Serializer
//!
//! Walks what the surface currently shows and emits the canonical
//! description. Node identities are parsed back from their strings; an
//! edge's link type comes from its metadata when present and otherwise from
//! its rendered line width.

use crate::canvas::{CanvasEffects, EdgeVisual};
use crate::error::{EditorError, EditorResult};
use indexmap::IndexMap;
use std::str::FromStr;
use topolab_core::{
    Link, LinkType, Node, NodeId, SessionConfig, StartRequest, TopologyDescription, TopologyError,
};

/// Link type of a drawn edge.
pub fn link_type_of(edge: &EdgeVisual) -> EditorResult<LinkType> {
    if let Some(link_type) = edge.link_type {
        return Ok(link_type);
    }
    edge.style
        .implied_link_type()
        .ok_or(EditorError::UnrecognizedEdgeStyle {
            edge: edge.id.0,
            line_width: edge.style.line_width,
        })
}

/// Describe what the surface shows.
pub fn serialize<C: CanvasEffects + ?Sized>(canvas: &C) -> EditorResult<TopologyDescription> {
    let mut by_identity: IndexMap<String, Node> = IndexMap::new();
    for visual in canvas.nodes() {
        let id = NodeId::from_str(&visual.id)?;
        by_identity.insert(visual.id, Node::new(id, visual.x, visual.y));
    }

    let mut links = Vec::new();
    for edge in canvas.edges() {
        let link_type = link_type_of(&edge)?;
        let source = resolve(&by_identity, &edge.source)?;
        let target = resolve(&by_identity, &edge.target)?;
        links.push(Link::new(source, target, link_type));
    }

    let nodes: Vec<Node> = by_identity.into_values().collect();
    tracing::debug!(nodes = nodes.len(), links = links.len(), "serialized canvas");
    Ok(TopologyDescription::new(nodes, links))
}

/// Description merged with session parameters, as sent on start.
///
/// An empty surface is refused before anything is sent.
pub fn start_request<C: CanvasEffects + ?Sized>(
    canvas: &C,
    config: &SessionConfig,
) -> EditorResult<StartRequest> {
    let description = serialize(canvas)?;
    if description.is_empty() {
        return Err(TopologyError::EmptyTopology.into());
    }
    Ok(StartRequest::new(config.clone(), description))
}

fn resolve(by_identity: &IndexMap<String, Node>, identity: &str) -> EditorResult<Node> {
    match by_identity.get(identity) {
        Some(node) => Ok(*node),
        None => Err(TopologyError::NodeNotFound(NodeId::from_str(identity)?).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{EdgeSpec, EdgeStyle, MemoryCanvas, NodeVisual};
    use assert_matches::assert_matches;
    use topolab_core::NodeType;

    fn draw(canvas: &mut MemoryCanvas, t: NodeType, i: u32, x: f64, y: f64) {
        let node = Node::new(NodeId::new(t, i), x, y);
        canvas.add_node(NodeVisual::for_node(&node, false)).unwrap();
    }

    #[test]
    fn test_serialize_reads_positions_and_types() {
        let mut canvas = MemoryCanvas::new();
        draw(&mut canvas, NodeType::Router, 1, 10.0, 20.0);
        draw(&mut canvas, NodeType::ConsensusNode, 4, 30.0, 40.0);
        canvas.settle();
        canvas
            .add_edge(EdgeSpec::typed("ConsensusNode_4", "Router_1", LinkType::Access))
            .unwrap();
        canvas.move_node("Router_1", 11.0, 21.0).unwrap();

        let description = serialize(&canvas).unwrap();
        assert_eq!(description.nodes[0].x, 11.0);
        assert_eq!(description.nodes[1].index, 4);
        assert_eq!(description.links.len(), 1);
        assert_eq!(description.links[0].source_node.node_type, NodeType::ConsensusNode);
        assert_eq!(description.links[0].link_type, LinkType::Access);
    }

    #[test]
    fn test_link_type_falls_back_to_line_width() {
        let mut canvas = MemoryCanvas::new();
        draw(&mut canvas, NodeType::Router, 1, 0.0, 0.0);
        draw(&mut canvas, NodeType::Router, 2, 0.0, 0.0);
        canvas.settle();
        let edge = canvas
            .add_edge(EdgeSpec::typed("Router_1", "Router_2", LinkType::Access))
            .unwrap();
        canvas.strip_edge_metadata(edge).unwrap();
        assert_eq!(serialize(&canvas).unwrap().links[0].link_type, LinkType::Access);

        canvas
            .restyle_edge(
                edge,
                EdgeStyle {
                    stroke: "#ffffff".to_string(),
                    line_width: 3,
                },
            )
            .unwrap();
        assert_matches!(
            serialize(&canvas),
            Err(EditorError::UnrecognizedEdgeStyle { line_width: 3, .. })
        );
    }

    #[test]
    fn test_metadata_wins_over_style() {
        let mut canvas = MemoryCanvas::new();
        draw(&mut canvas, NodeType::Router, 1, 0.0, 0.0);
        draw(&mut canvas, NodeType::Router, 2, 0.0, 0.0);
        canvas.settle();
        let edge = canvas
            .add_edge(EdgeSpec::typed("Router_1", "Router_2", LinkType::Backbone))
            .unwrap();
        canvas.restyle_edge(edge, EdgeStyle::access()).unwrap();
        assert_eq!(serialize(&canvas).unwrap().links[0].link_type, LinkType::Backbone);
    }

    #[test]
    fn test_start_request_refuses_empty_canvas() {
        let canvas = MemoryCanvas::new();
        assert_matches!(
            start_request(&canvas, &SessionConfig::default()),
            Err(EditorError::Topology(TopologyError::EmptyTopology))
        );
    }

    #[test]
    fn test_unparseable_identity_is_an_error() {
        let mut canvas = MemoryCanvas::new();
        let mut visual = NodeVisual::for_node(
            &Node::new(NodeId::new(NodeType::Router, 1), 0.0, 0.0),
            false,
        );
        visual.id = "Switch_1".to_string();
        canvas.add_node(visual).unwrap();
        assert_matches!(
            serialize(&canvas),
            Err(EditorError::Topology(TopologyError::UnknownNodeType(_)))
        );
    }
}

//! Rebuild Pipeline
//!
//! Replaces the whole graph with one reconstructed from a description, in
//! two phases. The node phase runs at once; the link phase is deferred
//! until the surface has registered the new nodes.
//!
//! Identities are preserved: each node is inserted with the identity it
//! carries, and the identity counters continue after the highest index seen
//! per type.

use crate::canvas::{CanvasEffects, EdgeSpec, NodeVisual};
use crate::error::EditorError;
use topolab_core::{Link, LinkParameterLookup, Topology, TopologyDescription, TopologyError};
use tracing::{debug, info, warn};

/// A description link that was not reproduced.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedLink {
    /// The link as described
    pub link: Link,
    /// Why it was dropped
    pub reason: EditorError,
}

/// Outcome of one rebuild.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RebuildReport {
    /// Rebuild sequence number
    pub generation: u64,
    /// Whether nodes were drawn in the running color
    pub running: bool,
    /// Nodes drawn
    pub nodes_created: usize,
    /// Repeated node entries folded into an earlier one
    pub repeated_nodes: usize,
    /// Links drawn
    pub links_created: usize,
    /// Links drawn with an addressing label
    pub labeled_links: usize,
    /// Links dropped
    pub skipped_links: Vec<SkippedLink>,
    /// Whether the link phase is still waiting to run
    pub links_pending: bool,
}

impl RebuildReport {
    /// Whether both phases ran and nothing was dropped.
    pub fn is_complete(&self) -> bool {
        !self.links_pending && self.skipped_links.is_empty()
    }
}

/// Links waiting for the deferred phase of a rebuild.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingLinks {
    /// Rebuild the links belong to
    pub generation: u64,
    /// Links in description order
    pub links: Vec<Link>,
    /// Addressing metadata used for labels
    pub lookup: Option<LinkParameterLookup>,
}

/// Clear the model and the surface, then draw every described node.
pub fn build_nodes<C: CanvasEffects + ?Sized>(
    topology: &mut Topology,
    canvas: &mut C,
    description: &TopologyDescription,
    report: &mut RebuildReport,
) {
    topology.reset();
    canvas.clear();

    for node in &description.nodes {
        let id = node.id();
        match topology.insert_node(*node) {
            Ok(()) => match canvas.add_node(NodeVisual::for_node(node, report.running)) {
                Ok(()) => report.nodes_created += 1,
                Err(err) => warn!(node = %id, error = %err, "surface refused rebuilt node"),
            },
            Err(TopologyError::NodeExists(_)) => {
                warn!(node = %id, "repeated node entry; keeping the last position");
                report.repeated_nodes += 1;
                let _ = topology.move_node(id, node.x, node.y);
                if let Err(err) = canvas.move_node(&id.to_string(), node.x, node.y) {
                    warn!(node = %id, error = %err, "could not move repeated node");
                }
            }
            Err(err) => warn!(node = %id, error = %err, "node not rebuilt"),
        }
    }
    debug!(
        generation = report.generation,
        nodes = report.nodes_created,
        "rebuild node phase done"
    );
}

/// Draw the links of a rebuild. A link that cannot be reproduced is skipped
/// and recorded; it never stops the others.
pub fn build_links<C: CanvasEffects + ?Sized>(
    topology: &mut Topology,
    canvas: &mut C,
    pending: &PendingLinks,
    report: &mut RebuildReport,
) {
    for link in &pending.links {
        let record = link.record();
        if let Err(err) = topology.add_link(record.source, record.target, record.link_type) {
            warn!(
                source = %record.source,
                target = %record.target,
                error = %err,
                "skipping rebuilt link"
            );
            report.skipped_links.push(SkippedLink {
                link: *link,
                reason: err.into(),
            });
            continue;
        }

        let label = pending
            .lookup
            .as_ref()
            .and_then(|lookup| lookup.label_for(record.source, record.target));
        let labeled = label.is_some();
        let spec = EdgeSpec::typed(
            record.source.to_string(),
            record.target.to_string(),
            record.link_type,
        )
        .with_label(label);

        match canvas.add_edge(spec) {
            Ok(_) => {
                report.links_created += 1;
                if labeled {
                    report.labeled_links += 1;
                }
            }
            Err(err) => {
                warn!(
                    source = %record.source,
                    target = %record.target,
                    error = %err,
                    "surface refused rebuilt link"
                );
                topology.remove_link(record.source, record.target);
                report.skipped_links.push(SkippedLink {
                    link: *link,
                    reason: err.into(),
                });
            }
        }
    }
    report.links_pending = false;
    info!(
        generation = report.generation,
        nodes = report.nodes_created,
        links = report.links_created,
        skipped = report.skipped_links.len(),
        "rebuild finished"
    );
}

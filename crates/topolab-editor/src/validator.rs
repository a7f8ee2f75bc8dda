//! Edge Validator
//!
//! Gate between the surface's raw "edge created" notification and the
//! topology model. By the time the notification arrives the surface already
//! holds the new edge, so the checks count what is drawn:
//!
//! - two or more edges between the pair means the new one is a duplicate
//! - a drawn self-loop means the new edge points at its own source
//!
//! Both checks run independently. A refused edge is never removed here;
//! the caller schedules its retraction for a later turn.

use crate::canvas::{CanvasEffects, EdgeId};
use std::fmt;

/// Message shown when a second edge is drawn between two nodes.
pub const DUPLICATE_EDGE_MESSAGE: &str = "cannot create multiple edges between two nodes";
/// Message shown when an edge is drawn from a node to itself.
pub const SELF_LOOP_MESSAGE: &str = "cannot create an edge point to itself";

/// Why a drawn edge was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeRejection {
    /// Another edge already connects the pair
    Duplicate,
    /// Both ends are the same node
    SelfLoop,
}

impl EdgeRejection {
    /// Operator-facing message.
    pub fn message(&self) -> &'static str {
        match self {
            EdgeRejection::Duplicate => DUPLICATE_EDGE_MESSAGE,
            EdgeRejection::SelfLoop => SELF_LOOP_MESSAGE,
        }
    }
}

impl fmt::Display for EdgeRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Outcome of validating one drawn edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeVerdict {
    /// The edge under review
    pub edge: EdgeId,
    /// Reasons it was refused; empty when accepted
    pub rejections: Vec<EdgeRejection>,
}

impl EdgeVerdict {
    /// Whether the edge may enter the model.
    pub fn is_accepted(&self) -> bool {
        self.rejections.is_empty()
    }
}

/// Inspect a freshly drawn edge against what the surface holds.
pub fn validate_new_edge<C: CanvasEffects + ?Sized>(
    canvas: &C,
    edge: EdgeId,
    source: &str,
    target: &str,
) -> EdgeVerdict {
    let mut rejections = Vec::new();

    if source != target && canvas.edges_between(source, target).len() >= 2 {
        rejections.push(EdgeRejection::Duplicate);
    }

    if canvas.self_loops().iter().any(|e| e.id == edge) {
        rejections.push(EdgeRejection::SelfLoop);
    }

    EdgeVerdict { edge, rejections }
}

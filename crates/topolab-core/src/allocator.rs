//! Identity allocation
//!
//! One monotonic counter per node type. Counters only move forward while a
//! session is open, so an identity freed by a deletion is never handed out
//! again.

use crate::error::{TopologyError, TopologyResult};
use crate::node::{NodeId, NodeType};
use std::collections::BTreeMap;

/// Per-type identity counters owned by a single topology.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityAllocator {
    counters: BTreeMap<NodeType, u32>,
}

impl IdentityAllocator {
    /// Create an allocator with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next identity for `node_type`.
    ///
    /// Fails once the counter has reached `u32::MAX`, which only happens
    /// after observing a description that used the largest index.
    pub fn allocate(&mut self, node_type: NodeType) -> TopologyResult<NodeId> {
        let counter = self.counters.entry(node_type).or_insert(0);
        let next = counter
            .checked_add(1)
            .ok_or(TopologyError::IdentitiesExhausted(node_type))?;
        *counter = next;
        Ok(NodeId::new(node_type, next))
    }

    /// Advance the counter for `id`'s type so it is at least `id.index`.
    ///
    /// Used while replaying a description so later allocations continue
    /// after the highest index seen.
    pub fn observe(&mut self, id: NodeId) {
        let counter = self.counters.entry(id.node_type).or_insert(0);
        if id.index > *counter {
            *counter = id.index;
        }
    }

    /// Highest index issued or observed for `node_type` (0 if none).
    pub fn last_issued(&self, node_type: NodeType) -> u32 {
        self.counters.get(&node_type).copied().unwrap_or(0)
    }

    /// Reset every counter to zero.
    pub fn reset(&mut self) {
        self.counters.clear();
    }
}

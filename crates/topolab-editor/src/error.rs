//! Editor error types
//!
//! Three families, none fatal to a session:
//! - structural errors (`Topology`, `TopologyRunning`, unrecognized styles),
//!   detected locally and never sent to the backend
//! - backend errors, surfaced to the operator with the model left unchanged
//! - canvas errors, raised when the rendering surface refuses a request

use thiserror::Error;
use topolab_core::{NodeId, TopologyError};

/// Errors raised by a rendering surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CanvasError {
    /// The node is not on the canvas.
    #[error("canvas node {0:?} not found")]
    NodeNotFound(String),

    /// The edge is not on the canvas.
    #[error("canvas edge {0} not found")]
    EdgeNotFound(u64),

    /// A node with this identity is already drawn.
    #[error("canvas node {0:?} already exists")]
    NodeExists(String),

    /// The node was added but the surface has not registered it yet.
    #[error("canvas node {0:?} is not registered yet")]
    NodeNotRegistered(String),

    /// The surface is still inside its own mutation for this item.
    #[error("reentrant canvas mutation: {0}")]
    Reentrant(String),

    /// No context menu with this action is attached.
    #[error("context menu action {0:?} is not attached")]
    MenuNotAttached(String),
}

/// Errors from the backend service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The request could not be delivered.
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend answered with a failure.
    #[error("backend rejected {operation}: {message}")]
    Rejected {
        /// Operation name
        operation: String,
        /// Backend message
        message: String,
    },

    /// The backend reply could not be decoded.
    #[error("malformed backend response: {0}")]
    Malformed(String),
}

impl BackendError {
    /// Create a rejection error.
    pub fn rejected(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rejected {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

/// Errors loading or validating editor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("failed to read config file {path}: {message}")]
    Io {
        /// File path
        path: String,
        /// OS error text
        message: String,
    },

    /// The file is not valid TOML for this configuration.
    #[error("failed to parse config file: {0}")]
    Parse(String),

    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Errors from editor operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditorError {
    /// Structural model error
    #[error(transparent)]
    Topology(#[from] TopologyError),

    /// Rendering surface error
    #[error(transparent)]
    Canvas(#[from] CanvasError),

    /// Backend error
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Structural edits are disabled while the topology runs.
    #[error("topology is running; stop it before editing")]
    TopologyRunning,

    /// The operation needs a running topology.
    #[error("topology is not running")]
    TopologyNotRunning,

    /// An edge carries neither link-type metadata nor a known line width.
    #[error("edge {edge} has unrecognized line width {line_width}")]
    UnrecognizedEdgeStyle {
        /// Canvas edge id
        edge: u64,
        /// Rendered line width
        line_width: u32,
    },

    /// The backend reported no management port for the node's container.
    #[error("no management port known for {0}")]
    NoPortForNode(NodeId),

    /// An attack is still running.
    #[error("an attack is already in progress")]
    AttackInProgress,
}

/// Result alias for editor operations.
pub type EditorResult<T> = Result<T, EditorError>;

#[cfg(test)]
mod tests {
    use super::*;
    use topolab_core::NodeType;

    #[test]
    fn test_error_display() {
        let err = EditorError::from(TopologyError::EmptyTopology);
        assert!(err.to_string().contains("at least one node"));

        let err = EditorError::from(BackendError::rejected("startTopology", "busy"));
        assert!(err.to_string().contains("startTopology"));
        assert!(err.to_string().contains("busy"));

        let err = EditorError::NoPortForNode(NodeId::new(NodeType::Router, 4));
        assert!(err.to_string().contains("Router_4"));
    }
}

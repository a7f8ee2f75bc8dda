//! Topolab Editor - Interactive Topology Editing
//!
//! Everything between an operator's gestures on a graph surface and the
//! backend that deploys the result:
//!
//! - **Canvas adapter**: [`CanvasEffects`] and the headless [`MemoryCanvas`]
//! - **Edge validation**: duplicate and self-loop edges are refused and
//!   retracted on a later turn
//! - **Serializer**: drawn graph to [`TopologyDescription`](topolab_core::TopologyDescription)
//! - **Rebuild pipeline**: description back to a drawn graph, links deferred
//! - **Session**: start/stop/save/resume against a [`TopologyBackend`]
//!
//! # Example
//!
//! ```
//! use topolab_core::NodeType;
//! use topolab_editor::{EditorConfig, MemoryCanvas, TopologyEditor};
//!
//! let mut editor = TopologyEditor::new(MemoryCanvas::new(), EditorConfig::default());
//! let a = editor.add_node(NodeType::Router, 0.0, 0.0).unwrap();
//! let b = editor.add_node(NodeType::Router, 80.0, 0.0).unwrap();
//! editor.turn();
//!
//! editor.canvas_mut().draw_edge(&a.to_string(), &b.to_string()).unwrap();
//! editor.canvas_mut().draw_edge(&b.to_string(), &a.to_string()).unwrap();
//! editor.run_until_idle();
//!
//! assert_eq!(editor.topology().link_count(), 1);
//! assert_eq!(editor.canvas().edge_count(), 1);
//! ```

pub mod backend;
pub mod canvas;
pub mod config;
pub mod editor;
pub mod error;
pub mod poller;
pub mod queue;
pub mod rebuild;
pub mod serializer;
pub mod session;
pub mod validator;

pub use backend::TopologyBackend;
pub use canvas::{
    CanvasEffects, CanvasEvent, EdgeId, EdgeMenuAction, EdgeSpec, EdgeStyle, EdgeVisual,
    MemoryCanvas, NodeMenuAction, NodeVisual,
};
pub use config::EditorConfig;
pub use editor::{EditorRequest, Notice, NoticeLevel, TopologyEditor};
pub use error::{BackendError, CanvasError, ConfigError, EditorError, EditorResult};
pub use poller::StatePoller;
pub use queue::{CommandQueue, Deferred, EditorCommand};
pub use rebuild::{RebuildReport, SkippedLink};
pub use session::{EditorSession, ShellTarget};
pub use validator::{EdgeRejection, EdgeVerdict};

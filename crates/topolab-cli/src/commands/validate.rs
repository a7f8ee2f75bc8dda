//! `topolab validate`
//!
//! Replays a file through the rebuild pipeline and reports whatever the
//! editor would have dropped.

use super::{load_description, rebuild_headless};
use anyhow::Result;
use std::fmt::Write;
use std::path::Path;
use topolab_editor::EditorConfig;

/// Validation result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    /// Human-readable report
    pub report: String,
    /// Links and repeated nodes the rebuild dropped
    pub problems: usize,
}

impl Validation {
    /// Whether the file rebuilds without loss.
    pub fn is_clean(&self) -> bool {
        self.problems == 0
    }
}

/// Validate a description file.
pub fn run(path: &Path, config: &EditorConfig) -> Result<Validation> {
    let description = load_description(path)?;
    let editor = rebuild_headless(&description, config);

    let mut report = String::new();
    let mut problems = 0;
    if let Some(rebuild) = editor.last_rebuild() {
        let _ = writeln!(
            report,
            "rebuilt {} node(s), {} link(s)",
            rebuild.nodes_created, rebuild.links_created
        );
        if rebuild.repeated_nodes > 0 {
            let _ = writeln!(report, "repeated node entries: {}", rebuild.repeated_nodes);
            problems += rebuild.repeated_nodes;
        }
        for skipped in &rebuild.skipped_links {
            let _ = writeln!(
                report,
                "dropped link {} -> {} ({}): {}",
                skipped.link.source_node.id(),
                skipped.link.target_node.id(),
                skipped.link.link_type,
                skipped.reason
            );
        }
        problems += rebuild.skipped_links.len();
    }
    if problems == 0 {
        let _ = writeln!(report, "ok");
    }
    tracing::debug!(path = %path.display(), problems, "validated");
    Ok(Validation { report, problems })
}

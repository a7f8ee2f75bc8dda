//! Offline topology commands
//!
//! Each command reads topology JSON from disk, works on a headless editor
//! and returns the text to print.

pub mod inspect;
pub mod label;
pub mod normalize;
pub mod validate;

use anyhow::{Context, Result};
use std::path::Path;
use topolab_core::TopologyDescription;
use topolab_editor::{EditorConfig, MemoryCanvas, TopologyEditor};

/// Read and parse a description file.
pub fn load_description(path: &Path) -> Result<TopologyDescription> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    TopologyDescription::from_json(&text)
        .with_context(|| format!("{} is not a topology description", path.display()))
}

/// Rebuild a description on a headless canvas and let every deferred step
/// run.
pub fn rebuild_headless(
    description: &TopologyDescription,
    config: &EditorConfig,
) -> TopologyEditor<MemoryCanvas> {
    let mut editor = TopologyEditor::new(MemoryCanvas::new(), config.clone());
    editor.rebuild(description, false, None);
    editor.run_until_idle();
    editor
}

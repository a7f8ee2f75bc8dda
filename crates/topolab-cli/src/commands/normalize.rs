//! `topolab normalize`

use super::{load_description, rebuild_headless};
use anyhow::{Context, Result};
use std::path::Path;
use topolab_editor::EditorConfig;

/// Rebuild a file and serialize it back in canonical form. Invalid links
/// and repeated nodes are dropped on the way. Writes to `output` when
/// given and returns the JSON either way.
pub fn run(path: &Path, output: Option<&Path>, config: &EditorConfig) -> Result<String> {
    let description = load_description(path)?;
    let editor = rebuild_headless(&description, config);
    let json = editor.export_json()?;
    if let Some(output) = output {
        std::fs::write(output, &json)
            .with_context(|| format!("failed to write {}", output.display()))?;
        tracing::info!(output = %output.display(), "normalized topology written");
    }
    Ok(json)
}

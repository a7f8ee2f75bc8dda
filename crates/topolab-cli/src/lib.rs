//! Topolab CLI Library
//!
//! Offline tooling over topology description files. The binary in
//! `main.rs` is a thin clap front end over [`commands`].

pub mod commands;

use anyhow::{Context, Result};
use std::path::Path;
use topolab_editor::EditorConfig;

/// Load the editor configuration; a missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<EditorConfig> {
    EditorConfig::load_from_file(path)
        .with_context(|| format!("invalid configuration in {}", path.display()))
}

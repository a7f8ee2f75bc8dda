//! `topolab label`

use super::load_description;
use anyhow::{Context, Result};
use std::fmt::Write;
use std::path::Path;
use topolab_core::LinkParameterLookup;

/// Print every link of a description with its addressing label.
pub fn run(path: &Path, links: &Path) -> Result<String> {
    let description = load_description(path)?;
    let text = std::fs::read_to_string(links)
        .with_context(|| format!("failed to read {}", links.display()))?;
    let lookup: LinkParameterLookup = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a link parameter map", links.display()))?;

    let mut out = String::new();
    for link in &description.links {
        let record = link.record();
        let _ = writeln!(out, "{} -> {} ({})", record.source, record.target, record.link_type);
        match lookup.label_for(record.source, record.target) {
            Some(label) => {
                for line in label.lines() {
                    let _ = writeln!(out, "    {line}");
                }
            }
            None => {
                let _ = writeln!(out, "    (no addressing data)");
            }
        }
    }
    Ok(out)
}

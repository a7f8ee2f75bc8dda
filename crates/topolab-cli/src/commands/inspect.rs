//! `topolab inspect`

use super::load_description;
use anyhow::Result;
use std::fmt::Write;
use std::path::Path;
use topolab_core::{BlockchainType, LinkType, NodeType, TopologyDescription};

/// Summarize a description file.
pub fn run(path: &Path) -> Result<String> {
    let description = load_description(path)?;
    Ok(summarize(&description))
}

/// Per-type node counts, link counts by type and the implied blockchain.
pub fn summarize(description: &TopologyDescription) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "nodes: {}", description.nodes.len());
    for node_type in NodeType::ALL {
        let count = description.count_of(node_type);
        if count > 0 {
            let _ = writeln!(out, "  {node_type}: {count}");
        }
    }

    let _ = writeln!(out, "links: {}", description.links.len());
    for link_type in [LinkType::Access, LinkType::Backbone] {
        let count = description
            .links
            .iter()
            .filter(|l| l.link_type == link_type)
            .count();
        let _ = writeln!(out, "  {link_type}: {count}");
    }

    let blockchain = match description.infer_blockchain() {
        BlockchainType::ChainMaker => "chainmaker",
        BlockchainType::Fabric => "fabric",
        BlockchainType::None => "none",
    };
    let _ = writeln!(out, "blockchain: {blockchain}");
    out
}

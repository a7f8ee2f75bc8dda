//! CLI Command Tests
//!
//! Runs each offline command against description files written to a
//! temporary directory.

#![allow(clippy::unwrap_used)]

use std::path::PathBuf;
use tempfile::TempDir;
use topolab_cli::commands::{inspect, label, normalize, validate};
use topolab_cli::load_config;
use topolab_core::{LinkType, NodeType, TopologyDescription};
use topolab_editor::EditorConfig;
use topolab_testkit::{chainmaker_network, fabric_network, lookup_for, DescriptionBuilder};

fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

fn write_description(dir: &TempDir, name: &str, description: &TopologyDescription) -> PathBuf {
    write(dir, name, &description.to_json_pretty().unwrap())
}

#[test]
fn test_inspect_counts() {
    let dir = TempDir::new().unwrap();
    let path = write_description(&dir, "fabric.json", &fabric_network());
    let out = inspect::run(&path).unwrap();
    assert!(out.contains("nodes: 4"));
    assert!(out.contains("FabricPeerNode: 2"));
    assert!(out.contains("access: 3"));
    assert!(out.contains("backbone: 0"));
    assert!(out.contains("blockchain: fabric"));
}

#[test]
fn test_inspect_missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let err = inspect::run(&dir.path().join("absent.json")).unwrap_err();
    assert!(err.to_string().contains("failed to read"));
}

#[test]
fn test_validate_clean_file() {
    let dir = TempDir::new().unwrap();
    let path = write_description(&dir, "cm.json", &chainmaker_network());
    let validation = validate::run(&path, &EditorConfig::default()).unwrap();
    assert!(validation.is_clean());
    assert!(validation.report.contains("rebuilt 6 node(s), 5 link(s)"));
}

#[test]
fn test_validate_reports_dropped_links() {
    let dir = TempDir::new().unwrap();
    let description = DescriptionBuilder::new()
        .node(NodeType::Router, 1)
        .node(NodeType::Router, 2)
        .node(NodeType::Router, 2)
        .link((NodeType::Router, 1), (NodeType::Router, 2), LinkType::Backbone)
        .link((NodeType::Router, 2), (NodeType::Router, 1), LinkType::Access)
        .link((NodeType::Router, 1), (NodeType::LirNode, 1), LinkType::Access)
        .build();
    let path = write_description(&dir, "broken.json", &description);

    let validation = validate::run(&path, &EditorConfig::default()).unwrap();
    assert_eq!(validation.problems, 3);
    assert!(validation.report.contains("repeated node entries: 1"));
    assert!(validation.report.contains("dropped link Router_2 -> Router_1"));
    assert!(validation.report.contains("LirNode_1"));
}

#[test]
fn test_normalize_writes_canonical_json() {
    let dir = TempDir::new().unwrap();
    let description = DescriptionBuilder::new()
        .node_at(NodeType::Router, 3, 1.0, 2.0)
        .node_at(NodeType::NormalNode, 1, 3.0, 4.0)
        .link((NodeType::NormalNode, 1), (NodeType::Router, 3), LinkType::Access)
        .link((NodeType::NormalNode, 1), (NodeType::NormalNode, 1), LinkType::Access)
        .build();
    let path = write(&dir, "in.json", &description.to_json().unwrap());
    let out = dir.path().join("out.json");

    let json = normalize::run(&path, Some(&out), &EditorConfig::default()).unwrap();
    let written = std::fs::read_to_string(&out).unwrap();
    assert_eq!(json, written);

    let normalized = TopologyDescription::from_json(&written).unwrap();
    assert_eq!(normalized.nodes, description.nodes);
    assert_eq!(normalized.links.len(), 1);
    assert_eq!(normalized.links[0], description.links[0]);
}

#[test]
fn test_label_uses_lookup() {
    let dir = TempDir::new().unwrap();
    let description = chainmaker_network();
    let mut lookup = lookup_for(&description);
    let path = write_description(&dir, "cm.json", &description);

    let links = write(&dir, "links.json", &serde_json::to_string(&lookup).unwrap());
    let out = label::run(&path, &links).unwrap();
    assert!(out.contains("Router_1 -> Router_2 (backbone)"));
    assert!(out.contains("    net: 10.0.0.0/30"));
    assert!(!out.contains("no addressing data"));

    lookup = topolab_core::LinkParameterLookup::new();
    let empty = write(&dir, "empty.json", &serde_json::to_string(&lookup).unwrap());
    let out = label::run(&path, &empty).unwrap();
    assert_eq!(out.matches("(no addressing data)").count(), 5);
}

#[test]
fn test_config_file_is_optional() {
    let dir = TempDir::new().unwrap();
    let config = load_config(&dir.path().join("topolab.toml")).unwrap();
    assert_eq!(config, EditorConfig::default());

    let path = write(&dir, "topolab.toml", "rebuild_link_delay_ms = 5\n");
    assert_eq!(load_config(&path).unwrap().rebuild_link_delay_ms, 5);

    let bad = write(&dir, "bad.toml", "canvas_width = \"wide\"\n");
    assert!(load_config(&bad).is_err());
}

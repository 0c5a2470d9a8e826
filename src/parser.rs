//! JSON graph files.
//!
//! A graph file is one object in outgoing orientation:
//!
//! ```json
//! { "S1": { "S2": 4.0, "S3": 7.5 }, "S2": { "S1": 4.0 } }
//! ```
//!
//! Nodes that only appear as neighbors are added without outgoing edges.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::graph::{Adjacency, NamedGraph};
use crate::solver::Arborescence;

pub fn parse_graph(content: &str) -> Result<NamedGraph> {
    let adjacency: Adjacency =
        serde_json::from_str(content).context("Graph must be a JSON object of weighted edges")?;
    Ok(NamedGraph::from_adjacency(&adjacency))
}

pub fn load_graph(path: &Path) -> Result<NamedGraph> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read graph: {}", path.display()))?;
    parse_graph(&content).with_context(|| format!("Failed to parse graph: {}", path.display()))
}

pub fn save_graph(path: &Path, graph: &NamedGraph) -> Result<()> {
    let content = serde_json::to_string_pretty(&graph.adjacency())?;
    fs::write(path, content).with_context(|| format!("Failed to write graph: {}", path.display()))
}

/// Writes the tree as pretty JSON: root, weight, contraction count and the
/// `parent -> {child: weight}` edge map.
pub fn save_arborescence(path: &Path, tree: &Arborescence) -> Result<()> {
    let content = serde_json::to_string_pretty(tree).context("Failed to serialize tree")?;
    fs::write(path, content).with_context(|| format!("Failed to write tree: {}", path.display()))
}

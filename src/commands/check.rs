use anyhow::Result;
use rdmst::check::check_graph;
use rdmst::parser::load_graph;
use std::path::Path;

pub fn run(graph_path: &Path, root: &str, json: bool) -> Result<()> {
    let graph = load_graph(graph_path)?;
    let result = check_graph(&graph, root)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if result.ok {
        println!(
            "OK: '{}' reaches all {} nodes ({} edges)",
            result.root, result.node_count, result.edge_count
        );
    } else {
        eprintln!(
            "Error: '{}' cannot reach {} of {} nodes:",
            result.root,
            result.unreachable.len(),
            result.node_count
        );
        for node in &result.unreachable {
            eprintln!("  {}", node);
        }
    }

    if !result.ok {
        anyhow::bail!("Graph is infeasible from root '{}'", root);
    }
    Ok(())
}

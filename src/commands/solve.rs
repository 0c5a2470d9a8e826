use anyhow::{Context, Result};
use rdmst::parser::{load_graph, save_arborescence};
use rdmst::solver::{Arborescence, LogObserver, SolveOptions, solve_with};
use std::path::Path;

pub fn run(
    graph_path: &Path,
    root: &str,
    options: &SolveOptions,
    output: Option<&Path>,
    json: bool,
) -> Result<()> {
    let graph = load_graph(graph_path)?;
    log::info!(
        "loaded {} nodes, {} edges from {}",
        graph.num_nodes(),
        graph.graph().edge_count(),
        graph_path.display()
    );

    let tree = solve_with(&graph, root, options, &mut LogObserver)
        .with_context(|| format!("No arborescence rooted at '{}'", root))?;

    if let Some(path) = output {
        save_arborescence(path, &tree)?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&tree)?);
    } else {
        print_human(&tree);
    }

    Ok(())
}

fn print_human(tree: &Arborescence) {
    println!("Root: {}", tree.root);
    for (parent, child, w) in tree.edge_list() {
        println!("  {} -> {} ({})", parent, child, w);
    }
    println!(
        "Edges: {}, contractions: {}, total weight: {}",
        tree.edge_count(),
        tree.contractions,
        tree.weight
    );
}

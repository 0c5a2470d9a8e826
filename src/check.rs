use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, VecDeque};

use crate::error::RdmstError;
use crate::graph::{Digraph, NamedGraph, NodeId};

/// Result of checking whether a root can span the whole graph
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckResult {
    pub root: String,
    pub node_count: usize,
    pub edge_count: usize,
    pub unreachable: Vec<String>,
    pub ok: bool,
}

/// Structural report on a candidate arborescence
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ArborescenceCheck {
    /// The root has at least one incoming edge.
    pub root_has_parent: bool,
    /// Non-root nodes whose in-degree is not exactly 1.
    pub in_degree_violations: Vec<NodeId>,
    /// Nodes not reachable from the root through tree edges.
    pub unreached: Vec<NodeId>,
    pub cyclic: bool,
    pub ok: bool,
}

/// Checks that the root exists, every weight is a finite non-negative
/// number and no node has a self-loop. Returns the root's handle.
pub fn validate_input(named: &NamedGraph, root: &str) -> Result<NodeId, RdmstError> {
    let root_id = named
        .get_id(root)
        .ok_or_else(|| RdmstError::RootNotFound(root.to_string()))?;

    for (from, to, weight) in named.graph().edges() {
        if from == to {
            return Err(RdmstError::SelfLoop(named.label(from)));
        }
        if !weight.is_finite() || weight < 0.0 {
            return Err(RdmstError::InvalidWeight {
                from: named.label(from),
                to: named.label(to),
                weight,
            });
        }
    }

    Ok(root_id)
}

/// Breadth-first hop counts from `start`. Unreachable nodes map to `None`.
pub fn bfs_distances(graph: &Digraph, start: NodeId) -> BTreeMap<NodeId, Option<usize>> {
    let mut dist: BTreeMap<NodeId, Option<usize>> = graph.nodes().map(|n| (n, None)).collect();
    if !graph.contains_node(start) {
        return dist;
    }
    dist.insert(start, Some(0));

    let mut queue = VecDeque::from([start]);
    while let Some(node) = queue.pop_front() {
        let next = dist.get(&node).copied().flatten().unwrap_or(0) + 1;
        for (nbr, _) in graph.neighbors(node) {
            if let Some(slot) = dist.get_mut(&nbr)
                && slot.is_none()
            {
                *slot = Some(next);
                queue.push_back(nbr);
            }
        }
    }

    dist
}

/// Nodes with no path from `root`, in ascending handle order.
pub fn unreachable_from(graph: &Digraph, root: NodeId) -> Vec<NodeId> {
    bfs_distances(graph, root)
        .into_iter()
        .filter_map(|(node, d)| d.is_none().then_some(node))
        .collect()
}

/// Validates the input and confirms the root reaches every node.
///
/// A missing root is reported before any traversal. The first unreachable
/// node (lowest handle) is reported otherwise.
pub fn check_reachability(named: &NamedGraph, root: &str) -> Result<NodeId, RdmstError> {
    let root_id = validate_input(named, root)?;
    if let Some(&node) = unreachable_from(named.graph(), root_id).first() {
        return Err(RdmstError::UnreachableNode {
            root: root.to_string(),
            node: named.label(node),
        });
    }
    Ok(root_id)
}

/// Full reachability report, listing every unreachable node.
pub fn check_graph(named: &NamedGraph, root: &str) -> Result<CheckResult, RdmstError> {
    let root_id = validate_input(named, root)?;
    let unreachable: Vec<String> = unreachable_from(named.graph(), root_id)
        .into_iter()
        .map(|n| named.label(n))
        .collect();

    Ok(CheckResult {
        root: root.to_string(),
        node_count: named.graph().node_count(),
        edge_count: named.graph().edge_count(),
        ok: unreachable.is_empty(),
        unreachable,
    })
}

/// Checks that `tree` is an arborescence rooted at `root`: in-degree 0 at
/// the root, 1 everywhere else, every node reachable and no directed cycle.
pub fn check_arborescence(tree: &Digraph, root: NodeId) -> ArborescenceCheck {
    let mut in_degree: BTreeMap<NodeId, usize> = tree.nodes().map(|n| (n, 0)).collect();
    for (_, to, _) in tree.edges() {
        *in_degree.entry(to).or_default() += 1;
    }

    let root_has_parent = in_degree.get(&root).copied().unwrap_or(0) > 0;
    let in_degree_violations: Vec<NodeId> = in_degree
        .iter()
        .filter(|&(&node, &deg)| node != root && deg != 1)
        .map(|(&node, _)| node)
        .collect();
    let unreached = unreachable_from(tree, root);

    let mut pg: DiGraph<NodeId, f64> = DiGraph::new();
    let index: HashMap<NodeId, NodeIndex> = tree.nodes().map(|n| (n, pg.add_node(n))).collect();
    for (from, to, w) in tree.edges() {
        pg.add_edge(index[&from], index[&to], w);
    }
    let cyclic = is_cyclic_directed(&pg);

    let ok = tree.contains_node(root)
        && !root_has_parent
        && in_degree_violations.is_empty()
        && unreached.is_empty()
        && !cyclic;

    ArborescenceCheck {
        root_has_parent,
        in_degree_violations,
        unreached,
        cyclic,
        ok,
    }
}

//! Per-node edge reduction and candidate selection.
//!
//! Both stages take a graph in incoming orientation (`node -> {predecessor:
//! weight}`, i.e. the output of [`Digraph::reversed`]).

use crate::error::RdmstError;
use crate::graph::{Digraph, NodeId, Weight};

/// Subtracts each non-root node's minimum incoming weight from all of its
/// incoming edges. The root's edges are copied unchanged.
///
/// The cheapest incoming edge of every node keeps its rank, and afterwards
/// weighs exactly 0.
pub fn reduce_incoming(incoming: &Digraph, root: NodeId) -> Result<Digraph, RdmstError> {
    let mut reduced = incoming.clone();
    let nodes: Vec<NodeId> = reduced.nodes().filter(|&n| n != root).collect();

    for node in nodes {
        let edges = match reduced.edges_mut(node) {
            Some(edges) if !edges.is_empty() => edges,
            _ => return Err(RdmstError::NoIncomingEdge(node)),
        };
        let min = edges.values().copied().fold(Weight::INFINITY, Weight::min);
        for w in edges.values_mut() {
            *w -= min;
        }
    }

    Ok(reduced)
}

/// Picks one cheapest incoming edge per non-root node.
///
/// Ties go to the lowest predecessor handle. The result has every node of
/// `reduced`, exactly one edge per non-root node and none for the root.
pub fn build_candidate(reduced: &Digraph, root: NodeId) -> Result<Digraph, RdmstError> {
    let mut candidate = Digraph::with_nodes(reduced.nodes());

    for node in reduced.nodes().filter(|&n| n != root) {
        let mut best: Option<(NodeId, Weight)> = None;
        for (pred, w) in reduced.neighbors(node) {
            if best.is_none_or(|(_, b)| w < b) {
                best = Some((pred, w));
            }
        }
        let (pred, w) = best.ok_or(RdmstError::NoIncomingEdge(node))?;
        candidate.add_edge(node, pred, w);
    }

    debug_assert!(
        candidate
            .nodes()
            .all(|n| candidate.out_degree(n) == usize::from(n != root)),
        "candidate must pick exactly one predecessor per non-root node"
    );

    Ok(candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Incoming orientation of: 0->1 (4), 2->1 (1), 0->2 (3), 1->2 (3), 1->0 (7).
    fn sample_incoming() -> Digraph {
        let mut out = Digraph::new();
        out.add_edge(0, 1, 4.0);
        out.add_edge(2, 1, 1.0);
        out.add_edge(0, 2, 3.0);
        out.add_edge(1, 2, 3.0);
        out.add_edge(1, 0, 7.0);
        out.reversed()
    }

    #[test]
    fn test_reduction_zeroes_minimum() {
        let reduced = reduce_incoming(&sample_incoming(), 0).unwrap();
        assert_eq!(reduced.weight(1, 2), Some(0.0));
        assert_eq!(reduced.weight(1, 0), Some(3.0));
        assert_eq!(reduced.weight(2, 0), Some(0.0));
        assert_eq!(reduced.weight(2, 1), Some(0.0));
    }

    #[test]
    fn test_reduction_leaves_root_alone() {
        let reduced = reduce_incoming(&sample_incoming(), 0).unwrap();
        assert_eq!(reduced.weight(0, 1), Some(7.0));
    }

    #[test]
    fn test_reduction_preserves_argmin() {
        let incoming = sample_incoming();
        let reduced = reduce_incoming(&incoming, 0).unwrap();
        let before = build_candidate(&incoming, 0).unwrap();
        let after = build_candidate(&reduced, 0).unwrap();
        let picks = |g: &Digraph| g.edges().map(|(a, b, _)| (a, b)).collect::<Vec<_>>();
        assert_eq!(picks(&before), picks(&after));
    }

    #[test]
    fn test_starved_node_is_an_error() {
        let mut incoming = Digraph::with_nodes([0, 1, 2]);
        incoming.add_edge(1, 0, 1.0);
        assert_eq!(
            reduce_incoming(&incoming, 0),
            Err(RdmstError::NoIncomingEdge(2))
        );
        assert_eq!(
            build_candidate(&incoming, 0),
            Err(RdmstError::NoIncomingEdge(2))
        );
    }

    #[test]
    fn test_candidate_one_edge_per_non_root() {
        let reduced = reduce_incoming(&sample_incoming(), 0).unwrap();
        let candidate = build_candidate(&reduced, 0).unwrap();
        assert_eq!(candidate.out_degree(0), 0);
        assert_eq!(candidate.out_degree(1), 1);
        assert_eq!(candidate.out_degree(2), 1);
        assert!(candidate.edges().all(|(_, _, w)| w == 0.0));
    }

    #[test]
    fn test_candidate_tie_breaks_to_lowest_handle() {
        let mut incoming = Digraph::with_nodes([0, 1, 2, 3]);
        incoming.add_edge(3, 2, 5.0);
        incoming.add_edge(3, 0, 5.0);
        incoming.add_edge(3, 1, 5.0);
        incoming.add_edge(1, 0, 1.0);
        incoming.add_edge(2, 0, 1.0);
        let candidate = build_candidate(&incoming, 0).unwrap();
        assert_eq!(candidate.weight(3, 0), Some(5.0));
        assert_eq!(candidate.out_degree(3), 1);
    }
}

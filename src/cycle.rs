//! Cycle detection in candidate graphs.
//!
//! A candidate graph is functional: every non-root node has exactly one
//! outgoing edge, pointing at its chosen predecessor (incoming orientation).
//! Following those edges from any node either reaches the root or closes a
//! cycle, so a single pass over the nodes with a per-walk trail finds a cycle
//! in O(V) time without recursion.

use std::collections::HashMap;

use crate::graph::{Digraph, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    /// On the current walk, at this trail position.
    OnTrail(usize),
    /// Finished by an earlier walk; no cycle passes through it.
    Done,
}

/// Finds one cycle in a candidate graph, if any.
///
/// Walks start from nodes in ascending handle order. The returned sequence
/// `c` follows predecessor links: `c[i + 1]` is the predecessor of `c[i]`,
/// and the predecessor of the last element is `c[0]`. In outgoing terms the
/// cycle edges are `c[i + 1] -> c[i]` plus `c[0] -> c[last]`.
///
/// Only the first edge of each node is followed.
///
/// # Example
/// ```
/// use rdmst::cycle::find_cycle;
/// use rdmst::graph::Digraph;
///
/// // Predecessor links: 1 <- 2 <- 3 <- 1, root 0 untouched.
/// let mut candidate = Digraph::with_nodes([0, 1, 2, 3]);
/// candidate.add_edge(1, 2, 0.0);
/// candidate.add_edge(2, 3, 0.0);
/// candidate.add_edge(3, 1, 0.0);
/// assert_eq!(find_cycle(&candidate), Some(vec![1, 2, 3]));
/// ```
pub fn find_cycle(candidate: &Digraph) -> Option<Vec<NodeId>> {
    debug_assert!(
        candidate.nodes().all(|n| candidate.out_degree(n) <= 1),
        "candidate graph must be functional"
    );

    let mut marks: HashMap<NodeId, Mark> = HashMap::with_capacity(candidate.node_count());

    for start in candidate.nodes() {
        if marks.contains_key(&start) {
            continue;
        }

        let mut trail: Vec<NodeId> = Vec::new();
        let mut node = start;
        loop {
            match marks.get(&node).copied() {
                Some(Mark::OnTrail(pos)) => return Some(trail[pos..].to_vec()),
                Some(Mark::Done) => break,
                None => {
                    marks.insert(node, Mark::OnTrail(trail.len()));
                    trail.push(node);
                    match candidate.neighbors(node).next() {
                        Some((pred, _)) => node = pred,
                        None => break,
                    }
                }
            }
        }

        for n in trail {
            marks.insert(n, Mark::Done);
        }
    }

    None
}

//! Cycle contraction and expansion.
//!
//! Contraction collapses the members of a candidate cycle into one fresh
//! pseudo-node. Expansion undoes that on a tree solved over the contracted
//! graph: it reattaches each boundary edge to the cycle member that owned it
//! and restores the cycle as a chain hanging off the member that receives
//! the external entry edge.
//!
//! Both operate on outgoing-orientation graphs carrying the reduced weights
//! of the level being contracted.

use std::collections::HashSet;

use crate::error::RdmstError;
use crate::graph::{Digraph, NodeId, Weight};

/// Everything needed to undo one contraction.
#[derive(Debug, Clone, PartialEq)]
pub struct Contraction {
    /// Cycle members in predecessor order, as returned by
    /// [`find_cycle`](crate::cycle::find_cycle).
    pub cycle: Vec<NodeId>,
    pub pseudo: NodeId,
    /// The graph the cycle was contracted out of.
    pub before: Digraph,
}

/// Hands out pseudo-node handles above every handle of the input graph.
///
/// Handles only grow, so a pseudo-node never collides with a labelled node
/// or with an earlier pseudo-node of the same solve.
#[derive(Debug, Clone)]
pub struct PseudoNodeAllocator {
    next: NodeId,
}

impl PseudoNodeAllocator {
    pub fn for_graph(graph: &Digraph) -> Self {
        Self {
            next: graph.next_free_id(),
        }
    }

    pub fn allocate(&mut self) -> NodeId {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// Replaces the cycle's members with `pseudo`.
///
/// Edges inside the cycle are dropped. Boundary edges are merged per outside
/// endpoint, keeping the cheapest: `pseudo -> v` weighs the minimum over all
/// `member -> v`, and `u -> pseudo` the minimum over all `u -> member`.
pub fn contract_cycle(
    graph: &Digraph,
    cycle: &[NodeId],
    pseudo: NodeId,
) -> Result<Digraph, RdmstError> {
    if graph.contains_node(pseudo) {
        return Err(RdmstError::IdentifierCollision(pseudo));
    }

    let members: HashSet<NodeId> = cycle.iter().copied().collect();
    let mut contracted = Digraph::with_nodes(graph.nodes().filter(|n| !members.contains(n)));
    contracted.add_node(pseudo);

    for (from, to, w) in graph.edges() {
        match (members.contains(&from), members.contains(&to)) {
            (true, true) => {}
            (true, false) => keep_cheapest(&mut contracted, pseudo, to, w),
            (false, true) => keep_cheapest(&mut contracted, from, pseudo, w),
            (false, false) => contracted.add_edge(from, to, w),
        }
    }

    Ok(contracted)
}

fn keep_cheapest(graph: &mut Digraph, from: NodeId, to: NodeId, w: Weight) {
    match graph.weight(from, to) {
        Some(current) if current <= w => {}
        _ => graph.add_edge(from, to, w),
    }
}

/// Rebuilds a tree over `contraction.before` from a tree solved over the
/// contracted graph.
///
/// * `pseudo -> v` becomes `m -> v` for the member `m` with the cheapest
///   edge to `v`.
/// * `u -> pseudo` becomes `u -> m` for the member `m` that `u` reaches most
///   cheaply. That member is the cycle's entry point.
/// * Every other edge is copied.
///
/// The cycle's own edges are then restored, except the one into the entry
/// point, which turns the ring into a chain. Ties pick the lowest handle.
pub fn expand_cycle(contraction: &Contraction, resolved: &Digraph) -> Result<Digraph, RdmstError> {
    let Contraction {
        cycle,
        pseudo,
        before,
    } = contraction;
    let pseudo = *pseudo;

    let mut members: Vec<NodeId> = cycle.clone();
    members.sort_unstable();
    let member_set: HashSet<NodeId> = members.iter().copied().collect();

    let mut restored = Digraph::with_nodes(before.nodes());
    let mut entry: Option<NodeId> = None;

    for (from, to, _) in resolved.edges() {
        if from == pseudo {
            let (member, w) = cheapest(members.iter().filter_map(|&m| {
                before.weight(m, to).map(|w| (m, w))
            }))
            .ok_or(RdmstError::NoIncomingEdge(to))?;
            restored.add_edge(member, to, w);
        } else if to == pseudo {
            let (member, w) = cheapest(
                before
                    .neighbors(from)
                    .filter(|(m, _)| member_set.contains(m)),
            )
            .ok_or(RdmstError::NoIncomingEdge(pseudo))?;
            restored.add_edge(from, member, w);
            entry = Some(member);
        } else {
            let w = before
                .weight(from, to)
                .ok_or(RdmstError::NoIncomingEdge(to))?;
            restored.add_edge(from, to, w);
        }
    }

    let entry = entry.ok_or(RdmstError::NoIncomingEdge(pseudo))?;
    for (i, &node) in cycle.iter().enumerate() {
        if node == entry {
            continue;
        }
        let pred = cycle[(i + 1) % cycle.len()];
        let w = before
            .weight(pred, node)
            .ok_or(RdmstError::NoIncomingEdge(node))?;
        restored.add_edge(pred, node, w);
    }

    Ok(restored)
}

/// First strictly-cheapest `(node, weight)` pair.
fn cheapest(candidates: impl Iterator<Item = (NodeId, Weight)>) -> Option<(NodeId, Weight)> {
    candidates.fold(None, |best, (node, w)| match best {
        Some((_, b)) if b <= w => best,
        _ => Some((node, w)),
    })
}

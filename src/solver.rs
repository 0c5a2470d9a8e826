//! Chu-Liu/Edmonds minimum spanning arborescence.
//!
//! Each level of the solve reverses the graph, reduces incoming weights,
//! picks one cheapest incoming edge per node and looks for a cycle among
//! those picks. A cycle-free pick set is the optimal tree for that level.
//! Otherwise the cycle is contracted into a pseudo-node and the smaller graph
//! is solved next. Trees are then expanded back out, innermost contraction
//! first, and the caller's original weights are attached at the end.
//!
//! The recursive and iterative strategies share the same per-level step and
//! produce identical trees. The iterative one keeps pending contractions on
//! an explicit stack, so its depth is bounded only by memory.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use crate::check::check_reachability;
use crate::contract::{Contraction, PseudoNodeAllocator, contract_cycle, expand_cycle};
use crate::cycle::find_cycle;
use crate::error::RdmstError;
use crate::graph::{Adjacency, Digraph, NamedGraph, NodeId, Weight};
use crate::reduce::{build_candidate, reduce_incoming};

/// How pending contractions are held while the solve descends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// One call frame per contraction level.
    Recursive,
    /// An explicit stack of contraction records.
    #[default]
    Iterative,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Recursive => write!(f, "recursive"),
            Strategy::Iterative => write!(f, "iterative"),
        }
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "recursive" => Ok(Strategy::Recursive),
            "iterative" => Ok(Strategy::Iterative),
            other => Err(format!(
                "unknown strategy '{}' (expected 'recursive' or 'iterative')",
                other
            )),
        }
    }
}

/// Config files and the CLI accept the same spellings.
impl<'de> Deserialize<'de> for Strategy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolveOptions {
    pub strategy: Strategy,
    /// Abort the whole solve once this much time has passed.
    pub time_limit: Option<Duration>,
}

/// Progress hooks. Every method defaults to doing nothing.
pub trait SolveObserver {
    /// A new level starts on a graph of this size.
    fn on_level(&mut self, _depth: usize, _nodes: usize, _edges: usize) {}
    fn on_contract(&mut self, _depth: usize, _cycle: &[NodeId], _pseudo: NodeId) {}
    fn on_expand(&mut self, _depth: usize, _pseudo: NodeId) {}
    fn on_done(&mut self, _contractions: usize, _weight: Weight) {}
}

/// Ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SolveObserver for NoopObserver {}

/// Forwards events to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl SolveObserver for LogObserver {
    fn on_level(&mut self, depth: usize, nodes: usize, edges: usize) {
        log::debug!("level {}: {} nodes, {} edges", depth, nodes, edges);
    }

    fn on_contract(&mut self, depth: usize, cycle: &[NodeId], pseudo: NodeId) {
        log::debug!(
            "level {}: contracting {}-node cycle into #{}",
            depth,
            cycle.len(),
            pseudo
        );
    }

    fn on_expand(&mut self, depth: usize, pseudo: NodeId) {
        log::trace!("level {}: expanded #{}", depth, pseudo);
    }

    fn on_done(&mut self, contractions: usize, weight: Weight) {
        log::info!(
            "arborescence found after {} contractions, total weight {}",
            contractions,
            weight
        );
    }
}

/// A solved tree over node handles.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeSolution {
    /// Outgoing orientation, original weights, every input node present.
    pub tree: Digraph,
    pub weight: Weight,
    pub contractions: usize,
}

/// A solved tree over node labels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Arborescence {
    pub root: String,
    pub weight: Weight,
    pub contractions: usize,
    /// `parent -> {child: weight}`; leaves map to an empty set.
    pub edges: Adjacency,
}

impl Arborescence {
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(|children| children.len()).sum()
    }

    /// The parent of `node`, or `None` for the root and unknown nodes.
    pub fn parent_of(&self, node: &str) -> Option<&str> {
        self.edges
            .iter()
            .find(|(_, children)| children.contains_key(node))
            .map(|(parent, _)| parent.as_str())
    }

    /// All tree edges as `(parent, child, weight)`, ordered by parent then
    /// child label.
    pub fn edge_list(&self) -> Vec<(&str, &str, Weight)> {
        self.edges
            .iter()
            .flat_map(|(parent, children)| {
                children
                    .iter()
                    .map(move |(child, &w)| (parent.as_str(), child.as_str(), w))
            })
            .collect()
    }
}

/// Solves with default options, reporting progress through `log`.
pub fn solve(named: &NamedGraph, root: &str) -> Result<Arborescence, RdmstError> {
    solve_with(named, root, &SolveOptions::default(), &mut LogObserver)
}

/// Validates the input, checks that `root` reaches every node, then solves.
///
/// # Example
/// ```
/// use rdmst::graph::NamedGraph;
/// use rdmst::solver::solve;
///
/// let mut g = NamedGraph::new();
/// g.add_edge("A", "B", 5.0);
/// g.add_edge("B", "A", 3.0);
/// let tree = solve(&g, "A").unwrap();
/// assert_eq!(tree.weight, 5.0);
/// assert_eq!(tree.parent_of("B"), Some("A"));
/// ```
pub fn solve_with<O>(
    named: &NamedGraph,
    root: &str,
    options: &SolveOptions,
    observer: &mut O,
) -> Result<Arborescence, RdmstError>
where
    O: SolveObserver + ?Sized,
{
    let root_id = check_reachability(named, root)?;
    let solution = solve_digraph(named.graph(), root_id, options, observer)?;

    Ok(Arborescence {
        root: root.to_string(),
        weight: solution.weight,
        contractions: solution.contractions,
        edges: named.to_adjacency(&solution.tree),
    })
}

/// Solves over handles. The caller must already have confirmed that `root`
/// reaches every node of `graph`.
pub fn solve_digraph<O>(
    graph: &Digraph,
    root: NodeId,
    options: &SolveOptions,
    observer: &mut O,
) -> Result<TreeSolution, RdmstError>
where
    O: SolveObserver + ?Sized,
{
    if !graph.contains_node(root) {
        return Err(RdmstError::RootNotFound(format!("#{}", root)));
    }

    let mut run = Run {
        root,
        time_limit: options.time_limit,
        started: Instant::now(),
        alloc: PseudoNodeAllocator::for_graph(graph),
        contractions: 0,
        observer,
    };

    let tree = match options.strategy {
        Strategy::Recursive => run.solve_recursive(graph, 0)?,
        Strategy::Iterative => run.solve_iterative(graph)?,
    };

    let mut weighted = Digraph::with_nodes(tree.nodes());
    for (from, to, _) in tree.edges() {
        let w = graph
            .weight(from, to)
            .ok_or(RdmstError::NoIncomingEdge(to))?;
        weighted.add_edge(from, to, w);
    }
    let weight = weighted.total_weight();

    run.observer.on_done(run.contractions, weight);
    Ok(TreeSolution {
        tree: weighted,
        weight,
        contractions: run.contractions,
    })
}

enum Step {
    Terminal(Digraph),
    Contract {
        contraction: Contraction,
        contracted: Digraph,
    },
}

struct Run<'a, O: ?Sized> {
    root: NodeId,
    time_limit: Option<Duration>,
    started: Instant,
    alloc: PseudoNodeAllocator,
    contractions: usize,
    observer: &'a mut O,
}

impl<O: SolveObserver + ?Sized> Run<'_, O> {
    fn check_deadline(&self) -> Result<(), RdmstError> {
        match self.time_limit {
            Some(limit) if self.started.elapsed() >= limit => {
                Err(RdmstError::DeadlineExceeded(limit))
            }
            _ => Ok(()),
        }
    }

    /// One level: reduce, pick candidates, then either finish or contract.
    fn step(&mut self, graph: &Digraph, depth: usize) -> Result<Step, RdmstError> {
        self.check_deadline()?;
        self.observer
            .on_level(depth, graph.node_count(), graph.edge_count());

        let reduced = reduce_incoming(&graph.reversed(), self.root)?;
        let candidate = build_candidate(&reduced, self.root)?;

        let Some(cycle) = find_cycle(&candidate) else {
            return Ok(Step::Terminal(candidate.reversed()));
        };

        let pseudo = self.alloc.allocate();
        let before = reduced.reversed();
        let contracted = contract_cycle(&before, &cycle, pseudo)?;
        debug_assert!(contracted.node_count() < graph.node_count());

        self.observer.on_contract(depth, &cycle, pseudo);
        self.contractions += 1;

        Ok(Step::Contract {
            contraction: Contraction {
                cycle,
                pseudo,
                before,
            },
            contracted,
        })
    }

    fn expand(
        &mut self,
        contraction: &Contraction,
        inner: &Digraph,
        depth: usize,
    ) -> Result<Digraph, RdmstError> {
        self.check_deadline()?;
        let tree = expand_cycle(contraction, inner)?;
        self.observer.on_expand(depth, contraction.pseudo);
        Ok(tree)
    }

    fn solve_recursive(&mut self, graph: &Digraph, depth: usize) -> Result<Digraph, RdmstError> {
        match self.step(graph, depth)? {
            Step::Terminal(tree) => Ok(tree),
            Step::Contract {
                contraction,
                contracted,
            } => {
                let inner = self.solve_recursive(&contracted, depth + 1)?;
                self.expand(&contraction, &inner, depth)
            }
        }
    }

    fn solve_iterative(&mut self, graph: &Digraph) -> Result<Digraph, RdmstError> {
        let mut pending: Vec<Contraction> = Vec::new();
        let mut current = graph.clone();

        let mut tree = loop {
            match self.step(&current, pending.len())? {
                Step::Terminal(tree) => break tree,
                Step::Contract {
                    contraction,
                    contracted,
                } => {
                    pending.push(contraction);
                    current = contracted;
                }
            }
        };

        while let Some(contraction) = pending.pop() {
            tree = self.expand(&contraction, &tree, pending.len())?;
        }

        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::check_arborescence;

    fn named(edges: &[(&str, &str, f64)]) -> NamedGraph {
        let mut g = NamedGraph::new();
        for &(a, b, w) in edges {
            g.add_edge(a, b, w);
        }
        g
    }

    fn both(g: &NamedGraph, root: &str) -> Arborescence {
        let run = |strategy| {
            let options = SolveOptions {
                strategy,
                time_limit: None,
            };
            solve_with(g, root, &options, &mut NoopObserver).unwrap()
        };
        let recursive = run(Strategy::Recursive);
        let iterative = run(Strategy::Iterative);
        assert_eq!(recursive, iterative);
        iterative
    }

    #[derive(Default)]
    struct Recorder {
        levels: Vec<usize>,
        contracted: Vec<(usize, usize)>,
        expanded: Vec<usize>,
        done: Option<(usize, Weight)>,
    }

    impl SolveObserver for Recorder {
        fn on_level(&mut self, depth: usize, _nodes: usize, _edges: usize) {
            self.levels.push(depth);
        }
        fn on_contract(&mut self, depth: usize, cycle: &[NodeId], _pseudo: NodeId) {
            self.contracted.push((depth, cycle.len()));
        }
        fn on_expand(&mut self, depth: usize, _pseudo: NodeId) {
            self.expanded.push(depth);
        }
        fn on_done(&mut self, contractions: usize, weight: Weight) {
            self.done = Some((contractions, weight));
        }
    }

    #[test]
    fn test_two_node_graph() {
        let g = named(&[("A", "B", 5.0), ("B", "A", 3.0)]);
        let tree = both(&g, "A");
        assert_eq!(tree.weight, 5.0);
        assert_eq!(tree.edge_list(), vec![("A", "B", 5.0)]);
        assert_eq!(tree.contractions, 0);
        assert!(tree.edges["B"].is_empty());
    }

    #[test]
    fn test_three_cycle_with_shortcut() {
        let g = named(&[
            ("A", "B", 1.0),
            ("B", "C", 1.0),
            ("C", "A", 1.0),
            ("A", "C", 10.0),
        ]);
        let tree = both(&g, "A");
        assert_eq!(tree.weight, 2.0);
        assert_eq!(tree.parent_of("B"), Some("A"));
        assert_eq!(tree.parent_of("C"), Some("B"));
        assert_eq!(tree.parent_of("A"), None);
    }

    #[test]
    fn test_contraction_picks_cheaper_entry() {
        // Cycle A <-> B; entering at A costs 5 + 1, entering at B 3 + 4.
        let g = named(&[
            ("R", "A", 5.0),
            ("R", "B", 3.0),
            ("A", "B", 1.0),
            ("B", "A", 4.0),
        ]);
        let tree = both(&g, "R");
        assert_eq!(tree.contractions, 1);
        assert_eq!(tree.weight, 6.0);
        assert_eq!(tree.parent_of("A"), Some("R"));
        assert_eq!(tree.parent_of("B"), Some("A"));
    }

    #[test]
    fn test_nested_contractions() {
        // Inner cycle 1 <-> 2 is cheap; once contracted it forms a cycle
        // with 3, and only then is the root edge chosen.
        let g = named(&[
            ("r", "1", 20.0),
            ("r", "2", 21.0),
            ("r", "3", 9.0),
            ("1", "2", 1.0),
            ("2", "1", 1.0),
            ("2", "3", 2.0),
            ("3", "1", 3.0),
        ]);
        let mut recorder = Recorder::default();
        let tree = solve_with(&g, "r", &SolveOptions::default(), &mut recorder).unwrap();
        assert_eq!(tree.weight, 13.0);
        assert_eq!(tree.parent_of("3"), Some("r"));
        assert_eq!(tree.parent_of("1"), Some("3"));
        assert_eq!(tree.parent_of("2"), Some("1"));
        assert_eq!(tree.contractions, 2);
        assert_eq!(recorder.levels, vec![0, 1, 2]);
        assert_eq!(recorder.contracted, vec![(0, 2), (1, 2)]);
        assert_eq!(recorder.expanded, vec![1, 0]);
        assert_eq!(recorder.done, Some((2, 13.0)));
        assert_eq!(both(&g, "r"), tree);
    }

    #[test]
    fn test_weight_uses_original_edges() {
        let g = named(&[
            ("R", "A", 5.0),
            ("R", "B", 3.0),
            ("A", "B", 1.0),
            ("B", "A", 4.0),
        ]);
        let tree = both(&g, "R");
        let recomputed: f64 = tree
            .edge_list()
            .iter()
            .map(|&(a, b, w)| {
                let (ia, ib) = (g.get_id(a).unwrap(), g.get_id(b).unwrap());
                assert_eq!(g.graph().weight(ia, ib), Some(w));
                w
            })
            .sum();
        assert_eq!(recomputed, tree.weight);
    }

    #[test]
    fn test_single_node_graph() {
        let mut g = NamedGraph::new();
        g.add_node("only");
        let tree = both(&g, "only");
        assert_eq!(tree.weight, 0.0);
        assert_eq!(tree.edge_count(), 0);
        assert_eq!(tree.edges.len(), 1);
    }

    #[test]
    fn test_unreachable_node_is_reported() {
        let g = named(&[("B", "A", 1.0)]);
        let mut recorder = Recorder::default();
        let err = solve_with(&g, "A", &SolveOptions::default(), &mut recorder).unwrap_err();
        assert_eq!(
            err,
            RdmstError::UnreachableNode {
                root: "A".into(),
                node: "B".into()
            }
        );
        assert!(recorder.levels.is_empty());
    }

    #[test]
    fn test_missing_root_is_reported() {
        let g = named(&[("A", "B", 1.0)]);
        assert_eq!(solve(&g, "Z"), Err(RdmstError::RootNotFound("Z".into())));
    }

    #[test]
    fn test_zero_time_limit_aborts() {
        let g = named(&[("A", "B", 1.0)]);
        let options = SolveOptions {
            strategy: Strategy::Iterative,
            time_limit: Some(Duration::ZERO),
        };
        assert_eq!(
            solve_with(&g, "A", &options, &mut NoopObserver),
            Err(RdmstError::DeadlineExceeded(Duration::ZERO))
        );
    }

    #[test]
    fn test_solve_digraph_rejects_unknown_root() {
        let g = Digraph::with_nodes([0, 1]);
        assert!(matches!(
            solve_digraph(&g, 7, &SolveOptions::default(), &mut NoopObserver),
            Err(RdmstError::RootNotFound(_))
        ));
    }

    #[test]
    fn test_solve_digraph_tree_is_arborescence() {
        let mut g = Digraph::new();
        for a in 0..6 {
            for b in 0..6 {
                if a != b {
                    g.add_edge(a, b, ((a * 7 + b * 3) % 5) as f64 + 1.0);
                }
            }
        }
        let solution =
            solve_digraph(&g, 0, &SolveOptions::default(), &mut NoopObserver).unwrap();
        let report = check_arborescence(&solution.tree, 0);
        assert!(report.ok, "{:?}", report);
        assert_eq!(solution.tree.node_count(), 6);
    }

    #[test]
    fn test_strategy_parsing() {
        assert_eq!("Recursive".parse::<Strategy>(), Ok(Strategy::Recursive));
        assert_eq!(" iterative ".parse::<Strategy>(), Ok(Strategy::Iterative));
        assert!("parallel".parse::<Strategy>().is_err());
        assert_eq!(Strategy::default().to_string(), "iterative");
    }
}

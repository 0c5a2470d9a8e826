//! Weighted directed graphs over integer node handles.
//!
//! [`Digraph`] is the working representation used by every solver stage. It
//! stores outgoing edges `node -> {neighbor: weight}` in ordered maps, so
//! iteration order is always ascending by handle and every tie-break in the
//! solver resolves to the lowest handle.
//!
//! [`NamedGraph`] maps caller-facing string labels (sample names) onto
//! handles. Pseudo-nodes created during cycle contraction are plain handles
//! above every labelled one and never receive a label.

use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A node handle. Callers map their own labels through [`NamedGraph`].
pub type NodeId = usize;

/// Edge weight: a non-negative distance.
pub type Weight = f64;

/// Outgoing adjacency over labels: `label -> {neighbor label: weight}`.
pub type Adjacency = BTreeMap<String, BTreeMap<String, Weight>>;

/// A directed graph with at most one weighted edge per ordered node pair.
///
/// Cloning produces an independent copy; stages never share a mutable graph
/// with the snapshot they were derived from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Digraph {
    adj: BTreeMap<NodeId, BTreeMap<NodeId, Weight>>,
}

impl Digraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a graph with the given nodes and no edges.
    pub fn with_nodes(nodes: impl IntoIterator<Item = NodeId>) -> Self {
        let mut graph = Self::new();
        for node in nodes {
            graph.add_node(node);
        }
        graph
    }

    pub fn add_node(&mut self, node: NodeId) {
        self.adj.entry(node).or_default();
    }

    /// Inserts or overwrites the edge `from -> to`, adding missing endpoints.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId, weight: Weight) {
        self.add_node(to);
        self.adj.entry(from).or_default().insert(to, weight);
    }

    pub fn contains_node(&self, node: NodeId) -> bool {
        self.adj.contains_key(&node)
    }

    pub fn weight(&self, from: NodeId, to: NodeId) -> Option<Weight> {
        self.adj.get(&from)?.get(&to).copied()
    }

    /// Nodes in ascending handle order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.adj.keys().copied()
    }

    /// Edges leaving `node` in ascending neighbor order. Empty for unknown
    /// nodes.
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = (NodeId, Weight)> + '_ {
        self.adj
            .get(&node)
            .into_iter()
            .flat_map(|edges| edges.iter().map(|(&to, &w)| (to, w)))
    }

    pub fn out_degree(&self, node: NodeId) -> usize {
        self.adj.get(&node).map_or(0, BTreeMap::len)
    }

    /// All edges as `(from, to, weight)` in ascending `(from, to)` order.
    pub fn edges(&self) -> impl Iterator<Item = (NodeId, NodeId, Weight)> + '_ {
        self.adj
            .iter()
            .flat_map(|(&from, edges)| edges.iter().map(move |(&to, &w)| (from, to, w)))
    }

    pub(crate) fn edges_mut(&mut self, node: NodeId) -> Option<&mut BTreeMap<NodeId, Weight>> {
        self.adj.get_mut(&node)
    }

    pub fn node_count(&self) -> usize {
        self.adj.len()
    }

    pub fn edge_count(&self) -> usize {
        self.adj.values().map(BTreeMap::len).sum()
    }

    /// Smallest handle strictly greater than every handle in the graph.
    pub fn next_free_id(&self) -> NodeId {
        self.adj.keys().next_back().map_or(0, |&max| max + 1)
    }

    /// Sum of all edge weights.
    pub fn total_weight(&self) -> Weight {
        self.edges().map(|(_, _, w)| w).sum()
    }

    /// Returns the transpose: every edge `u -> v (w)` becomes `v -> u (w)`.
    ///
    /// Every node of `self` is present in the result, including nodes that
    /// end up with no outgoing edges.
    pub fn reversed(&self) -> Digraph {
        let mut rev = Digraph::with_nodes(self.nodes());
        for (from, to, w) in self.edges() {
            rev.add_edge(to, from, w);
        }
        rev
    }
}

/// A graph with string-labelled nodes.
///
/// Labels are assigned consecutive handles starting at 0, in the order they
/// are first added. [`NamedGraph::from_adjacency`] adds labels in
/// lexicographic order, so "lowest handle" there means "smallest label".
#[derive(Debug, Clone, Default)]
pub struct NamedGraph {
    names: Vec<String>,
    name_to_id: HashMap<String, NodeId>,
    graph: Digraph,
}

impl NamedGraph {
    /// Creates an empty named graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node with the given label and returns its handle.
    /// If the label already exists, returns the existing handle.
    pub fn add_node(&mut self, name: &str) -> NodeId {
        if let Some(&id) = self.name_to_id.get(name) {
            return id;
        }
        let id = self.names.len();
        self.names.push(name.to_string());
        self.name_to_id.insert(name.to_string(), id);
        self.graph.add_node(id);
        id
    }

    /// Adds the edge `from -> to`, creating either node if needed.
    pub fn add_edge(&mut self, from: &str, to: &str, weight: Weight) {
        let from_id = self.add_node(from);
        let to_id = self.add_node(to);
        self.graph.add_edge(from_id, to_id, weight);
    }

    /// Builds a graph from a label adjacency map. Every label, including
    /// those only present as neighbors, becomes a node.
    pub fn from_adjacency(adjacency: &Adjacency) -> Self {
        let labels: BTreeSet<&str> = adjacency
            .iter()
            .flat_map(|(from, edges)| {
                std::iter::once(from.as_str()).chain(edges.keys().map(String::as_str))
            })
            .collect();

        let mut named = Self::new();
        for label in labels {
            named.add_node(label);
        }
        for (from, edges) in adjacency {
            for (to, &w) in edges {
                named.add_edge(from, to, w);
            }
        }
        named
    }

    /// Builds the complete digraph over `labels`, weighting `a -> b` with
    /// `dist(a, b)`. Handles follow the order of `labels`; duplicates are
    /// collapsed onto their first occurrence.
    pub fn complete<S, F>(labels: &[S], mut dist: F) -> Self
    where
        S: AsRef<str>,
        F: FnMut(&str, &str) -> Weight,
    {
        let mut named = Self::new();
        for label in labels {
            named.add_node(label.as_ref());
        }
        for a in labels {
            for b in labels {
                let (a, b) = (a.as_ref(), b.as_ref());
                if a != b {
                    named.add_edge(a, b, dist(a, b));
                }
            }
        }
        named
    }

    /// Returns the handle for a label, if it exists.
    pub fn get_id(&self, name: &str) -> Option<NodeId> {
        self.name_to_id.get(name).copied()
    }

    /// Returns the label of a handle. Pseudo-nodes have none.
    pub fn get_name(&self, id: NodeId) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    /// Label for display: the node's name, or `#<handle>` for unlabelled
    /// handles.
    pub fn label(&self, id: NodeId) -> String {
        match self.get_name(id) {
            Some(name) => name.to_string(),
            None => format!("#{}", id),
        }
    }

    pub fn num_nodes(&self) -> usize {
        self.names.len()
    }

    pub fn graph(&self) -> &Digraph {
        &self.graph
    }

    /// Converts a graph over this graph's handles back to labels.
    pub fn to_adjacency(&self, graph: &Digraph) -> Adjacency {
        let mut out = Adjacency::new();
        for node in graph.nodes() {
            let edges = graph
                .neighbors(node)
                .map(|(to, w)| (self.label(to), w))
                .collect();
            out.insert(self.label(node), edges);
        }
        out
    }

    /// This graph as a label adjacency map.
    pub fn adjacency(&self) -> Adjacency {
        self.to_adjacency(&self.graph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_edge_creates_both_endpoints() {
        let mut g = Digraph::new();
        g.add_edge(0, 3, 1.5);
        assert!(g.contains_node(0));
        assert!(g.contains_node(3));
        assert_eq!(g.weight(0, 3), Some(1.5));
        assert_eq!(g.weight(3, 0), None);
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn test_reversed_keeps_isolated_nodes() {
        let mut g = Digraph::with_nodes([0, 1, 2]);
        g.add_edge(0, 1, 4.0);
        let rev = g.reversed();
        assert_eq!(rev.node_count(), 3);
        assert_eq!(rev.weight(1, 0), Some(4.0));
        assert_eq!(rev.out_degree(0), 0);
        assert_eq!(rev.out_degree(2), 0);
    }

    #[test]
    fn test_reversed_twice_is_identity() {
        let mut g = Digraph::new();
        g.add_edge(0, 1, 1.0);
        g.add_edge(1, 2, 2.0);
        g.add_edge(2, 0, 3.0);
        g.add_edge(0, 2, 10.0);
        assert_eq!(g.reversed().reversed(), g);
    }

    #[test]
    fn test_reversed_does_not_touch_input() {
        let mut g = Digraph::new();
        g.add_edge(0, 1, 1.0);
        let before = g.clone();
        let _ = g.reversed();
        assert_eq!(g, before);
    }

    #[test]
    fn test_next_free_id() {
        assert_eq!(Digraph::new().next_free_id(), 0);
        let g = Digraph::with_nodes([2, 7, 4]);
        assert_eq!(g.next_free_id(), 8);
    }

    #[test]
    fn test_neighbors_of_unknown_node_is_empty() {
        let g = Digraph::with_nodes([0]);
        assert_eq!(g.neighbors(5).count(), 0);
        assert_eq!(g.out_degree(5), 0);
    }

    #[test]
    fn test_named_graph_reuses_handles() {
        let mut g = NamedGraph::new();
        let a = g.add_node("a");
        let b = g.add_node("b");
        assert_eq!(g.add_node("a"), a);
        assert_ne!(a, b);
        assert_eq!(g.get_name(b), Some("b"));
        assert_eq!(g.get_name(99), None);
        assert_eq!(g.label(99), "#99");
    }

    #[test]
    fn test_from_adjacency_orders_handles_by_label() {
        let mut adj = Adjacency::new();
        adj.insert("z".into(), BTreeMap::from([("m".to_string(), 1.0)]));
        adj.insert("b".into(), BTreeMap::from([("z".to_string(), 2.0)]));
        let named = NamedGraph::from_adjacency(&adj);
        assert_eq!(named.get_id("b"), Some(0));
        assert_eq!(named.get_id("m"), Some(1));
        assert_eq!(named.get_id("z"), Some(2));
        assert_eq!(named.adjacency().get("m").map(BTreeMap::len), Some(0));
        assert_eq!(named.adjacency(), {
            let mut expected = adj.clone();
            expected.insert("m".into(), BTreeMap::new());
            expected
        });
    }

    #[test]
    fn test_complete_graph_uses_distance_function() {
        let labels = ["s1", "s2", "s3"];
        let named = NamedGraph::complete(&labels, |a, b| if a < b { 1.0 } else { 2.0 });
        let g = named.graph();
        assert_eq!(g.node_count(), 3);
        assert_eq!(g.edge_count(), 6);
        let s1 = named.get_id("s1").unwrap();
        let s3 = named.get_id("s3").unwrap();
        assert_eq!(g.weight(s1, s3), Some(1.0));
        assert_eq!(g.weight(s3, s1), Some(2.0));
        assert_eq!(g.weight(s1, s1), None);
    }
}

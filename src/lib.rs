pub mod check;
pub mod config;
pub mod contract;
pub mod cycle;
pub mod error;
pub mod graph;
pub mod parser;
pub mod reduce;
pub mod solver;

pub use check::{ArborescenceCheck, CheckResult, check_arborescence, check_graph, check_reachability};
pub use config::Config;
pub use error::RdmstError;
pub use graph::{Adjacency, Digraph, NamedGraph, NodeId, Weight};
pub use parser::{load_graph, save_arborescence, save_graph};
pub use solver::{
    Arborescence, LogObserver, NoopObserver, SolveObserver, SolveOptions, Strategy, TreeSolution,
    solve, solve_digraph, solve_with,
};

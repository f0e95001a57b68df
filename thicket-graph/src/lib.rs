//! Weighted undirected graphs for the thicket clustering engine
//!
//! Edges live once in a shared CSR [`CsrStorage`]; every [`Graph`] (the root graph as well as
//! each induced subgraph) is a sorted view of global vertex ids over it.

pub mod components;
pub mod graph;
pub mod parallel;
pub mod storage;

pub use components::connected_components;
pub use graph::Graph;
pub use storage::{CsrStorage, GraphBuilder};

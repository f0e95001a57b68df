//! Root graphs and induced subgraphs over a shared CSR storage
//!
//! A [`Graph`] is a sorted set of global vertex ids over an [`Arc<CsrStorage>`]. Local ids are
//! positions in that sorted set, so they are dense (`0..order`) and the mapping between local
//! and global ids is stable for the lifetime of the graph. Vertex weights are always the sums
//! of incident edge weights *inside* the graph.

use std::sync::Arc;

use crate::parallel;
use crate::storage::CsrStorage;

#[derive(Debug, Clone)]
pub struct Graph {
    storage: Arc<CsrStorage>,
    vertices: Vec<u32>,
    weights: Vec<f64>,
    total_weight: f64,
    // every storage vertex is present, so local id == global id
    full: bool,
}

impl Graph {
    pub(crate) fn root(storage: Arc<CsrStorage>) -> Self {
        let vertices = (0..storage.order() as u32).collect();
        Self::over(storage, vertices)
    }

    fn over(storage: Arc<CsrStorage>, vertices: Vec<u32>) -> Self {
        let full = vertices.len() == storage.order();
        let mut graph = Self {
            storage,
            vertices,
            weights: Vec::new(),
            total_weight: 0.0,
            full,
        };
        graph.weights = parallel::map_vertices(graph.order(), |v| {
            let mut sum = 0.0;
            graph.traverse_incident_edges(v, |_, w| sum += w);
            sum
        });
        graph.total_weight = graph.weights.iter().sum();
        graph
    }

    pub fn storage(&self) -> &CsrStorage {
        &self.storage
    }

    /// Number of vertices
    pub fn order(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// `(local id, global id)` pairs in local id order
    pub fn vertices(&self) -> impl Iterator<Item = (usize, u32)> + '_ {
        self.vertices.iter().copied().enumerate()
    }

    /// Global ids in local id order (ascending)
    pub fn global_ids(&self) -> &[u32] {
        &self.vertices
    }

    pub fn global_id(&self, local: usize) -> u32 {
        self.vertices[local]
    }

    pub fn local_id(&self, global: u32) -> Option<usize> {
        if self.full {
            return ((global as usize) < self.vertices.len()).then_some(global as usize);
        }
        self.vertices.binary_search(&global).ok()
    }

    pub fn contains(&self, global: u32) -> bool {
        self.local_id(global).is_some()
    }

    /// Sum of edge weights incident to `local` inside this graph
    pub fn weight(&self, local: usize) -> f64 {
        self.weights[local]
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// Weight of a vertex given by global id, or 0 when it is not part of this graph
    pub fn weight_for_global_id(&self, global: u32) -> f64 {
        self.local_id(global).map_or(0.0, |local| self.weights[local])
    }

    /// Visit every edge from `local` to a vertex of this graph as `(neighbour local id, weight)`
    pub fn traverse_incident_edges<F>(&self, local: usize, mut visit: F)
    where
        F: FnMut(usize, f64),
    {
        let (heads, weights) = self.storage.neighbors(self.vertices[local]);
        for (&head, &w) in heads.iter().zip(weights) {
            if self.full {
                visit(head as usize, w);
            } else if let Some(neighbor) = self.local_id(head) {
                visit(neighbor, w);
            }
        }
    }

    /// Subgraph induced by the given global ids. Ids outside this graph are ignored, repeated
    /// ids count once.
    pub fn induced_subgraph<I>(&self, globals: I) -> Graph
    where
        I: IntoIterator<Item = u32>,
    {
        let mut vertices: Vec<u32> = globals.into_iter().filter(|&g| self.contains(g)).collect();
        vertices.sort_unstable();
        vertices.dedup();
        Graph::over(Arc::clone(&self.storage), vertices)
    }

    /// Subgraph induced by the given local ids
    pub fn local_subgraph(&self, locals: &[usize]) -> Graph {
        self.induced_subgraph(locals.iter().map(|&l| self.vertices[l]))
    }

    /// Matrix-free `out = A x`, with `A` the adjacency matrix of this graph
    pub fn adjacency_product(&self, x: &[f64], out: &mut [f64]) {
        debug_assert_eq!(x.len(), self.order());
        debug_assert_eq!(out.len(), self.order());
        parallel::fill_vertices(out, |v| {
            let mut acc = 0.0;
            self.traverse_incident_edges(v, |u, w| acc += w * x[u]);
            acc
        });
    }
}

#[cfg(test)]
mod tests {
    use crate::GraphBuilder;

    fn path() -> crate::Graph {
        GraphBuilder::new()
            .add(0, 1, 10.0)
            .add(1, 2, 1.0)
            .add(2, 3, 10.0)
            .build()
            .unwrap()
    }

    #[test]
    fn test_root_weights() {
        let graph = path();
        assert_eq!(graph.order(), 4);
        assert_eq!(graph.weights(), &[10.0, 11.0, 11.0, 10.0]);
        assert_eq!(graph.total_weight(), 42.0);
        assert_eq!(graph.local_id(3), Some(3));
    }

    #[test]
    fn test_induced_subgraph_keeps_global_ids() {
        let graph = path();
        let sub = graph.induced_subgraph([3, 2, 2, 9]);
        assert_eq!(sub.order(), 2);
        assert_eq!(sub.global_ids(), &[2, 3]);
        assert_eq!(sub.local_id(3), Some(1));
        assert_eq!(sub.local_id(0), None);
        assert_eq!(sub.weights(), &[10.0, 10.0]);
        assert_eq!(sub.weight_for_global_id(2), 10.0);
        assert_eq!(sub.weight_for_global_id(1), 0.0);
        assert_eq!(graph.weight_for_global_id(2), 11.0);
    }

    #[test]
    fn test_nested_subgraphs() {
        let graph = path();
        let sub = graph.induced_subgraph([1, 2, 3]);
        let subsub = sub.local_subgraph(&[0, 1]);
        assert_eq!(subsub.global_ids(), &[1, 2]);
        assert_eq!(subsub.total_weight(), 2.0);

        let mut seen = Vec::new();
        sub.traverse_incident_edges(0, |n, w| seen.push((n, w)));
        assert_eq!(seen, vec![(1, 1.0)]);
    }

    #[test]
    fn test_adjacency_product() {
        let graph = path();
        let x = [1.0, 2.0, 3.0, 4.0];
        let mut y = [0.0; 4];
        graph.adjacency_product(&x, &mut y);
        assert_eq!(y, [20.0, 13.0, 42.0, 30.0]);
    }

    #[test]
    fn test_root_graph_rejects_foreign_ids() {
        let graph = GraphBuilder::new().add(0, 1, 1.0).build().unwrap();
        assert_eq!(graph.local_id(7), None);
        assert!(!graph.contains(2));
        assert_eq!(graph.weight_for_global_id(7), 0.0);
        let sub = graph.induced_subgraph([1, 7]);
        assert_eq!(sub.global_ids(), &[1]);
        assert_eq!(sub.weights(), &[0.0]);
    }

    #[test]
    fn test_empty_graph() {
        let graph = GraphBuilder::new().build().unwrap();
        assert!(graph.is_empty());
        assert_eq!(graph.total_weight(), 0.0);
        assert!(graph.induced_subgraph([0, 1]).is_empty());
    }
}

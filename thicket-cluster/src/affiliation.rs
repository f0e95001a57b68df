//! Vertex affiliation and the consistency guard
//!
//! A vertex is affiliated with a candidate subgraph to the degree that its edge weight stays
//! inside the candidate. The guard keeps shrinking a candidate until every remaining vertex
//! clears the configured threshold.

use log::trace;
use thicket_common::{AffiliationMetric, ClusteringSettings};
use thicket_graph::{parallel, Graph};

use crate::cluster::{ClusterId, ClusterTree};

/// Per-vertex affiliation of `candidate` with respect to `reference`, in local id order of
/// `candidate`
pub fn affiliation_scores(metric: AffiliationMetric, candidate: &Graph, reference: &Graph) -> Vec<f64> {
    match metric {
        AffiliationMetric::RelativeWeight => parallel::map_vertices(candidate.order(), |v| {
            let total = reference.weight_for_global_id(candidate.global_id(v));
            if total > 0.0 {
                candidate.weight(v) / total
            } else {
                0.0
            }
        }),
    }
}

/// Evicts weakly affiliated vertices from candidate clusters
pub struct ConsistencyGuard<'g> {
    reference: &'g Graph,
    metric: AffiliationMetric,
    min_affiliation: f64,
    min_cluster_size: usize,
}

impl<'g> ConsistencyGuard<'g> {
    pub fn new(reference: &'g Graph, settings: &ClusteringSettings) -> Self {
        Self {
            reference,
            metric: settings.affiliation_metric(),
            min_affiliation: settings.min_vertex_affiliation(),
            min_cluster_size: settings.min_cluster_size(),
        }
    }

    /// Vertices of `graph` whose affiliation falls below the threshold, as global ids
    pub fn inconsistent_vertices(&self, graph: &Graph) -> Vec<u32> {
        let scores = affiliation_scores(self.metric, graph, self.reference);
        graph
            .vertices()
            .filter(|&(local, _)| scores[local] < self.min_affiliation)
            .map(|(_, global)| global)
            .collect()
    }

    /// Shrink `candidate` until all of its vertices are consistent.
    ///
    /// Evicted vertices go to the remainder of `parent`. Returns `None`, after moving the
    /// survivors to `parent` as well, once fewer than the minimum cluster size are left.
    pub fn ensure(&self, tree: &mut ClusterTree, parent: ClusterId, candidate: Graph) -> Option<Graph> {
        let mut subgraph = candidate;
        loop {
            let evicted = self.inconsistent_vertices(&subgraph);
            let survivors = subgraph.order() - evicted.len();
            if !evicted.is_empty() {
                trace!(
                    "Consistency guard evicts {} of {} vertices to cluster {}",
                    evicted.len(),
                    subgraph.order(),
                    parent
                );
            }
            if survivors < self.min_cluster_size {
                tree.add_to_remainder(parent, subgraph.global_ids().iter().copied());
                return None;
            }
            if evicted.is_empty() {
                return Some(subgraph);
            }
            tree.add_to_remainder(parent, evicted.iter().copied());
            let kept: Vec<u32> = subgraph
                .global_ids()
                .iter()
                .copied()
                .filter(|g| evicted.binary_search(g).is_err())
                .collect();
            subgraph = self.reference.induced_subgraph(kept);
        }
    }
}

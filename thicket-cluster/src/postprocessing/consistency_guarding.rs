//! Re-checks vertex affiliation against the final tree

use log::trace;
use rustc_hash::FxHashSet;
use thicket_common::ClusteringSettings;
use thicket_graph::Graph;

use crate::affiliation::ConsistencyGuard;
use crate::cluster::{ClusterId, ClusterTree};

/// Re-checks vertex consistency against the cluster's aggregate graph.
///
/// Inconsistent vertices of the cluster's own remainder move to the parent. Inconsistent
/// descendant vertices only leave the survivor set used for the next round; they are the
/// business of their own clusters. A cluster left with fewer own vertices than the minimum
/// cluster size is folded into its parent.
pub struct ConsistencyGuarding<'g> {
    graph: &'g Graph,
    guard: ConsistencyGuard<'g>,
    min_cluster_size: usize,
}

impl<'g> ConsistencyGuarding<'g> {
    pub fn new(graph: &'g Graph, settings: &ClusteringSettings) -> Self {
        Self {
            graph,
            guard: ConsistencyGuard::new(graph, settings),
            min_cluster_size: settings.min_cluster_size(),
        }
    }

    pub fn apply(&self, tree: &mut ClusterTree, id: ClusterId) -> bool {
        let Some(parent) = tree.parent(id) else {
            return false;
        };
        let mut own: FxHashSet<u32> = tree.remainder(id).iter().copied().collect();
        let mut moved = Vec::new();
        let mut subgraph = tree.aggregate_graph(id, self.graph);
        loop {
            let evicted = self.guard.inconsistent_vertices(&subgraph);
            if evicted.is_empty() {
                break;
            }
            moved.extend(evicted.iter().copied().filter(|v| own.remove(v)));
            if own.len() < self.min_cluster_size {
                break;
            }
            let survivors = subgraph
                .global_ids()
                .iter()
                .copied()
                .filter(|g| evicted.binary_search(g).is_err());
            subgraph = self.graph.induced_subgraph(survivors);
        }

        let remainder: Vec<u32> = tree
            .remainder(id)
            .iter()
            .copied()
            .filter(|v| own.contains(v))
            .collect();
        tree.add_to_remainder(parent, moved.iter().copied());
        if remainder.len() < self.min_cluster_size {
            trace!(
                "Folding cluster {} with {} consistent vertices into {}",
                id,
                remainder.len(),
                parent
            );
            tree.set_remainder(id, remainder);
            tree.assimilate_child(id);
            return true;
        }
        if moved.is_empty() {
            return false;
        }
        trace!("Moved {} inconsistent vertices of cluster {} to {}", moved.len(), id, parent);
        tree.set_remainder(id, remainder);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(min_cluster_size: usize, min_affiliation: f64) -> ClusteringSettings {
        ClusteringSettings::builder()
            .with_min_cluster_size(min_cluster_size)
            .with_min_vertex_affiliation(min_affiliation)
            .build()
            .unwrap()
    }

    #[test]
    fn test_consistent_cluster_is_untouched() {
        let graph = thicket_test::disjoint_cliques(2, 4).build().unwrap();
        let mut tree = ClusterTree::new();
        let a = tree.add_child(tree.root());
        tree.add_to_remainder(a, 0..4);
        let pass = ConsistencyGuarding::new(&graph, &settings(2, 0.5));
        assert!(!pass.apply(&mut tree, a));
        assert_eq!(tree.remainder(a), &[0, 1, 2, 3]);
    }

    #[test]
    fn test_moves_inconsistent_vertices_to_parent() {
        // clique 0..5, vertex 5 hangs off vertex 4 but mostly belongs to 6
        let graph = thicket_test::complete_graph(5)
            .add(4, 5, 1.0)
            .add(5, 6, 9.0)
            .build()
            .unwrap();
        let mut tree = ClusterTree::new();
        let root = tree.root();
        tree.add_to_remainder(root, [6]);
        let a = tree.add_child(root);
        tree.add_to_remainder(a, [5, 0, 1, 2, 3, 4]);
        let pass = ConsistencyGuarding::new(&graph, &settings(3, 0.5));
        assert!(pass.apply(&mut tree, a));
        assert_eq!(tree.remainder(a), &[0, 1, 2, 3, 4]);
        assert_eq!(tree.remainder(root), &[6, 5]);
        assert!(!pass.apply(&mut tree, a));
    }

    #[test]
    fn test_descendant_vertices_stay_put() {
        let graph = thicket_test::complete_graph(5)
            .add(4, 5, 1.0)
            .add(5, 6, 9.0)
            .build()
            .unwrap();
        let mut tree = ClusterTree::new();
        let root = tree.root();
        tree.add_to_remainder(root, [6]);
        let a = tree.add_child(root);
        tree.add_to_remainder(a, 0..5);
        let b = tree.add_child(a);
        tree.add_to_remainder(b, [5]);
        let pass = ConsistencyGuarding::new(&graph, &settings(3, 0.5));
        assert!(!pass.apply(&mut tree, a));
        assert_eq!(tree.remainder(b), &[5]);
    }

    #[test]
    fn test_small_cluster_is_folded_into_parent() {
        let graph = thicket_test::complete_graph(6).build().unwrap();
        let mut tree = ClusterTree::new();
        let root = tree.root();
        let a = tree.add_child(root);
        tree.add_to_remainder(a, 0..2);
        let b = tree.add_child(a);
        tree.add_to_remainder(b, 2..6);
        let pass = ConsistencyGuarding::new(&graph, &settings(3, 0.1));
        assert!(pass.apply(&mut tree, a));
        assert!(!tree.is_live(a));
        assert_eq!(tree.remainder(root), &[0, 1]);
        assert_eq!(tree.parent(b), Some(root));
    }

    #[test]
    fn test_root_is_skipped() {
        let graph = thicket_test::complete_graph(3).build().unwrap();
        let mut tree = ClusterTree::new();
        let root = tree.root();
        tree.add_to_remainder(root, 0..3);
        let pass = ConsistencyGuarding::new(&graph, &settings(5, 0.9));
        assert!(!pass.apply(&mut tree, root));
    }
}

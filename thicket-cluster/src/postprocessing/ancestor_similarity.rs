//! Re-homes clusters whose similarity to their parent is out of bounds

use thicket_common::settings::{DEFAULT_MAX_PARENT_SIMILARITY, DEFAULT_TARGET_PARENT_SIMILARITY};
use thicket_common::SimilarityMetric;
use thicket_graph::Graph;

use crate::cluster::{ClusterId, ClusterTree};
use crate::similarity::similarity;

/// Folds a cluster into its parent when the two are nearly the same, and moves it up to a
/// better fitting ancestor when it is too different from its parent
pub struct AncestorSimilarity<'g> {
    graph: &'g Graph,
    metric: SimilarityMetric,
    min_similarity: f64,
    max_similarity: f64,
    target_similarity: f64,
}

impl<'g> AncestorSimilarity<'g> {
    pub fn new(graph: &'g Graph, metric: SimilarityMetric, min_similarity: f64) -> Self {
        Self {
            graph,
            metric,
            min_similarity,
            max_similarity: DEFAULT_MAX_PARENT_SIMILARITY,
            target_similarity: DEFAULT_TARGET_PARENT_SIMILARITY,
        }
    }

    pub fn with_max_similarity(mut self, max_similarity: f64) -> Self {
        self.max_similarity = max_similarity;
        self
    }

    /// An ancestor at least this similar ends the search for a new parent
    pub fn with_target_similarity(mut self, target_similarity: f64) -> Self {
        self.target_similarity = target_similarity;
        self
    }

    pub fn apply(&self, tree: &mut ClusterTree, id: ClusterId) -> bool {
        let Some(parent) = tree.parent(id) else {
            return false;
        };
        if tree.is_root(parent) {
            return false;
        }
        let cluster_graph = tree.aggregate_graph(id, self.graph);
        let to_parent = self.similarity_to(tree, parent, &cluster_graph);
        if to_parent > self.max_similarity {
            tree.assimilate_child(id);
            return true;
        }
        if to_parent >= self.min_similarity {
            return false;
        }

        let ancestors: Vec<ClusterId> = tree.ancestors(parent).collect();
        let mut fallback = None;
        let mut target = None;
        for ancestor in ancestors {
            let s = self.similarity_to(tree, ancestor, &cluster_graph);
            if s >= self.target_similarity {
                target = Some(ancestor);
                break;
            }
            if fallback.is_none() && s >= self.min_similarity {
                fallback = Some(ancestor);
            }
        }
        let new_parent = target.or(fallback).unwrap_or_else(|| tree.root());
        tree.annex(new_parent, id);
        true
    }

    fn similarity_to(&self, tree: &ClusterTree, ancestor: ClusterId, cluster: &Graph) -> f64 {
        let ancestor_graph = tree.aggregate_graph(ancestor, self.graph);
        similarity(self.metric, &ancestor_graph, cluster)
    }
}

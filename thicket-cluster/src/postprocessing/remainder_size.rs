//! Removes clusters whose own remainder is too small

use crate::cluster::{ClusterId, ClusterTree};

/// Folds non-root clusters with too small a remainder into their parent
pub struct RemainderSize {
    min_cluster_size: usize,
}

impl RemainderSize {
    pub fn new(min_cluster_size: usize) -> Self {
        Self { min_cluster_size }
    }

    pub fn apply(&self, tree: &mut ClusterTree, id: ClusterId) -> bool {
        if tree.is_root(id) || tree.remainder(id).len() >= self.min_cluster_size {
            return false;
        }
        tree.assimilate_child(id);
        true
    }
}

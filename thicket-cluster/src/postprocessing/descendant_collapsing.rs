//! Pulls grandchildren up into clusters with too few children

use crate::cluster::{ClusterId, ClusterTree};

/// Moves a cluster up to its grandparent when the grandparent has fewer than `min_children`
/// children
pub struct DescendantCollapsing {
    min_children: usize,
}

impl DescendantCollapsing {
    pub fn new(min_children: usize) -> Self {
        Self { min_children }
    }

    pub fn apply(&self, tree: &mut ClusterTree, id: ClusterId) -> bool {
        let Some(grandparent) = tree.parent(id).and_then(|parent| tree.parent(parent)) else {
            return false;
        };
        if tree.child_count(grandparent) >= self.min_children {
            return false;
        }
        tree.annex(grandparent, id);
        true
    }
}

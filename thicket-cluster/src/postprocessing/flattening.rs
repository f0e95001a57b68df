//! Collapses the hierarchy to a single level below the root

use crate::cluster::{ClusterId, ClusterTree};

/// Merges every cluster deeper than the root's children into its parent. Applied children
/// first, this leaves each child of the root holding all vertices of its former subtree.
pub struct Flattening;

impl Flattening {
    pub fn apply(&self, tree: &mut ClusterTree, id: ClusterId) -> bool {
        if tree.depth(id) <= 1 {
            return false;
        }
        tree.assimilate_child(id);
        true
    }
}

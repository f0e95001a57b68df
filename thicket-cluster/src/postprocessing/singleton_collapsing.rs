//! Folds only children into their parent

use crate::cluster::{ClusterId, ClusterTree};

/// A cluster that is the single child of its parent is merged into that parent
pub struct SingletonCollapsing;

impl SingletonCollapsing {
    pub fn apply(&self, tree: &mut ClusterTree, id: ClusterId) -> bool {
        match tree.parent(id) {
            Some(parent) if tree.child_count(parent) == 1 => {
                tree.assimilate_child(id);
                true
            }
            _ => false,
        }
    }
}

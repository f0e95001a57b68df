//! Flattening of single-child chains
//!
//! Starting at the leaves, every cluster is attached directly to its nearest ancestor with at
//! least two children. The clusters in between (each having exactly one child) move along
//! with it and become its siblings, or, when remainders are merged, are folded into the
//! topmost of them.

use rustc_hash::FxHashSet;

use super::traversal::BottomUpQueue;
use crate::cluster::{ClusterId, ClusterTree};

pub struct ChainRedistribution {
    merge_remainders: bool,
}

impl ChainRedistribution {
    pub fn new(merge_remainders: bool) -> Self {
        Self { merge_remainders }
    }

    pub fn apply(&self, tree: &mut ClusterTree) -> bool {
        let mut queue = BottomUpQueue::default();
        let mut enqueued = FxHashSet::default();
        for id in tree.live_clusters() {
            if tree.child_count(id) == 0 && enqueued.insert(id) {
                queue.push(tree, id);
            }
        }

        let mut changed = false;
        while let Some(id) = queue.pop() {
            if !tree.is_live(id) || tree.is_root(id) {
                continue;
            }
            let Some(anchor) = tree.ancestors(id).find(|&a| tree.child_count(a) >= 2) else {
                continue;
            };
            if enqueued.insert(anchor) {
                queue.push(tree, anchor);
            }
            if tree.parent(id) == Some(anchor) {
                continue;
            }
            self.redistribute(tree, id, anchor);
            changed = true;
        }
        changed
    }

    fn redistribute(&self, tree: &mut ClusterTree, id: ClusterId, anchor: ClusterId) {
        let chain: Vec<ClusterId> = std::iter::once(id)
            .chain(tree.ancestors(id))
            .take_while(|&c| c != anchor)
            .collect();
        if self.merge_remainders {
            // fold bottom-up into the topmost chain member, which stays below the anchor
            for &member in &chain[..chain.len() - 1] {
                tree.assimilate_child(member);
            }
        } else {
            for &member in &chain {
                tree.annex(anchor, member);
            }
        }
    }
}

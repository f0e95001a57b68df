//! Bottom-up traversal helpers shared by the postprocessing passes

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use rustc_hash::FxHashSet;

use crate::cluster::{ClusterId, ClusterTree};

/// How a pass walks the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalMode {
    /// One sweep over the clusters live at its start, children before parents
    LocalBottomUp,
    /// The pass walks the tree itself
    GlobalCustom,
}

type Key = (usize, usize, Reverse<ClusterId>);

/// Priority queue of clusters: deepest first, then larger remainders, then lower ids.
/// Keys are taken when a cluster is pushed.
#[derive(Default)]
pub(crate) struct BottomUpQueue {
    heap: BinaryHeap<Key>,
    queued: FxHashSet<ClusterId>,
}

impl BottomUpQueue {
    /// All clusters of the subtrees rooted at `roots`
    pub(crate) fn of_subtrees(tree: &ClusterTree, roots: &[ClusterId]) -> Self {
        let mut queue = Self::default();
        for &root in roots {
            queue.push_subtree(tree, root);
        }
        queue
    }

    pub(crate) fn push(&mut self, tree: &ClusterTree, id: ClusterId) {
        if self.queued.insert(id) {
            self.heap
                .push((tree.depth(id), tree.remainder(id).len(), Reverse(id)));
        }
    }

    pub(crate) fn push_subtree(&mut self, tree: &ClusterTree, root: ClusterId) {
        let mut members = Vec::new();
        tree.traverse(root, |c| members.push(c.id()));
        for id in members {
            self.push(tree, id);
        }
    }

    pub(crate) fn pop(&mut self) -> Option<ClusterId> {
        let (_, _, Reverse(id)) = self.heap.pop()?;
        self.queued.remove(&id);
        Some(id)
    }
}

/// Apply `pass` to every cluster live at the start of the sweep, skipping clusters detached
/// by earlier applications. Reports whether any application changed the tree.
pub(crate) fn bottom_up<F>(tree: &mut ClusterTree, mut pass: F) -> bool
where
    F: FnMut(&mut ClusterTree, ClusterId) -> bool,
{
    let mut queue = BottomUpQueue::of_subtrees(tree, &[tree.root()]);
    let mut changed = false;
    while let Some(id) = queue.pop() {
        if tree.is_live(id) {
            changed |= pass(tree, id);
        }
    }
    changed
}

/// Apply `pass` to `id`. When that changes the tree, sweep the affected subtree again
/// (rooted at `id`, or at its former children if it was folded away), cascading into every
/// subtree that changes in turn.
pub(crate) fn cascade<F>(tree: &mut ClusterTree, id: ClusterId, mut pass: F) -> bool
where
    F: FnMut(&mut ClusterTree, ClusterId) -> bool,
{
    let mut queue = BottomUpQueue::default();
    if !apply_and_requeue(tree, id, &mut pass, &mut queue) {
        return false;
    }
    while let Some(current) = queue.pop() {
        if tree.is_live(current) {
            apply_and_requeue(tree, current, &mut pass, &mut queue);
        }
    }
    true
}

fn apply_and_requeue<F>(
    tree: &mut ClusterTree,
    id: ClusterId,
    pass: &mut F,
    queue: &mut BottomUpQueue,
) -> bool
where
    F: FnMut(&mut ClusterTree, ClusterId) -> bool,
{
    let children: Vec<ClusterId> = tree.children(id).collect();
    if !pass(tree, id) {
        return false;
    }
    if tree.is_live(id) {
        queue.push_subtree(tree, id);
    } else {
        for child in children.into_iter().filter(|&c| tree.is_live(c)) {
            queue.push_subtree(tree, child);
        }
    }
    true
}

//! Arena-backed cluster tree
//!
//! Clusters are addressed by [`ClusterId`] handles into a node arena. Each node stores its
//! parent handle and an ordered set of child handles, so reparenting is a matter of rewriting
//! ids. Nodes folded into their parent during postprocessing stay in the arena but are
//! detached and marked dead; their handles are never reused.

use std::collections::BTreeSet;
use std::fmt;

use thicket_graph::Graph;
use xxhash_rust::xxh3::xxh3_64;

/// Handle of a cluster within a [`ClusterTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClusterId(u32);

impl ClusterId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Default)]
struct Node {
    parent: Option<ClusterId>,
    children: BTreeSet<ClusterId>,
    remainder: Vec<u32>,
    live: bool,
}

/// Hierarchy of clusters. Every vertex of the clustered graph sits in the remainder of
/// exactly one live cluster.
#[derive(Debug, Clone)]
pub struct ClusterTree {
    nodes: Vec<Node>,
}

impl Default for ClusterTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ClusterTree {
    /// A tree consisting of an empty root
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                live: true,
                ..Node::default()
            }],
        }
    }

    pub fn root(&self) -> ClusterId {
        ClusterId(0)
    }

    pub fn is_root(&self, id: ClusterId) -> bool {
        id == self.root()
    }

    pub fn get(&self, id: ClusterId) -> ClusterRef<'_> {
        ClusterRef { tree: self, id }
    }

    /// Create an empty child of `parent`
    pub fn add_child(&mut self, parent: ClusterId) -> ClusterId {
        let id = ClusterId(self.nodes.len() as u32);
        self.nodes.push(Node {
            parent: Some(parent),
            live: true,
            ..Node::default()
        });
        self.node_mut(parent).children.insert(id);
        id
    }

    pub fn parent(&self, id: ClusterId) -> Option<ClusterId> {
        self.node(id).parent
    }

    /// Children in ascending id order
    pub fn children(&self, id: ClusterId) -> impl Iterator<Item = ClusterId> + '_ {
        self.node(id).children.iter().copied()
    }

    pub fn child_count(&self, id: ClusterId) -> usize {
        self.node(id).children.len()
    }

    pub fn remainder(&self, id: ClusterId) -> &[u32] {
        &self.node(id).remainder
    }

    pub fn add_to_remainder<I>(&mut self, id: ClusterId, vertices: I)
    where
        I: IntoIterator<Item = u32>,
    {
        self.node_mut(id).remainder.extend(vertices);
    }

    pub fn set_remainder(&mut self, id: ClusterId, remainder: Vec<u32>) {
        self.node_mut(id).remainder = remainder;
    }

    pub fn take_remainder(&mut self, id: ClusterId) -> Vec<u32> {
        std::mem::take(&mut self.node_mut(id).remainder)
    }

    /// Number of edges between `id` and the root
    pub fn depth(&self, id: ClusterId) -> usize {
        self.ancestors(id).count()
    }

    /// Proper ancestors of `id`, nearest first
    pub fn ancestors(&self, id: ClusterId) -> impl Iterator<Item = ClusterId> + '_ {
        std::iter::successors(self.parent(id), move |&a| self.parent(a))
    }

    /// Whether `id` is still attached to the tree
    pub fn is_live(&self, id: ClusterId) -> bool {
        let node = self.node(id);
        node.live
            && match node.parent {
                None => self.is_root(id),
                Some(parent) => self.node(parent).children.contains(&id),
            }
    }

    /// Move `child` (with its subtree) below `new_parent`
    pub fn annex(&mut self, new_parent: ClusterId, child: ClusterId) {
        debug_assert!(
            new_parent != child && !self.ancestors(new_parent).any(|a| a == child),
            "annexing {child} below {new_parent} would create a cycle"
        );
        if let Some(old_parent) = self.node(child).parent {
            self.node_mut(old_parent).children.remove(&child);
        }
        self.node_mut(child).parent = Some(new_parent);
        self.node_mut(new_parent).children.insert(child);
    }

    /// Fold `child` into its parent: the parent takes over its remainder and its children and
    /// `child` is detached.
    pub fn assimilate_child(&mut self, child: ClusterId) {
        let Some(parent) = self.parent(child) else {
            debug_assert!(false, "the root has no parent to be assimilated into");
            return;
        };
        let remainder = self.take_remainder(child);
        self.node_mut(parent).remainder.extend(remainder);
        let grandchildren = std::mem::take(&mut self.node_mut(child).children);
        for grandchild in grandchildren {
            self.node_mut(grandchild).parent = Some(parent);
            self.node_mut(parent).children.insert(grandchild);
        }
        self.node_mut(parent).children.remove(&child);
        let node = self.node_mut(child);
        node.live = false;
        node.parent = None;
    }

    /// Pre-order walk of the subtree rooted at `id`
    pub fn traverse<F>(&self, id: ClusterId, mut visitor: F)
    where
        F: FnMut(ClusterRef<'_>),
    {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            visitor(self.get(current));
            stack.extend(self.node(current).children.iter().rev().copied());
        }
    }

    /// Live clusters in pre-order
    pub fn live_clusters(&self) -> Vec<ClusterId> {
        let mut clusters = Vec::new();
        self.traverse(self.root(), |c| clusters.push(c.id()));
        clusters
    }

    /// Remainders of `id` and all of its descendants
    pub fn aggregate_vertices(&self, id: ClusterId) -> Vec<u32> {
        let mut vertices = Vec::new();
        self.traverse(id, |c| vertices.extend_from_slice(c.remainder()));
        vertices
    }

    /// Subgraph of `graph` induced by the aggregate vertices of `id`
    pub fn aggregate_graph(&self, id: ClusterId, graph: &Graph) -> Graph {
        graph.induced_subgraph(self.aggregate_vertices(id))
    }

    /// Number of live clusters, root included
    pub fn cluster_count(&self) -> usize {
        self.live_clusters().len()
    }

    pub fn max_depth(&self) -> usize {
        let mut max = 0;
        let mut stack = vec![(self.root(), 0)];
        while let Some((id, depth)) = stack.pop() {
            max = max.max(depth);
            stack.extend(self.children(id).map(|c| (c, depth + 1)));
        }
        max
    }

    /// Id-independent form of the subtree rooted at `id`
    pub fn canonical(&self, id: ClusterId) -> CanonicalCluster {
        let mut remainder = self.remainder(id).to_vec();
        remainder.sort_unstable();
        let mut children: Vec<CanonicalCluster> =
            self.children(id).map(|c| self.canonical(c)).collect();
        children.sort();
        CanonicalCluster {
            remainder,
            children,
        }
    }

    /// Hash of the canonical form of the whole tree
    pub fn fingerprint(&self) -> u64 {
        let mut bytes = Vec::new();
        self.canonical(self.root()).encode(&mut bytes);
        xxh3_64(&bytes)
    }

    fn node(&self, id: ClusterId) -> &Node {
        &self.nodes[id.index()]
    }

    fn node_mut(&mut self, id: ClusterId) -> &mut Node {
        &mut self.nodes[id.index()]
    }
}

/// Read-only view of one cluster
#[derive(Clone, Copy)]
pub struct ClusterRef<'t> {
    tree: &'t ClusterTree,
    id: ClusterId,
}

impl<'t> ClusterRef<'t> {
    pub fn id(&self) -> ClusterId {
        self.id
    }

    pub fn parent(&self) -> Option<ClusterRef<'t>> {
        self.tree.parent(self.id).map(|p| self.tree.get(p))
    }

    pub fn children(&self) -> impl Iterator<Item = ClusterRef<'t>> + 't {
        let tree = self.tree;
        tree.children(self.id).map(move |c| tree.get(c))
    }

    pub fn remainder(&self) -> &'t [u32] {
        self.tree.remainder(self.id)
    }

    pub fn depth(&self) -> usize {
        self.tree.depth(self.id)
    }

    pub fn traverse<F>(&self, visitor: F)
    where
        F: FnMut(ClusterRef<'_>),
    {
        self.tree.traverse(self.id, visitor)
    }

    pub fn aggregate_vertices(&self) -> Vec<u32> {
        self.tree.aggregate_vertices(self.id)
    }
}

impl fmt::Debug for ClusterRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClusterRef")
            .field("id", &self.id)
            .field("remainder", &self.remainder().len())
            .field("children", &self.tree.child_count(self.id))
            .finish()
    }
}

/// Sorted remainder plus children sorted by their own canonical forms
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanonicalCluster {
    pub remainder: Vec<u32>,
    pub children: Vec<CanonicalCluster>,
}

impl CanonicalCluster {
    fn encode(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&(self.remainder.len() as u64).to_le_bytes());
        for v in &self.remainder {
            out.extend_from_slice(&v.to_le_bytes());
        }
        out.extend_from_slice(&(self.children.len() as u64).to_le_bytes());
        for child in &self.children {
            child.encode(out);
        }
    }
}

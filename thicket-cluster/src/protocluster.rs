//! Work items of the recursive clustering loop

use std::cmp::Ordering;

use thicket_graph::Graph;

use crate::cluster::ClusterId;

/// What a pending work item is going to do with its graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pending {
    /// Split into connected components
    ComponentSplit,
    /// Spectrally bisect a connected graph
    SpectralSplit,
}

/// How the graph of a work item came about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphKind {
    /// The input graph
    Root,
    /// A connected component, or a graph found to be connected already
    Component,
    /// One side of a spectral bisection
    Spectral,
}

/// A not yet decomposed candidate cluster
#[derive(Debug)]
pub struct Protocluster {
    graph: Graph,
    kind: GraphKind,
    cluster: ClusterId,
    depth: usize,
}

impl Protocluster {
    pub fn new(graph: Graph, kind: GraphKind, cluster: ClusterId, depth: usize) -> Self {
        Self {
            graph,
            kind,
            cluster,
            depth,
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn kind(&self) -> GraphKind {
        self.kind
    }

    /// Cluster that receives the decomposition results
    pub fn cluster(&self) -> ClusterId {
        self.cluster
    }

    /// Depth of [`Protocluster::cluster`] in the tree
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn pending(&self) -> Pending {
        match self.kind {
            GraphKind::Root | GraphKind::Spectral => Pending::ComponentSplit,
            GraphKind::Component => Pending::SpectralSplit,
        }
    }

    /// Retag a graph that turned out to be connected for spectral splitting. Fails, handing
    /// the item back, when it already is a component.
    pub fn into_component(self) -> Result<Protocluster, Protocluster> {
        match self.kind {
            GraphKind::Component => Err(self),
            GraphKind::Root | GraphKind::Spectral => Ok(Protocluster {
                kind: GraphKind::Component,
                ..self
            }),
        }
    }
}

/// Queue entry: higher priority first, ties in insertion order
pub(crate) struct Queued {
    pub(crate) priority: usize,
    pub(crate) seq: u64,
    pub(crate) protocluster: Protocluster,
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Queued {}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Queued {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

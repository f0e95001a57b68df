//! Recursive decomposition into the raw cluster tree
//!
//! Work items alternate between two phases. Graphs of unknown connectivity are split into
//! connected components, each of which becomes a child cluster; connected graphs are bisected
//! spectrally and the consistent halves become child clusters in turn. Whatever cannot be
//! split further ends up in the remainder of the cluster that was being decomposed.

use std::collections::BinaryHeap;
use std::time::Instant;

use log::{debug, error, trace, warn};
use thicket_common::ClusteringSettings;
use thicket_graph::{connected_components, Graph};

use crate::affiliation::ConsistencyGuard;
use crate::bisector::SpectralBisector;
use crate::cluster::{ClusterId, ClusterTree};
use crate::protocluster::{GraphKind, Pending, Protocluster, Queued};

/// Order in which pending work items are taken up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scheduling {
    /// Deepest cluster first
    #[default]
    DeepestFirst,
    /// Shallowest cluster first
    ShallowestFirst,
    /// Strict insertion order
    Fifo,
}

impl Scheduling {
    fn priority(self, depth: usize) -> usize {
        match self {
            Scheduling::DeepestFirst => depth,
            Scheduling::ShallowestFirst => usize::MAX - depth,
            Scheduling::Fifo => 0,
        }
    }
}

pub struct RecursiveClustering<'g> {
    graph: &'g Graph,
    min_cluster_size: usize,
    bisector: SpectralBisector,
    guard: ConsistencyGuard<'g>,
    scheduling: Scheduling,
    queue: BinaryHeap<Queued>,
    seq: u64,
    tree: ClusterTree,
}

impl<'g> RecursiveClustering<'g> {
    pub fn new(graph: &'g Graph, settings: &ClusteringSettings) -> Self {
        Self {
            graph,
            min_cluster_size: settings.min_cluster_size(),
            bisector: SpectralBisector::new(settings),
            guard: ConsistencyGuard::new(graph, settings),
            scheduling: Scheduling::default(),
            queue: BinaryHeap::new(),
            seq: 0,
            tree: ClusterTree::new(),
        }
    }

    pub fn with_scheduling(mut self, scheduling: Scheduling) -> Self {
        self.scheduling = scheduling;
        self
    }

    /// Decompose the graph until no work is left and return the raw tree
    pub fn run(mut self) -> ClusterTree {
        let start = Instant::now();
        if !self.graph.is_empty() {
            let root = self.tree.root();
            self.enqueue(Protocluster::new(self.graph.clone(), GraphKind::Root, root, 0));
        }
        while let Some(item) = self.queue.pop() {
            let protocluster = item.protocluster;
            trace!(
                "Processing {:?} graph of {} vertices for cluster {} at depth {}",
                protocluster.kind(),
                protocluster.graph().order(),
                protocluster.cluster(),
                protocluster.depth()
            );
            match protocluster.pending() {
                Pending::ComponentSplit => self.split_into_components(protocluster),
                Pending::SpectralSplit => self.bisect(protocluster),
            }
        }
        debug!(
            "Recursive clustering of {} vertices finished in {:?} with {} clusters",
            self.graph.order(),
            start.elapsed(),
            self.tree.cluster_count()
        );
        self.tree
    }

    fn enqueue(&mut self, protocluster: Protocluster) {
        self.seq += 1;
        self.queue.push(Queued {
            priority: self.scheduling.priority(protocluster.depth()),
            seq: self.seq,
            protocluster,
        });
    }

    fn spawn(&mut self, parent: ClusterId, graph: Graph, kind: GraphKind, depth: usize) {
        let child = self.tree.add_child(parent);
        self.enqueue(Protocluster::new(graph, kind, child, depth + 1));
    }

    fn split_into_components(&mut self, protocluster: Protocluster) {
        let components = connected_components(protocluster.graph());
        if components.len() == 1 && components[0].order() == protocluster.graph().order() {
            match protocluster.into_component() {
                Ok(component) => self.enqueue(component),
                Err(component) => self.bisect(component),
            }
            return;
        }

        let parent = protocluster.cluster();
        for component in components {
            if component.order() < self.min_cluster_size {
                self.tree
                    .add_to_remainder(parent, component.global_ids().iter().copied());
            } else {
                self.spawn(parent, component, GraphKind::Component, protocluster.depth());
            }
        }
    }

    fn bisect(&mut self, protocluster: Protocluster) {
        let parent = protocluster.cluster();
        let graph = protocluster.graph();
        let mut partitions = Vec::with_capacity(2);
        if let Err(e) = self.bisector.bisect(graph, |partition| partitions.push(partition)) {
            if e.is_graph_local() {
                warn!(
                    "Could not bisect graph of {} vertices for cluster {}, keeping it as remainder: {}",
                    graph.order(),
                    parent,
                    e
                );
            } else {
                error!(
                    "Unexpected failure bisecting graph of {} vertices for cluster {}, keeping it as remainder: {}",
                    graph.order(),
                    parent,
                    e
                );
            }
            self.tree
                .add_to_remainder(parent, graph.global_ids().iter().copied());
            return;
        }

        for partition in partitions {
            if partition.order() < self.min_cluster_size || partition.order() == graph.order() {
                self.tree
                    .add_to_remainder(parent, partition.global_ids().iter().copied());
                continue;
            }
            if let Some(consistent) = self.guard.ensure(&mut self.tree, parent, partition) {
                self.spawn(parent, consistent, GraphKind::Spectral, protocluster.depth());
            }
        }
    }
}

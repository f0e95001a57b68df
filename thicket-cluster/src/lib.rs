//! Recursive spectral clustering
//!
//! [`run`] turns a weighted undirected graph into a hierarchy of nested, internally consistent
//! vertex groups without being told how many groups to look for:
//!
//! 1. [`RecursiveClustering`] alternates connected-component splits with spectral bisections
//!    (power iteration on a shifted normalized Laplacian, stopped once enough signs have
//!    settled) and keeps every candidate honest with a [`ConsistencyGuard`].
//! 2. [`Postprocessing`] repairs the raw tree until no pass changes it any more.
//!
//! Every vertex of the input ends up in the remainder of exactly one cluster of the result.

pub mod affiliation;
pub mod bisector;
pub mod cluster;
pub mod convergence;
pub mod initial_vectors;
pub mod operator;
pub mod postprocessing;
pub mod power_iteration;
pub mod protocluster;
pub mod recursive;
pub mod similarity;

use std::time::Instant;

use log::debug;
use thicket_common::ClusteringSettings;
use thicket_graph::Graph;

pub use affiliation::ConsistencyGuard;
pub use bisector::SpectralBisector;
pub use cluster::{CanonicalCluster, ClusterId, ClusterRef, ClusterTree};
pub use postprocessing::{Postprocessing, Postprocessor, TraversalMode};
pub use recursive::{RecursiveClustering, Scheduling};

/// Cluster `graph` and postprocess the result
pub fn run(graph: &Graph, settings: &ClusteringSettings) -> ClusterTree {
    let start = Instant::now();
    let mut tree = RecursiveClustering::new(graph, settings).run();
    Postprocessing::new(graph, settings).apply(&mut tree);
    debug!(
        "Clustered {} vertices into {} clusters (max depth {}) in {:?}",
        graph.order(),
        tree.cluster_count(),
        tree.max_depth(),
        start.elapsed()
    );
    tree
}

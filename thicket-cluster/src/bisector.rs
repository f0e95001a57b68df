//! Spectral bisection of connected graphs

use thicket_common::{ClusteringSettings, Result};
use thicket_graph::Graph;

use crate::convergence::SignTrailConvergence;
use crate::initial_vectors::InitialVectors;
use crate::operator::SpectralOperator;
use crate::power_iteration::power_iteration;

/// Splits a graph in two along the signs of its approximate Fiedler vector
pub struct SpectralBisector {
    trail_size: usize,
    convergence_threshold: f64,
    max_iterations: usize,
    initial_vectors: InitialVectors,
}

impl SpectralBisector {
    pub fn new(settings: &ClusteringSettings) -> Self {
        Self {
            trail_size: settings.trail_size(),
            convergence_threshold: settings.convergence_threshold(),
            max_iterations: settings.max_iterations(),
            initial_vectors: InitialVectors::new(settings.random_seed()),
        }
    }

    /// Hand both halves of `graph` to `consumer`: first the vertices with a non-negative
    /// entry, then the negative ones. Either half may be empty.
    pub fn bisect<F>(&self, graph: &Graph, mut consumer: F) -> Result<()>
    where
        F: FnMut(Graph),
    {
        let mut op = SpectralOperator::new(graph);
        let mut criterion =
            SignTrailConvergence::new(graph, self.trail_size, self.convergence_threshold);
        let initial = self.initial_vectors.generate(graph);
        let mut v = power_iteration(&mut op, &mut criterion, initial, self.max_iterations)?;
        criterion.postprocess(&mut v)?;

        let (non_negative, negative): (Vec<usize>, Vec<usize>) =
            (0..graph.order()).partition(|&i| v[i] >= 0.0);
        consumer(graph.local_subgraph(&non_negative));
        consumer(graph.local_subgraph(&negative));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thicket_common::Error;

    fn settings() -> ClusteringSettings {
        ClusteringSettings::builder()
            .with_trail_size(10)
            .with_convergence_threshold(1.0)
            .build()
            .unwrap()
    }

    #[test]
    fn test_splits_bridged_cliques() {
        let graph = thicket_test::two_cliques(8, 0.1).build().unwrap();
        let mut halves = Vec::new();
        SpectralBisector::new(&settings())
            .bisect(&graph, |g| halves.push(g.global_ids().to_vec()))
            .unwrap();
        assert_eq!(halves.len(), 2);
        halves.sort();
        assert_eq!(halves[0], (0..8).collect::<Vec<u32>>());
        assert_eq!(halves[1], (8..16).collect::<Vec<u32>>());
    }

    #[test]
    fn test_partitions_cover_graph() {
        let graph = thicket_test::PlantedPartition {
            communities: 2,
            community_size: 30,
            p_in: 0.4,
            p_out: 0.02,
            seed: 3,
        }
        .generate()
        .build()
        .unwrap();
        let mut total = 0;
        let result = SpectralBisector::new(&ClusteringSettings::default())
            .bisect(&graph, |g| total += g.order());
        assert!(result.is_ok());
        assert_eq!(total, graph.order());
    }

    #[test]
    fn test_signless_vector_is_rejected() {
        // the operator maps every vector of a lone self-looped vertex to zero, so no sign
        // ever settles on either side
        let graph = thicket_graph::GraphBuilder::new()
            .add(0, 0, 1.0)
            .build()
            .unwrap();
        let mut calls = 0;
        let result =
            SpectralBisector::new(&ClusteringSettings::default()).bisect(&graph, |_| calls += 1);
        assert!(matches!(
            result,
            Err(Error::PartialConvergencePostprocessing(_))
        ));
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_zero_iteration_cap() {
        let settings = ClusteringSettings::builder()
            .with_max_iterations(0)
            .build()
            .unwrap();
        let graph = thicket_test::complete_graph(4).build().unwrap();
        let mut calls = 0;
        let result = SpectralBisector::new(&settings).bisect(&graph, |_| calls += 1);
        assert!(matches!(result, Err(Error::MaxIterationsExceeded { max_iterations: 0 })));
        assert_eq!(calls, 0);
    }
}

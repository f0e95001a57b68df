//! Deterministic start vectors for power iteration

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thicket_graph::Graph;
use xxhash_rust::xxh3::xxh3_64;

use crate::power_iteration::normalize;

/// Seeded source of power-iteration start vectors.
///
/// Each vector is drawn from a generator seeded with the run seed mixed with a hash of the
/// graph's global ids. A subgraph therefore always gets the same start vector, no matter when
/// the clustering loop gets around to it.
#[derive(Debug, Clone, Copy)]
pub struct InitialVectors {
    seed: u64,
}

impl InitialVectors {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// A unit-norm vector with entries drawn uniformly from [-1, 1)
    pub fn generate(&self, graph: &Graph) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(self.seed ^ vertex_set_hash(graph));
        let mut x: Vec<f64> = (0..graph.order()).map(|_| rng.gen_range(-1.0..1.0)).collect();
        normalize(&mut x);
        x
    }
}

fn vertex_set_hash(graph: &Graph) -> u64 {
    let bytes: Vec<u8> = graph
        .global_ids()
        .iter()
        .flat_map(|g| g.to_le_bytes())
        .collect();
    xxh3_64(&bytes)
}

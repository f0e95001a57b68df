//! Synthetic graph generators for thicket tests and benchmarks
//!
//! Every generator returns a [`GraphBuilder`], so callers can add extra edges before building.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thicket_graph::GraphBuilder;

/// Complete graph on `n` vertices with unit weights
pub fn complete_graph(n: u32) -> GraphBuilder {
    clique(GraphBuilder::new().with_order(n as usize), 0, n, 1.0)
}

/// Path `0 - 1 - ... - k` whose i-th edge has weight `weights[i]`
pub fn path_graph(weights: &[f64]) -> GraphBuilder {
    let mut builder = GraphBuilder::new().with_order(weights.len() + 1);
    for (i, &w) in weights.iter().enumerate() {
        builder.push(i as u32, i as u32 + 1, w);
    }
    builder
}

/// Two unit-weight cliques of `size` vertices joined by one edge of `bridge_weight`
/// between vertex `size - 1` and vertex `size`
pub fn two_cliques(size: u32, bridge_weight: f64) -> GraphBuilder {
    let builder = clique(GraphBuilder::new(), 0, size, 1.0);
    let mut builder = clique(builder, size, 2 * size, 1.0);
    if size > 0 {
        builder.push(size - 1, size, bridge_weight);
    }
    builder
}

/// `count` unconnected unit-weight cliques of `size` vertices each
pub fn disjoint_cliques(count: u32, size: u32) -> GraphBuilder {
    (0..count).fold(
        GraphBuilder::new().with_order((count * size) as usize),
        |builder, c| clique(builder, c * size, (c + 1) * size, 1.0),
    )
}

/// Parameters of a planted partition (stochastic block) graph
#[derive(Debug, Clone, Copy)]
pub struct PlantedPartition {
    pub communities: u32,
    pub community_size: u32,
    /// Edge probability inside a community
    pub p_in: f64,
    /// Edge probability across communities
    pub p_out: f64,
    pub seed: u64,
}

impl PlantedPartition {
    pub fn order(&self) -> usize {
        self.communities as usize * self.community_size as usize
    }

    /// Community of vertex `v`
    pub fn community(&self, v: u32) -> u32 {
        v / self.community_size.max(1)
    }

    /// Sample the graph. Edge weights are uniform in [1, 2).
    pub fn generate(&self) -> GraphBuilder {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let n = self.order() as u32;
        let mut builder = GraphBuilder::new().with_order(n as usize);
        for u in 0..n {
            for v in (u + 1)..n {
                let p = if self.community(u) == self.community(v) {
                    self.p_in
                } else {
                    self.p_out
                };
                if rng.gen::<f64>() < p {
                    builder.push(u, v, rng.gen_range(1.0..2.0));
                }
            }
        }
        builder
    }
}

fn clique(mut builder: GraphBuilder, from: u32, to: u32, weight: f64) -> GraphBuilder {
    for u in from..to {
        for v in (u + 1)..to {
            builder.push(u, v, weight);
        }
    }
    builder.with_order(to as usize)
}

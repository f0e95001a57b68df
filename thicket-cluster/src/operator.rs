//! Shifted, deflated normalized Laplacian
//!
//! For a graph with adjacency `A` and vertex weights `D`, the operator computes
//!
//! ```text
//! y = x + D^-1/2 A D^-1/2 x - 2 (v0 . x) v0        v0 = sqrt(w) / sqrt(sum w)
//! ```
//!
//! i.e. `2I - L` with the trivial eigenvector `v0` of `L` reflected away. Its dominant
//! eigenvector is the Fiedler vector of `L`. Vertices with zero weight contribute nothing to
//! the adjacency term.

use thicket_graph::Graph;

/// A square linear map applied matrix-free
pub trait LinearOperator {
    /// Dimension of the operator
    fn size(&self) -> usize;

    /// `out = M x`
    fn apply(&mut self, x: &[f64], out: &mut [f64]);
}

pub struct SpectralOperator<'g> {
    graph: &'g Graph,
    inv_sqrt_weights: Vec<f64>,
    v0: Vec<f64>,
    scratch: Vec<f64>,
}

impl<'g> SpectralOperator<'g> {
    pub fn new(graph: &'g Graph) -> Self {
        let weights = graph.weights();
        let inv_sqrt_weights = weights
            .iter()
            .map(|&w| if w > 0.0 { 1.0 / w.sqrt() } else { 0.0 })
            .collect();
        let norm = graph.total_weight().sqrt();
        let v0 = weights
            .iter()
            .map(|&w| if norm > 0.0 { w.sqrt() / norm } else { 0.0 })
            .collect();
        Self {
            graph,
            inv_sqrt_weights,
            v0,
            scratch: vec![0.0; graph.order()],
        }
    }

    /// The normalized trivial eigenvector
    pub fn v0(&self) -> &[f64] {
        &self.v0
    }
}

impl LinearOperator for SpectralOperator<'_> {
    fn size(&self) -> usize {
        self.graph.order()
    }

    fn apply(&mut self, x: &[f64], out: &mut [f64]) {
        let mu = 2.0 * dot(&self.v0, x);
        for ((s, &xi), &d) in self.scratch.iter_mut().zip(x).zip(&self.inv_sqrt_weights) {
            *s = xi * d;
        }
        self.graph.adjacency_product(&self.scratch, out);
        for i in 0..out.len() {
            out[i] = x[i] + out[i] * self.inv_sqrt_weights[i] - mu * self.v0[i];
        }
    }
}

pub(crate) fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use thicket_graph::GraphBuilder;

    #[test]
    fn test_v0_is_normalized() {
        let graph = GraphBuilder::new()
            .add(0, 1, 2.0)
            .add(1, 2, 3.0)
            .add(0, 2, 1.0)
            .build()
            .unwrap();
        let op = SpectralOperator::new(&graph);
        let norm: f64 = op.v0().iter().map(|x| x * x).sum();
        assert!((norm - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_v0_is_deflated() {
        let graph = thicket_test::two_cliques(4, 1.0).build().unwrap();
        let mut op = SpectralOperator::new(&graph);
        let v0 = op.v0().to_vec();
        let mut y = vec![0.0; graph.order()];
        op.apply(&v0, &mut y);
        // (2I - L) v0 = 2 v0, minus the 2 v0 reflection
        assert!(y.iter().all(|v| v.abs() < 1e-12));
    }

    #[test]
    fn test_known_product() {
        // K2 with unit weight: D^-1/2 A D^-1/2 = A, v0 = (1, 1) / sqrt(2)
        let graph = GraphBuilder::new().add(0, 1, 1.0).build().unwrap();
        let mut op = SpectralOperator::new(&graph);
        let x = [1.0, 0.0];
        let mut y = [0.0; 2];
        op.apply(&x, &mut y);
        // x + (0, 1) - 2 * (1/sqrt2) * (1/sqrt2, 1/sqrt2)
        assert!((y[0] - 0.0).abs() < 1e-12);
        assert!((y[1] - 0.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_weight_vertex() {
        let graph = GraphBuilder::new().with_order(3).add(0, 1, 1.0).build().unwrap();
        let mut op = SpectralOperator::new(&graph);
        let x = [0.0, 0.0, 1.0];
        let mut y = [0.0; 3];
        op.apply(&x, &mut y);
        assert_eq!(y, [0.0, 0.0, 1.0]);
    }
}

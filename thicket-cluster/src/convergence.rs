//! Sign-trail partial convergence
//!
//! Bisection only needs the *signs* of the Fiedler vector, and most of them settle long before
//! the vector itself does. The criterion keeps the last `T` signs of every entry in a ring of
//! slots (`iteration % T`) and is satisfied once a large enough fraction of entries has a
//! constant trail. The leftover entries are then classified by [`SignTrailConvergence::postprocess`].

use log::trace;
use thicket_common::{Error, Result};
use thicket_graph::Graph;

use crate::power_iteration::ConvergenceCriterion;

pub struct SignTrailConvergence<'g> {
    graph: &'g Graph,
    trail: Vec<Vec<i8>>,
    threshold: f64,
}

impl<'g> SignTrailConvergence<'g> {
    pub fn new(graph: &'g Graph, trail_size: usize, threshold: f64) -> Self {
        debug_assert!(trail_size > 0);
        Self {
            graph,
            trail: vec![vec![0; graph.order()]; trail_size],
            threshold,
        }
    }

    /// Whether all slots of `v`'s trail agree
    pub fn is_converged(&self, v: usize) -> bool {
        let reference = self.trail[0][v];
        self.trail[1..].iter().all(|slot| slot[v] == reference)
    }

    pub fn converged_fraction(&self) -> f64 {
        let n = self.graph.order();
        if n == 0 {
            return 1.0;
        }
        let converged = (0..n).filter(|&v| self.is_converged(v)).count();
        converged as f64 / n as f64
    }

    /// Assign every non-converged entry of `v` to -1 or +1.
    ///
    /// The converged entries of each sign span a reference subgraph. A non-converged vertex
    /// goes to the side it has the higher affinity with, where the affinity with a side is the
    /// edge weight from the vertex into it divided by the side's volume. Ties go to -1. When
    /// only one side has converged vertices everything goes there; when neither has any, the
    /// vector carries no usable signal and postprocessing fails.
    pub fn postprocess(&self, v: &mut [f64]) -> Result<()> {
        debug_assert_eq!(v.len(), self.graph.order());
        let n = self.graph.order();
        let converged: Vec<bool> = (0..n).map(|i| self.is_converged(i)).collect();
        let select = |sign: i8| -> Vec<usize> {
            (0..n)
                .filter(|&i| converged[i] && self.trail[0][i] == sign)
                .collect()
        };
        let negative = self.graph.local_subgraph(&select(-1));
        let positive = self.graph.local_subgraph(&select(1));
        let pending = converged.iter().filter(|&&c| !c).count();
        trace!(
            "Postprocessing {} non-converged entries against {} negative and {} positive",
            pending,
            negative.order(),
            positive.order()
        );

        match (negative.is_empty(), positive.is_empty()) {
            (true, true) => {
                return Err(Error::PartialConvergencePostprocessing(format!(
                    "no converged entries among {n} vertices to classify against"
                )))
            }
            (false, true) => assign_constant(v, &converged, -1.0),
            (true, false) => assign_constant(v, &converged, 1.0),
            (false, false) => {
                let negative_volume = self.volume(&negative);
                let positive_volume = self.volume(&positive);
                for i in (0..n).filter(|&i| !converged[i]) {
                    let to_negative = self.affinity(i, &negative, negative_volume);
                    let to_positive = self.affinity(i, &positive, positive_volume);
                    v[i] = if to_negative >= to_positive { -1.0 } else { 1.0 };
                }
            }
        }
        Ok(())
    }

    /// Volume of `side` measured in the full graph
    fn volume(&self, side: &Graph) -> f64 {
        side.global_ids()
            .iter()
            .map(|&g| self.graph.weight_for_global_id(g))
            .sum()
    }

    fn affinity(&self, v: usize, side: &Graph, volume: f64) -> f64 {
        if volume <= 0.0 {
            return 0.0;
        }
        let mut weight = 0.0;
        self.graph.traverse_incident_edges(v, |u, w| {
            if side.contains(self.graph.global_id(u)) {
                weight += w;
            }
        });
        weight / volume
    }
}

impl ConvergenceCriterion for SignTrailConvergence<'_> {
    fn satisfied(&mut self, _previous: &[f64], current: &[f64], iteration: usize) -> bool {
        let slot = iteration % self.trail.len();
        for (s, &x) in self.trail[slot].iter_mut().zip(current) {
            *s = sign(x);
        }
        // slots 0..T are all written once T iterations have run
        if iteration + 1 < self.trail.len() {
            return false;
        }
        self.converged_fraction() >= self.threshold
    }
}

fn assign_constant(v: &mut [f64], converged: &[bool], value: f64) {
    for (x, &c) in v.iter_mut().zip(converged) {
        if !c {
            *x = value;
        }
    }
}

fn sign(x: f64) -> i8 {
    if x > 0.0 {
        1
    } else if x < 0.0 {
        -1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thicket_graph::GraphBuilder;

    fn alternating(i: usize) -> f64 {
        2.0 * (i % 2) as f64 - 1.0
    }

    #[test]
    fn test_basic_convergence() {
        let graph = thicket_test::complete_graph(3).build().unwrap();
        let mut conv = SignTrailConvergence::new(&graph, 3, 1.0);
        assert!(!conv.satisfied(&[], &[1.0, -1.0, 1.0], 0));
        assert!(!conv.satisfied(&[], &[1.0, -1.0, -1.0], 1));
        assert!(!conv.satisfied(&[], &[1.0, -1.0, -1.0], 2));
        assert!(conv.satisfied(&[], &[1.0, -1.0, -1.0], 3));
    }

    #[test]
    fn test_stable_signs_converge_once_trail_is_full() {
        let graph = thicket_test::complete_graph(3).build().unwrap();
        let mut conv = SignTrailConvergence::new(&graph, 3, 1.0);
        let v = [1.0, -1.0, 1.0];
        assert!(!conv.satisfied(&[], &v, 0));
        assert!(!conv.satisfied(&[], &v, 1));
        assert!(conv.satisfied(&[], &v, 2));
    }

    #[test]
    fn test_converges_after_initial_perturbations() {
        let graph = thicket_test::complete_graph(3).build().unwrap();
        let mut conv = SignTrailConvergence::new(&graph, 3, 1.0);
        assert!(!conv.satisfied(&[], &[1.0, -1.0, 1.0], 0));
        assert!(!conv.satisfied(&[], &[1.0, -1.0, 1.0], 1));
        assert!(!conv.satisfied(&[], &[-1.0, -1.0, -1.0], 2));
        assert!(!conv.satisfied(&[], &[1.0, -1.0, -1.0], 3));
        assert!(!conv.satisfied(&[], &[1.0, -1.0, -1.0], 4));
        assert!(conv.satisfied(&[], &[1.0, -1.0, -1.0], 5));
    }

    #[test]
    fn test_postprocess_classifies_by_affinity() {
        let graph = thicket_test::path_graph(&[10.0, 1.0, 10.0]).build().unwrap();
        let mut conv = SignTrailConvergence::new(&graph, 4, 0.49);
        for i in 0..3 {
            let v = [-1.0, alternating(i), 1.0, alternating(i + 1)];
            assert!(!conv.satisfied(&[], &v, i));
        }
        let mut v = [-1.0, alternating(3), 1.0, alternating(4)];
        assert!(conv.satisfied(&[], &v, 3));
        conv.postprocess(&mut v).unwrap();
        assert_eq!(v, [-1.0, -1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_postprocess_single_side() {
        let graph = thicket_test::complete_graph(3).build().unwrap();
        let mut conv = SignTrailConvergence::new(&graph, 2, 0.1);
        conv.satisfied(&[], &[1.0, 1.0, -1.0], 0);
        conv.satisfied(&[], &[1.0, -1.0, 1.0], 1);
        let mut v = [1.0, -1.0, 1.0];
        conv.postprocess(&mut v).unwrap();
        assert_eq!(v, [1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_postprocess_fails_without_converged_entries() {
        let graph = thicket_test::complete_graph(2).build().unwrap();
        let mut conv = SignTrailConvergence::new(&graph, 2, 0.1);
        conv.satisfied(&[], &[1.0, -1.0], 0);
        conv.satisfied(&[], &[-1.0, 1.0], 1);
        let mut v = [-1.0, 1.0];
        assert!(matches!(
            conv.postprocess(&mut v),
            Err(Error::PartialConvergencePostprocessing(_))
        ));
    }

    #[test]
    fn test_zero_entries_have_their_own_sign() {
        let graph = GraphBuilder::new().add(0, 1, 1.0).build().unwrap();
        let mut conv = SignTrailConvergence::new(&graph, 1, 1.0);
        conv.satisfied(&[], &[0.0, 1.0], 0);
        assert!(conv.satisfied(&[], &[0.0, 1.0], 1));
        assert!(conv.is_converged(0));
        assert_eq!(conv.converged_fraction(), 1.0);
    }
}

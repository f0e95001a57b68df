//! Power iteration with a pluggable stopping rule

use std::time::Instant;

use log::trace;
use thicket_common::{Error, Result};

use crate::operator::LinearOperator;

/// Decides after every power-iteration round whether the current iterate is good enough
pub trait ConvergenceCriterion {
    fn satisfied(&mut self, previous: &[f64], current: &[f64], iteration: usize) -> bool;
}

/// Power iteration towards the dominant eigenvector of `op`.
///
/// `initial` must have unit norm. Fails with [`Error::MaxIterationsExceeded`] when the
/// criterion is still unsatisfied after `max_iterations` rounds.
pub fn power_iteration<O, C>(
    op: &mut O,
    criterion: &mut C,
    initial: Vec<f64>,
    max_iterations: usize,
) -> Result<Vec<f64>>
where
    O: LinearOperator + ?Sized,
    C: ConvergenceCriterion + ?Sized,
{
    debug_assert_eq!(initial.len(), op.size());
    let start = Instant::now();
    let mut previous = vec![0.0; op.size()];
    let mut current = initial;
    for i in 0..max_iterations {
        previous.copy_from_slice(&current);
        op.apply(&previous, &mut current);
        normalize(&mut current);
        if criterion.satisfied(&previous, &current, i) {
            trace!(
                "Power iteration for operator size {} finished after {} rounds in {:?}",
                op.size(),
                i + 1,
                start.elapsed()
            );
            return Ok(current);
        }
    }
    Err(Error::MaxIterationsExceeded { max_iterations })
}

/// Scale to unit L2 norm without touching the sign. A zero vector is left as is.
pub fn normalize(v: &mut [f64]) {
    let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm > 0.0 {
        v.iter_mut().for_each(|x| *x /= norm);
    }
}

//! Dedicated worker pool for per-vertex reductions
//!
//! Clustering alternates between long sequential phases (tree mutation) and short bursts of
//! embarrassingly parallel vertex work. Those bursts run on a private pool so they do not
//! compete with whatever the embedding application put on rayon's global pool.

use log::{debug, warn};
use once_cell::sync::Lazy;
use rayon::prelude::*;
use rayon::ThreadPool;

/// Below this many vertices the work runs on the calling thread
pub const PARALLEL_THRESHOLD: usize = 4096;

static POOL: Lazy<Option<ThreadPool>> = Lazy::new(|| {
    let threads = 2 * num_cpus::get();
    match rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("thicket-worker-{i}"))
        .build()
    {
        Ok(pool) => {
            debug!("Started graph worker pool with {} threads", threads);
            Some(pool)
        }
        Err(e) => {
            warn!("Could not build graph worker pool, using the global pool: {}", e);
            None
        }
    }
});

/// Run `op` inside the graph worker pool
pub fn install<R, F>(op: F) -> R
where
    R: Send,
    F: FnOnce() -> R + Send,
{
    match POOL.as_ref() {
        Some(pool) => pool.install(op),
        None => op(),
    }
}

/// Evaluate `f` for every vertex index in `0..n`, in index order.
///
/// The result only depends on `f`, never on the thread count, so sequential sums over it are
/// reproducible.
pub fn map_vertices<T, F>(n: usize, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
{
    if n < PARALLEL_THRESHOLD {
        return (0..n).map(f).collect();
    }
    install(|| (0..n).into_par_iter().map(&f).collect())
}

/// Overwrite `out[i]` with `f(i)` for every index
pub fn fill_vertices<F>(out: &mut [f64], f: F)
where
    F: Fn(usize) -> f64 + Sync + Send,
{
    if out.len() < PARALLEL_THRESHOLD {
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = f(i);
        }
        return;
    }
    install(|| {
        out.par_iter_mut()
            .enumerate()
            .for_each(|(i, slot)| *slot = f(i))
    });
}

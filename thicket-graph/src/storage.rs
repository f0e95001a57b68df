//! Symmetric CSR edge storage and its builder

use std::sync::Arc;

use thicket_common::{Error, Result};

use crate::graph::Graph;

/// Compressed sparse row adjacency. Every undirected edge is stored in both directions,
/// self-loops once.
#[derive(Debug, Clone)]
pub struct CsrStorage {
    offsets: Vec<u64>, // order + 1
    heads: Vec<u32>,
    weights: Vec<f64>,
}

impl CsrStorage {
    /// Number of vertices
    pub fn order(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Number of stored (directed) adjacency entries
    pub fn entries(&self) -> usize {
        self.heads.len()
    }

    /// Neighbours and edge weights of `v`, with heads in ascending order
    pub fn neighbors(&self, v: u32) -> (&[u32], &[f64]) {
        let start = self.offsets[v as usize] as usize;
        let end = self.offsets[v as usize + 1] as usize;
        (&self.heads[start..end], &self.weights[start..end])
    }
}

/// Collects undirected weighted edges and freezes them into a [`Graph`]
#[derive(Debug, Default, Clone)]
pub struct GraphBuilder {
    order: usize,
    edges: Vec<(u32, u32, f64)>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve vertex ids `0..order` even when some of them end up isolated
    pub fn with_order(mut self, order: usize) -> Self {
        self.order = self.order.max(order);
        self
    }

    /// Add an undirected edge. Repeated edges have their weights summed.
    pub fn add(mut self, u: u32, v: u32, weight: f64) -> Self {
        self.push(u, v, weight);
        self
    }

    pub fn push(&mut self, u: u32, v: u32, weight: f64) {
        self.edges.push((u, v, weight));
    }

    pub fn build(self) -> Result<Graph> {
        Ok(Graph::root(Arc::new(self.build_storage()?)))
    }

    fn build_storage(self) -> Result<CsrStorage> {
        let mut order = self.order;
        let mut directed = Vec::with_capacity(self.edges.len() * 2);
        for (u, v, w) in self.edges {
            if !w.is_finite() || w < 0.0 {
                return Err(Error::InvalidGraph(format!(
                    "edge ({u}, {v}) has invalid weight {w}"
                )));
            }
            order = order.max(u as usize + 1).max(v as usize + 1);
            directed.push((u, v, w));
            if u != v {
                directed.push((v, u, w));
            }
        }
        if order > u32::MAX as usize {
            return Err(Error::InvalidGraph(format!("{order} vertices exceed the u32 id space")));
        }

        directed.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

        let mut offsets = vec![0u64; order + 1];
        let mut heads = Vec::with_capacity(directed.len());
        let mut weights: Vec<f64> = Vec::with_capacity(directed.len());
        let mut last: Option<(u32, u32)> = None;
        for (u, v, w) in directed {
            if last == Some((u, v)) {
                if let Some(acc) = weights.last_mut() {
                    *acc += w;
                }
                continue;
            }
            last = Some((u, v));
            heads.push(v);
            weights.push(w);
            offsets[u as usize + 1] += 1;
        }
        for i in 0..order {
            offsets[i + 1] += offsets[i];
        }

        Ok(CsrStorage {
            offsets,
            heads,
            weights,
        })
    }
}

//! Similarity between a subgraph and one of its supergraphs

use thicket_common::SimilarityMetric;
use thicket_graph::{parallel, Graph};

/// Similarity of `subgraph` to `supergraph`. Both metrics return 0 for an empty subgraph.
pub fn similarity(metric: SimilarityMetric, supergraph: &Graph, subgraph: &Graph) -> f64 {
    match metric {
        SimilarityMetric::Overlap => overlap(supergraph, subgraph),
        SimilarityMetric::NormalizedCut => normalized_cut(supergraph, subgraph),
    }
}

/// Share of the subgraph vertices' supergraph weight that stays inside the subgraph
pub fn overlap(supergraph: &Graph, subgraph: &Graph) -> f64 {
    let mut inner = 0.0;
    let mut embedding = 0.0;
    for (local, global) in subgraph.vertices() {
        inner += subgraph.weight(local);
        embedding += supergraph.weight_for_global_id(global);
    }
    if embedding > 0.0 {
        inner / embedding
    } else {
        0.0
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct CutWeights {
    subgraph: f64,
    complement: f64,
    cut: f64,
}

/// Half the normalized cut between `subgraph` and its complement within `supergraph`
pub fn normalized_cut(supergraph: &Graph, subgraph: &Graph) -> f64 {
    if supergraph.is_empty() || subgraph.is_empty() {
        return 0.0;
    }
    let inside: Vec<bool> = supergraph
        .global_ids()
        .iter()
        .map(|&g| subgraph.contains(g))
        .collect();
    let per_vertex = parallel::map_vertices(supergraph.order(), |u| {
        let mut acc = CutWeights::default();
        supergraph.traverse_incident_edges(u, |v, w| match (inside[u], inside[v]) {
            (true, true) => acc.subgraph += w,
            (false, false) => acc.complement += w,
            _ => {
                acc.subgraph += w;
                acc.complement += w;
                acc.cut += w;
            }
        });
        acc
    });
    let total = per_vertex.iter().fold(CutWeights::default(), |a, b| CutWeights {
        subgraph: a.subgraph + b.subgraph,
        complement: a.complement + b.complement,
        cut: a.cut + b.cut,
    });

    let ncut = match (total.subgraph > 0.0, total.complement > 0.0) {
        (true, true) => total.cut / total.subgraph + total.cut / total.complement,
        (true, false) => total.cut / total.subgraph,
        (false, true) => total.cut / total.complement,
        (false, false) => 0.0,
    };
    ncut / 2.0
}

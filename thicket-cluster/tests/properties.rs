use std::collections::BTreeSet;

use thicket_cluster::{run, ClusterTree, Postprocessing, RecursiveClustering, Scheduling};
use thicket_common::{ClusteringSettings, PassKind, SimilarityMetric};
use thicket_graph::{Graph, GraphBuilder};
use thicket_test::PlantedPartition;

fn planted(seed: u64) -> Graph {
    PlantedPartition {
        communities: 5,
        community_size: 30,
        p_in: 0.35,
        p_out: 0.01,
        seed,
    }
    .generate()
    .build()
    .unwrap()
}

fn settings(min_cluster_size: usize) -> ClusteringSettings {
    ClusteringSettings::builder()
        .with_min_cluster_size(min_cluster_size)
        .build()
        .unwrap()
}

/// Every vertex sits in exactly one remainder of a live cluster
fn assert_conserved(tree: &ClusterTree, order: usize) {
    let mut all = Vec::new();
    tree.traverse(tree.root(), |c| all.extend_from_slice(c.remainder()));
    all.sort_unstable();
    assert_eq!(all, (0..order as u32).collect::<Vec<_>>());
}

#[test]
fn vertices_are_conserved() {
    for seed in [1, 2, 3] {
        let graph = planted(seed);
        let tree = run(&graph, &settings(10));
        assert_conserved(&tree, graph.order());
    }
}

#[test]
fn vertices_are_conserved_with_all_metrics() {
    let graph = planted(4);
    for metric in [SimilarityMetric::Overlap, SimilarityMetric::NormalizedCut] {
        for merge in [false, true] {
            let settings = ClusteringSettings::builder()
                .with_min_cluster_size(8)
                .with_similarity_metric(metric)
                .with_merge_chain_remainders(merge)
                .build()
                .unwrap();
            assert_conserved(&run(&graph, &settings), graph.order());
        }
    }
}

#[test]
fn runs_are_deterministic() {
    let graph = planted(7);
    let settings = settings(10);
    let first = run(&graph, &settings);
    let second = run(&graph, &settings);
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert_eq!(first.canonical(first.root()), second.canonical(second.root()));
}

#[test]
fn empty_graph_gives_empty_root() {
    let graph = GraphBuilder::new().build().unwrap();
    let tree = run(&graph, &ClusteringSettings::default());
    assert!(tree.remainder(tree.root()).is_empty());
    assert_eq!(tree.child_count(tree.root()), 0);
    assert_eq!(tree.cluster_count(), 1);
}

#[test]
fn zero_iteration_cap_still_conserves_vertices() {
    let graph = planted(8);
    let settings = ClusteringSettings::builder()
        .with_min_cluster_size(10)
        .with_max_iterations(0)
        .build()
        .unwrap();
    let tree = run(&graph, &settings);
    assert_conserved(&tree, graph.order());
}

#[test]
fn postprocessing_reaches_a_fixpoint() {
    let graph = planted(9);
    let settings = settings(10);
    let mut tree = run(&graph, &settings);
    let before = tree.fingerprint();
    assert!(!Postprocessing::new(&graph, &settings).apply(&mut tree));
    assert_eq!(tree.fingerprint(), before);
}

#[test]
fn full_pass_catalogue_reaches_a_fixpoint() {
    let graph = planted(6);
    let settings = ClusteringSettings::builder()
        .with_min_cluster_size(8)
        .with_min_children(2)
        .with_max_parent_similarity(0.9)
        .with_postprocessors([
            PassKind::AncestorSimilarity,
            PassKind::ConsistencyGuarding,
            PassKind::ChainRedistribution,
            PassKind::RemainderSize,
            PassKind::DescendantCollapsing,
            PassKind::SingletonCollapsing,
            PassKind::Flattening,
        ])
        .build()
        .unwrap();
    let mut tree = run(&graph, &settings);
    assert_conserved(&tree, graph.order());
    assert!(tree.max_depth() <= 1);
    assert!(!Postprocessing::new(&graph, &settings).apply(&mut tree));
}

#[test]
fn scheduling_order_does_not_matter() {
    let graph = planted(10);
    let settings = settings(10);
    let reference = RecursiveClustering::new(&graph, &settings).run();
    for scheduling in [Scheduling::ShallowestFirst, Scheduling::Fifo] {
        let tree = RecursiveClustering::new(&graph, &settings)
            .with_scheduling(scheduling)
            .run();
        assert_eq!(tree.fingerprint(), reference.fingerprint(), "{scheduling:?}");
    }
}

#[test]
fn planted_communities_are_recovered() {
    let params = PlantedPartition {
        communities: 2,
        community_size: 40,
        p_in: 0.5,
        p_out: 0.005,
        seed: 21,
    };
    let graph = params.generate().build().unwrap();
    let settings = ClusteringSettings::builder()
        .with_min_cluster_size(10)
        .with_postprocessors([PassKind::ConsistencyGuarding, PassKind::RemainderSize])
        .build()
        .unwrap();
    let tree = run(&graph, &settings);
    assert_conserved(&tree, graph.order());

    // no cluster below the root mixes communities
    for child in tree.children(tree.root()) {
        let communities: BTreeSet<u32> = tree
            .aggregate_vertices(child)
            .into_iter()
            .map(|v| params.community(v))
            .collect();
        assert_eq!(communities.len(), 1);
    }
}

//! Tree-rewriting passes applied to the raw cluster tree
//!
//! The driver works in rounds. Each round first iterates the cyclic passes (ancestor
//! similarity, consistency guarding) until none of them changes the tree, then runs the
//! finishing passes (chain redistribution, remainder size and the optional collapsing passes)
//! once. A round in which a finishing pass changed something is followed by another one.
//! Every change moves vertices or clusters towards the root or removes a cluster, so the
//! driver terminates, and once it has, applying it again changes nothing.

mod ancestor_similarity;
mod chain_redistribution;
mod consistency_guarding;
mod descendant_collapsing;
mod flattening;
mod remainder_size;
mod singleton_collapsing;
mod traversal;

use std::time::Instant;

use log::debug;
use thicket_common::{ClusteringSettings, PassKind};
use thicket_graph::Graph;

use crate::cluster::{ClusterId, ClusterTree};

pub use ancestor_similarity::AncestorSimilarity;
pub use chain_redistribution::ChainRedistribution;
pub use consistency_guarding::ConsistencyGuarding;
pub use descendant_collapsing::DescendantCollapsing;
pub use flattening::Flattening;
pub use remainder_size::RemainderSize;
pub use singleton_collapsing::SingletonCollapsing;
pub use traversal::TraversalMode;

/// A configured postprocessing pass
pub enum Postprocessor<'g> {
    AncestorSimilarity(AncestorSimilarity<'g>),
    /// Consistency guarding that re-sweeps every subtree it changes
    Cascading(ConsistencyGuarding<'g>),
    ChainRedistribution(ChainRedistribution),
    RemainderSize(RemainderSize),
    DescendantCollapsing(DescendantCollapsing),
    SingletonCollapsing(SingletonCollapsing),
    Flattening(Flattening),
}

impl<'g> Postprocessor<'g> {
    pub fn new(kind: PassKind, graph: &'g Graph, settings: &ClusteringSettings) -> Self {
        match kind {
            PassKind::AncestorSimilarity => Postprocessor::AncestorSimilarity(
                AncestorSimilarity::new(
                    graph,
                    settings.similarity_metric(),
                    settings.min_parent_similarity(),
                )
                .with_max_similarity(settings.max_parent_similarity())
                .with_target_similarity(settings.target_parent_similarity()),
            ),
            PassKind::ConsistencyGuarding => {
                Postprocessor::Cascading(ConsistencyGuarding::new(graph, settings))
            }
            PassKind::ChainRedistribution => Postprocessor::ChainRedistribution(
                ChainRedistribution::new(settings.merge_chain_remainders()),
            ),
            PassKind::RemainderSize => {
                Postprocessor::RemainderSize(RemainderSize::new(settings.min_cluster_size()))
            }
            PassKind::DescendantCollapsing => Postprocessor::DescendantCollapsing(
                DescendantCollapsing::new(settings.min_children()),
            ),
            PassKind::SingletonCollapsing => {
                Postprocessor::SingletonCollapsing(SingletonCollapsing)
            }
            PassKind::Flattening => Postprocessor::Flattening(Flattening),
        }
    }

    pub fn kind(&self) -> PassKind {
        match self {
            Postprocessor::AncestorSimilarity(_) => PassKind::AncestorSimilarity,
            Postprocessor::Cascading(_) => PassKind::ConsistencyGuarding,
            Postprocessor::ChainRedistribution(_) => PassKind::ChainRedistribution,
            Postprocessor::RemainderSize(_) => PassKind::RemainderSize,
            Postprocessor::DescendantCollapsing(_) => PassKind::DescendantCollapsing,
            Postprocessor::SingletonCollapsing(_) => PassKind::SingletonCollapsing,
            Postprocessor::Flattening(_) => PassKind::Flattening,
        }
    }

    pub fn traversal_mode(&self) -> TraversalMode {
        match self {
            Postprocessor::ChainRedistribution(_) => TraversalMode::GlobalCustom,
            _ => TraversalMode::LocalBottomUp,
        }
    }

    /// Run the pass once over the tree. Reports whether anything changed.
    pub fn run(&self, tree: &mut ClusterTree) -> bool {
        match self.traversal_mode() {
            TraversalMode::LocalBottomUp => {
                traversal::bottom_up(tree, |tree, id| self.apply_local(tree, id))
            }
            TraversalMode::GlobalCustom => self.apply_global(tree),
        }
    }

    fn apply_local(&self, tree: &mut ClusterTree, id: ClusterId) -> bool {
        match self {
            Postprocessor::AncestorSimilarity(pass) => pass.apply(tree, id),
            Postprocessor::Cascading(pass) => {
                traversal::cascade(tree, id, |tree, id| pass.apply(tree, id))
            }
            Postprocessor::RemainderSize(pass) => pass.apply(tree, id),
            Postprocessor::DescendantCollapsing(pass) => pass.apply(tree, id),
            Postprocessor::SingletonCollapsing(pass) => pass.apply(tree, id),
            Postprocessor::Flattening(pass) => pass.apply(tree, id),
            Postprocessor::ChainRedistribution(_) => false,
        }
    }

    fn apply_global(&self, tree: &mut ClusterTree) -> bool {
        match self {
            Postprocessor::ChainRedistribution(pass) => pass.apply(tree),
            _ => false,
        }
    }
}

/// The configured pipeline of postprocessing passes
pub struct Postprocessing<'g> {
    cyclic: Vec<Postprocessor<'g>>,
    finishing: Vec<Postprocessor<'g>>,
}

impl<'g> Postprocessing<'g> {
    pub fn new(graph: &'g Graph, settings: &ClusteringSettings) -> Self {
        let (cyclic, finishing): (Vec<_>, Vec<_>) = settings
            .postprocessors()
            .iter()
            .map(|&kind| Postprocessor::new(kind, graph, settings))
            .partition(|pass| pass.kind().is_cyclic());
        Self { cyclic, finishing }
    }

    /// Rewrite `tree` until no pass changes it. Reports whether anything changed.
    pub fn apply(&self, tree: &mut ClusterTree) -> bool {
        let start = Instant::now();
        let mut changed = false;
        let mut rounds = 0;
        loop {
            rounds += 1;
            while run_all(&self.cyclic, tree) {
                changed = true;
            }
            if !run_all(&self.finishing, tree) {
                break;
            }
            changed = true;
        }
        debug!(
            "Postprocessing finished after {} rounds in {:?}. There were {} to the cluster hierarchy",
            rounds,
            start.elapsed(),
            if changed { "changes" } else { "no changes" }
        );
        changed
    }
}

fn run_all(passes: &[Postprocessor<'_>], tree: &mut ClusterTree) -> bool {
    let mut changed = false;
    for pass in passes {
        let start = Instant::now();
        let pass_changed = pass.run(tree);
        debug!(
            "{} finished in {:?}. There were {} to the cluster hierarchy",
            pass.kind().name(),
            start.elapsed(),
            if pass_changed { "changes" } else { "no changes" }
        );
        changed |= pass_changed;
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recursive::RecursiveClustering;

    fn planted() -> Graph {
        thicket_test::PlantedPartition {
            communities: 4,
            community_size: 20,
            p_in: 0.5,
            p_out: 0.03,
            seed: 17,
        }
        .generate()
        .build()
        .unwrap()
    }

    #[test]
    fn test_pipeline_split() {
        let graph = planted();
        let settings = ClusteringSettings::default();
        let pipeline = Postprocessing::new(&graph, &settings);
        let cyclic: Vec<PassKind> = pipeline.cyclic.iter().map(|p| p.kind()).collect();
        let finishing: Vec<PassKind> = pipeline.finishing.iter().map(|p| p.kind()).collect();
        assert_eq!(
            cyclic,
            vec![PassKind::AncestorSimilarity, PassKind::ConsistencyGuarding]
        );
        assert_eq!(
            finishing,
            vec![PassKind::ChainRedistribution, PassKind::RemainderSize]
        );
        assert_eq!(
            pipeline.finishing[0].traversal_mode(),
            TraversalMode::GlobalCustom
        );
    }

    #[test]
    fn test_postprocessing_is_idempotent() {
        let graph = planted();
        let settings = ClusteringSettings::builder()
            .with_min_cluster_size(5)
            .build()
            .unwrap();
        let mut tree = RecursiveClustering::new(&graph, &settings).run();
        let pipeline = Postprocessing::new(&graph, &settings);
        pipeline.apply(&mut tree);
        let fingerprint = tree.fingerprint();
        assert!(!pipeline.apply(&mut tree));
        assert_eq!(tree.fingerprint(), fingerprint);

        let mut all = tree.aggregate_vertices(tree.root());
        all.sort_unstable();
        assert_eq!(all, (0..80).collect::<Vec<u32>>());
    }

    #[test]
    fn test_empty_pipeline_changes_nothing() {
        let graph = planted();
        let settings = ClusteringSettings::builder()
            .with_min_cluster_size(5)
            .with_postprocessors([])
            .build()
            .unwrap();
        let mut tree = RecursiveClustering::new(&graph, &settings).run();
        let fingerprint = tree.fingerprint();
        assert!(!Postprocessing::new(&graph, &settings).apply(&mut tree));
        assert_eq!(tree.fingerprint(), fingerprint);
    }

    #[test]
    fn test_flattening_pipeline_leaves_one_level() {
        let graph = planted();
        let settings = ClusteringSettings::builder()
            .with_min_cluster_size(5)
            .with_postprocessors([PassKind::SingletonCollapsing, PassKind::Flattening])
            .build()
            .unwrap();
        let pipeline = Postprocessing::new(&graph, &settings);
        assert!(pipeline.cyclic.is_empty());
        assert!(pipeline
            .finishing
            .iter()
            .all(|p| p.traversal_mode() == TraversalMode::LocalBottomUp));

        let mut tree = RecursiveClustering::new(&graph, &settings).run();
        pipeline.apply(&mut tree);
        assert!(tree.max_depth() <= 1);
        assert_ne!(tree.child_count(tree.root()), 1);
        assert!(!pipeline.apply(&mut tree));

        let mut all = tree.aggregate_vertices(tree.root());
        all.sort_unstable();
        assert_eq!(all, (0..80).collect::<Vec<u32>>());
    }

    #[test]
    fn test_bottom_up_visits_children_first() {
        let mut tree = ClusterTree::new();
        let root = tree.root();
        let a = tree.add_child(root);
        let b = tree.add_child(a);
        let c = tree.add_child(root);
        tree.add_to_remainder(c, [0, 1]);
        let mut order = Vec::new();
        traversal::bottom_up(&mut tree, |_, id| {
            order.push(id);
            false
        });
        assert_eq!(order, vec![b, c, a, root]);
    }

    #[test]
    fn test_cascade_resweeps_changed_subtree() {
        let mut tree = ClusterTree::new();
        let root = tree.root();
        let a = tree.add_child(root);
        let b = tree.add_child(a);
        let mut calls = Vec::new();
        // the first call on `a` folds it away; `b` must be revisited
        let changed = traversal::cascade(&mut tree, a, |tree, id| {
            calls.push(id);
            if id == a {
                tree.assimilate_child(id);
                true
            } else {
                false
            }
        });
        assert!(changed);
        assert_eq!(calls, vec![a, b]);
        assert_eq!(tree.parent(b), Some(root));
    }
}

//! Clustering settings
//!
//! `ClusteringSettings` is immutable once built. Both construction paths (the builder and
//! TOML deserialisation) funnel through [`ClusteringSettingsBuilder::build`], so a value that
//! reaches the engine has always been validated.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Per-vertex consistency metric used by the consistency guard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AffiliationMetric {
    /// Weight inside the candidate divided by weight inside the reference graph
    RelativeWeight,
}

/// Subgraph/supergraph similarity used by the ancestor similarity pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMetric {
    Overlap,
    NormalizedCut,
}

/// Postprocessing passes, in the order they are listed in the settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassKind {
    AncestorSimilarity,
    ConsistencyGuarding,
    ChainRedistribution,
    RemainderSize,
    DescendantCollapsing,
    SingletonCollapsing,
    Flattening,
}

impl PassKind {
    /// Cyclic passes are iterated to a fixpoint; the others run once per round
    pub fn is_cyclic(self) -> bool {
        matches!(self, PassKind::AncestorSimilarity | PassKind::ConsistencyGuarding)
    }

    pub fn name(self) -> &'static str {
        match self {
            PassKind::AncestorSimilarity => "ancestor_similarity",
            PassKind::ConsistencyGuarding => "consistency_guarding",
            PassKind::ChainRedistribution => "chain_redistribution",
            PassKind::RemainderSize => "remainder_size",
            PassKind::DescendantCollapsing => "descendant_collapsing",
            PassKind::SingletonCollapsing => "singleton_collapsing",
            PassKind::Flattening => "flattening",
        }
    }
}

pub const DEFAULT_MIN_CLUSTER_SIZE: usize = 50;
pub const DEFAULT_MIN_VERTEX_AFFILIATION: f64 = 0.1;
pub const DEFAULT_MIN_PARENT_SIMILARITY: f64 = 0.05;
/// Similarities never exceed 1, so the default never folds a cluster into its parent
pub const DEFAULT_MAX_PARENT_SIMILARITY: f64 = 1.0;
pub const DEFAULT_TARGET_PARENT_SIMILARITY: f64 = 0.98;
pub const DEFAULT_MIN_CHILDREN: usize = 0;
pub const DEFAULT_TRAIL_SIZE: usize = 20;
pub const DEFAULT_CONVERGENCE_THRESHOLD: f64 = 0.95;
pub const DEFAULT_MAX_ITERATIONS: usize = 540;
pub const DEFAULT_RANDOM_SEED: u64 = 42133742;

const DEFAULT_POSTPROCESSORS: [PassKind; 4] = [
    PassKind::AncestorSimilarity,
    PassKind::ConsistencyGuarding,
    PassKind::ChainRedistribution,
    PassKind::RemainderSize,
];

/// Validated settings for a clustering run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSettings", into = "RawSettings")]
pub struct ClusteringSettings {
    min_cluster_size: usize,
    min_vertex_affiliation: f64,
    min_parent_similarity: f64,
    max_parent_similarity: f64,
    target_parent_similarity: f64,
    min_children: usize,
    affiliation_metric: AffiliationMetric,
    similarity_metric: SimilarityMetric,
    trail_size: usize,
    convergence_threshold: f64,
    max_iterations: usize,
    random_seed: u64,
    merge_chain_remainders: bool,
    postprocessors: Vec<PassKind>,
}

impl ClusteringSettings {
    pub fn builder() -> ClusteringSettingsBuilder {
        ClusteringSettingsBuilder::default()
    }

    /// Parse and validate settings from a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Load settings from a TOML file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn min_cluster_size(&self) -> usize {
        self.min_cluster_size
    }

    pub fn min_vertex_affiliation(&self) -> f64 {
        self.min_vertex_affiliation
    }

    pub fn min_parent_similarity(&self) -> f64 {
        self.min_parent_similarity
    }

    /// Clusters more similar to their parent than this are folded into it
    pub fn max_parent_similarity(&self) -> f64 {
        self.max_parent_similarity
    }

    /// Similarity at which the search for a new ancestor stops early
    pub fn target_parent_similarity(&self) -> f64 {
        self.target_parent_similarity
    }

    /// Minimum number of children below which grandchildren move up
    pub fn min_children(&self) -> usize {
        self.min_children
    }

    pub fn affiliation_metric(&self) -> AffiliationMetric {
        self.affiliation_metric
    }

    pub fn similarity_metric(&self) -> SimilarityMetric {
        self.similarity_metric
    }

    pub fn trail_size(&self) -> usize {
        self.trail_size
    }

    pub fn convergence_threshold(&self) -> f64 {
        self.convergence_threshold
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn random_seed(&self) -> u64 {
        self.random_seed
    }

    pub fn merge_chain_remainders(&self) -> bool {
        self.merge_chain_remainders
    }

    pub fn postprocessors(&self) -> &[PassKind] {
        &self.postprocessors
    }
}

impl Default for ClusteringSettings {
    fn default() -> Self {
        Self {
            min_cluster_size: DEFAULT_MIN_CLUSTER_SIZE,
            min_vertex_affiliation: DEFAULT_MIN_VERTEX_AFFILIATION,
            min_parent_similarity: DEFAULT_MIN_PARENT_SIMILARITY,
            max_parent_similarity: DEFAULT_MAX_PARENT_SIMILARITY,
            target_parent_similarity: DEFAULT_TARGET_PARENT_SIMILARITY,
            min_children: DEFAULT_MIN_CHILDREN,
            affiliation_metric: AffiliationMetric::RelativeWeight,
            similarity_metric: SimilarityMetric::Overlap,
            trail_size: DEFAULT_TRAIL_SIZE,
            convergence_threshold: DEFAULT_CONVERGENCE_THRESHOLD,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            random_seed: DEFAULT_RANDOM_SEED,
            merge_chain_remainders: false,
            postprocessors: DEFAULT_POSTPROCESSORS.to_vec(),
        }
    }
}

/// Builder for [`ClusteringSettings`]
#[derive(Debug, Clone, Default)]
pub struct ClusteringSettingsBuilder {
    settings: ClusteringSettings,
}

impl ClusteringSettingsBuilder {
    pub fn with_min_cluster_size(mut self, value: usize) -> Self {
        self.settings.min_cluster_size = value;
        self
    }

    pub fn with_min_vertex_affiliation(mut self, value: f64) -> Self {
        self.settings.min_vertex_affiliation = value;
        self
    }

    pub fn with_min_parent_similarity(mut self, value: f64) -> Self {
        self.settings.min_parent_similarity = value;
        self
    }

    pub fn with_max_parent_similarity(mut self, value: f64) -> Self {
        self.settings.max_parent_similarity = value;
        self
    }

    pub fn with_target_parent_similarity(mut self, value: f64) -> Self {
        self.settings.target_parent_similarity = value;
        self
    }

    pub fn with_min_children(mut self, value: usize) -> Self {
        self.settings.min_children = value;
        self
    }

    pub fn with_affiliation_metric(mut self, value: AffiliationMetric) -> Self {
        self.settings.affiliation_metric = value;
        self
    }

    pub fn with_similarity_metric(mut self, value: SimilarityMetric) -> Self {
        self.settings.similarity_metric = value;
        self
    }

    pub fn with_trail_size(mut self, value: usize) -> Self {
        self.settings.trail_size = value;
        self
    }

    pub fn with_convergence_threshold(mut self, value: f64) -> Self {
        self.settings.convergence_threshold = value;
        self
    }

    pub fn with_max_iterations(mut self, value: usize) -> Self {
        self.settings.max_iterations = value;
        self
    }

    pub fn with_random_seed(mut self, value: u64) -> Self {
        self.settings.random_seed = value;
        self
    }

    pub fn with_merge_chain_remainders(mut self, value: bool) -> Self {
        self.settings.merge_chain_remainders = value;
        self
    }

    pub fn with_postprocessors(mut self, passes: impl IntoIterator<Item = PassKind>) -> Self {
        self.settings.postprocessors = passes.into_iter().collect();
        self
    }

    /// Validate and freeze the settings
    pub fn build(self) -> Result<ClusteringSettings> {
        let s = self.settings;
        if s.min_cluster_size == 0 {
            return Err(Error::InvalidSettings(
                "min_cluster_size must be at least 1".into(),
            ));
        }
        check_unit_interval("min_vertex_affiliation", s.min_vertex_affiliation)?;
        check_unit_interval("min_parent_similarity", s.min_parent_similarity)?;
        check_unit_interval("max_parent_similarity", s.max_parent_similarity)?;
        check_unit_interval("target_parent_similarity", s.target_parent_similarity)?;
        if s.min_parent_similarity > s.max_parent_similarity {
            return Err(Error::InvalidSettings(format!(
                "min_parent_similarity {} exceeds max_parent_similarity {}",
                s.min_parent_similarity, s.max_parent_similarity
            )));
        }
        if s.trail_size == 0 {
            return Err(Error::InvalidSettings("trail_size must be at least 1".into()));
        }
        if !(s.convergence_threshold > 0.0 && s.convergence_threshold <= 1.0) {
            return Err(Error::InvalidSettings(format!(
                "convergence_threshold must be within (0, 1], got {}",
                s.convergence_threshold
            )));
        }
        let mut seen = BTreeSet::new();
        for pass in &s.postprocessors {
            if !seen.insert(*pass) {
                return Err(Error::InvalidSettings(format!(
                    "postprocessor {} listed more than once",
                    pass.name()
                )));
            }
        }
        Ok(s)
    }
}

fn check_unit_interval(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidSettings(format!(
            "{name} must be within [0, 1], got {value}"
        )))
    }
}

/// Unvalidated wire form of the settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawSettings {
    min_cluster_size: usize,
    min_vertex_affiliation: f64,
    min_parent_similarity: f64,
    max_parent_similarity: f64,
    target_parent_similarity: f64,
    min_children: usize,
    affiliation_metric: AffiliationMetric,
    similarity_metric: SimilarityMetric,
    trail_size: usize,
    convergence_threshold: f64,
    max_iterations: usize,
    random_seed: u64,
    merge_chain_remainders: bool,
    postprocessors: Vec<PassKind>,
}

impl Default for RawSettings {
    fn default() -> Self {
        ClusteringSettings::default().into()
    }
}

impl TryFrom<RawSettings> for ClusteringSettings {
    type Error = Error;

    fn try_from(raw: RawSettings) -> Result<Self> {
        ClusteringSettings::builder()
            .with_min_cluster_size(raw.min_cluster_size)
            .with_min_vertex_affiliation(raw.min_vertex_affiliation)
            .with_min_parent_similarity(raw.min_parent_similarity)
            .with_max_parent_similarity(raw.max_parent_similarity)
            .with_target_parent_similarity(raw.target_parent_similarity)
            .with_min_children(raw.min_children)
            .with_affiliation_metric(raw.affiliation_metric)
            .with_similarity_metric(raw.similarity_metric)
            .with_trail_size(raw.trail_size)
            .with_convergence_threshold(raw.convergence_threshold)
            .with_max_iterations(raw.max_iterations)
            .with_random_seed(raw.random_seed)
            .with_merge_chain_remainders(raw.merge_chain_remainders)
            .with_postprocessors(raw.postprocessors)
            .build()
    }
}

impl From<ClusteringSettings> for RawSettings {
    fn from(s: ClusteringSettings) -> Self {
        Self {
            min_cluster_size: s.min_cluster_size,
            min_vertex_affiliation: s.min_vertex_affiliation,
            min_parent_similarity: s.min_parent_similarity,
            max_parent_similarity: s.max_parent_similarity,
            target_parent_similarity: s.target_parent_similarity,
            min_children: s.min_children,
            affiliation_metric: s.affiliation_metric,
            similarity_metric: s.similarity_metric,
            trail_size: s.trail_size,
            convergence_threshold: s.convergence_threshold,
            max_iterations: s.max_iterations,
            random_seed: s.random_seed,
            merge_chain_remainders: s.merge_chain_remainders,
            postprocessors: s.postprocessors,
        }
    }
}

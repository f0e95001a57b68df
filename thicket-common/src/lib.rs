//! Common utilities for the thicket toolkit

pub mod error;
pub mod settings;

pub use error::{Error, Result};
pub use settings::{
    AffiliationMetric, ClusteringSettings, ClusteringSettingsBuilder, PassKind, SimilarityMetric,
};

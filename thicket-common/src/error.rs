//! Error types for the thicket toolkit
//!
//! Settings problems are fatal and surface before any clustering starts. The two numerical
//! failures are graph-local: the clustering loop recovers from them and keeps going.

use thiserror::Error;

/// Main error type for thicket operations
#[derive(Debug, Error)]
pub enum Error {
    /// A settings value is out of range or inconsistent with another one
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// Power iteration did not satisfy its convergence criterion within the iteration cap
    #[error("Power iteration did not converge within {max_iterations} iterations")]
    MaxIterationsExceeded { max_iterations: usize },

    /// Neither sign class had any converged vertex to classify the rest against
    #[error("Partial convergence postprocessing failed: {0}")]
    PartialConvergencePostprocessing(String),

    /// Invalid graph construction input
    #[error("Invalid graph: {0}")]
    InvalidGraph(String),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file could not be parsed
    #[error("Malformed settings file: {0}")]
    SettingsFormat(#[from] toml::de::Error),
}

impl Error {
    /// Whether the clustering loop may fall back to the remainder dump for this error
    pub fn is_graph_local(&self) -> bool {
        matches!(
            self,
            Error::MaxIterationsExceeded { .. } | Error::PartialConvergencePostprocessing(_)
        )
    }
}

/// Convenience result type for thicket operations
pub type Result<T> = std::result::Result<T, Error>;

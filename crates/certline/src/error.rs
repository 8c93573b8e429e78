//! # Pipeline Error Types

use certline_catalog::CatalogError;
use certline_core::SyncError;
use thiserror::Error;

/// Errors that end a pipeline run.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The producer hit a broken generation rule. Never retried.
    #[error("fatal configuration violation: {0}")]
    Catalog(#[from] CatalogError),

    /// The synchronization core reported something other than a stop.
    #[error("buffer failure: {0}")]
    Sync(#[from] SyncError),

    /// The configuration file could not be read or parsed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A worker thread could not be started.
    #[error("failed to spawn {task} thread: {source}")]
    Spawn {
        /// Which task failed to start.
        task: &'static str,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// A worker thread panicked.
    #[error("{0} thread panicked")]
    TaskPanicked(&'static str),
}

impl PipelineError {
    /// Returns true for the errors that must terminate the process with a
    /// non-zero exit code and a diagnostic.
    #[must_use]
    pub fn is_fatal_violation(&self) -> bool {
        matches!(self, Self::Catalog(_))
    }
}

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Directory {0} does not exist")]
    RootNotFound(PathBuf),
}

/// Per-recipe extraction failure; the package is skipped, the run continues
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Failed to run extractor: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("Extractor exited with {code:?}: {stderr}")]
    Failed { code: Option<i32>, stderr: String },

    #[error("Extractor timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Extractor output has no {0}")]
    MissingField(&'static str),
}

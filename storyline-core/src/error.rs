//! Error types for storyline-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{AssetId, RecordId};

/// A required configuration field was absent. Fatal: surfaced before any
/// network call.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required configuration field '{field}'")]
    Missing { field: &'static str },
}

/// All errors that can arise from content store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying I/O failure, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML serialization error (write/save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load — includes file path and line context.
    #[error("failed to parse store file at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("record not found: {id}")]
    RecordNotFound { id: RecordId },

    #[error("asset not found: {id}")]
    AssetNotFound { id: AssetId },
}

/// Convenience constructor for [`StoreError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.into(),
        source,
    }
}

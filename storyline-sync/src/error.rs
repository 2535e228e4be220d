//! Error types for storyline-sync.
//!
//! Only run-aborting conditions live here: missing configuration, a failed
//! board-list fetch, or an index-build failure. Per-story failures are
//! isolated inside the engine and reported, not raised.

use thiserror::Error;

use storyline_api::ApiError;
use storyline_core::{ConfigError, StoreError};

/// All errors that abort a sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A required configuration field was missing; surfaced before any
    /// network call.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The board-list fetch failed after retries.
    #[error("board API error: {0}")]
    Api(#[from] ApiError),

    /// The local index could not be built.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

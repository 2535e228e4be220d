//! Storyline core library — domain types, store contract, local store.
//!
//! Public API surface:
//! - [`types`] — newtypes and remote/local domain structs
//! - [`config`] — [`SyncConfig`], threaded explicitly through every operation
//! - [`error`] — [`StoreError`] and [`ConfigError`]
//! - [`store`] — the [`ContentStore`] contract the sync engine runs against
//! - [`local`] — [`LocalStore`], a YAML-file-backed implementation

pub mod config;
pub mod error;
pub mod local;
pub mod store;
pub mod types;

pub use config::SyncConfig;
pub use error::{ConfigError, StoreError};
pub use local::LocalStore;
pub use store::{ContentStore, NewRecord, RecordUpdate};
pub use types::{
    AssetId, Category, LocalAsset, LocalRecord, RecordId, RecordStatus, RemoteAttachment,
    RemoteStory, StoryId, StoryStub,
};

//! # storyline-sync
//!
//! One-way reconciliation of a remote story board against a local content
//! store. Remote is authoritative; local is derived.
//!
//! Call [`run_sync`] with a validated config, an API client, and a store.
//! One run makes a complete pass over the remote set: it fetches the board
//! listing once, builds a story-id index of local records in a single scan,
//! classifies every remote story as create/update/skip, trashes orphans,
//! applies staged creations, and returns a [`SyncReport`].

pub mod attach;
pub mod category;
pub mod engine;
pub mod error;
pub mod index;
pub mod policy;
pub mod report;

pub use engine::run_sync;
pub use error::SyncError;
pub use policy::UpdateTrigger;
pub use report::{RecordAction, SyncReport};

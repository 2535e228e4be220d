//! The content store contract.
//!
//! The sync engine is generic over [`ContentStore`] — the hosting store
//! (whatever persists records, binary assets, and categories) implements
//! this trait; the engine never touches storage primitives directly.
//! [`crate::local::LocalStore`] is the file-backed implementation shipped
//! with this workspace.

use crate::error::StoreError;
use crate::types::{AssetId, Category, LocalAsset, LocalRecord, RecordId, StoryId};

/// Fields the engine supplies when creating a record. The store assigns the
/// identifier and the initial `last_modified` timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub title: String,
    pub content: String,
    pub story_id: StoryId,
    pub category: String,
}

/// In-place update of an existing record. The store bumps `last_modified`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordUpdate {
    pub id: RecordId,
    pub title: String,
    pub content: String,
    pub category: String,
}

/// Operations the reconciliation engine requires from the hosting store.
pub trait ContentStore {
    /// Every record carrying a story link, regardless of status (trashed
    /// records still exist and must not be recreated or double-deleted).
    /// One full scan; the engine calls this exactly once per run.
    fn linked_records(&self) -> Result<Vec<LocalRecord>, StoreError>;

    fn record(&self, id: &RecordId) -> Result<LocalRecord, StoreError>;

    /// Insert a new record; the store assigns the id.
    fn insert_record(&self, draft: NewRecord) -> Result<LocalRecord, StoreError>;

    fn update_record(&self, update: RecordUpdate) -> Result<(), StoreError>;

    /// Soft delete: the record stays retrievable and keeps its story link.
    fn trash_record(&self, id: &RecordId) -> Result<(), StoreError>;

    /// Dedup lookup by content hash.
    fn find_asset(&self, content_hash: &str) -> Result<Option<LocalAsset>, StoreError>;

    fn store_asset(
        &self,
        filename: &str,
        content_hash: &str,
        bytes: &[u8],
    ) -> Result<LocalAsset, StoreError>;

    fn delete_asset(&self, id: &AssetId) -> Result<(), StoreError>;

    /// Number of records (any status) referencing the asset as thumbnail.
    fn asset_reference_count(&self, id: &AssetId) -> Result<usize, StoreError>;

    /// `None` clears the association; `Some` swaps the thumbnail in place.
    fn set_thumbnail(
        &self,
        record: &RecordId,
        asset: Option<&AssetId>,
    ) -> Result<(), StoreError>;

    fn category_by_slug(&self, slug: &str) -> Result<Option<Category>, StoreError>;

    /// Idempotent: returns the existing category if the slug is taken.
    fn create_category(&self, slug: &str, name: &str) -> Result<Category, StoreError>;

    /// Whether the acting identity may delete records. Orphan cleanup
    /// degrades to a no-op (with logging) when this is false.
    fn delete_permitted(&self) -> bool;
}

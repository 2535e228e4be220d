//! Local record index.
//!
//! One full scan of story-linked records into a map keyed by remote story
//! id, so reconciliation costs O(1) per remote story instead of a nested
//! scan. Built once before the walk begins and never rebuilt mid-run;
//! matched entries are removed during reconciliation and the remainder are
//! the orphans.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use storyline_core::{ContentStore, LocalRecord, StoreError, StoryId};

/// Ephemeral per-run mapping from remote story id to the local record that
/// mirrors it. Discarded at run end.
pub type SyncIndex = HashMap<StoryId, LocalRecord>;

/// Scan the store once and index every record carrying a story link,
/// regardless of status — trashed records still exist and must not be
/// recreated or double-deleted.
///
/// Duplicate story links are a data-quality condition: the first record
/// seen keeps the slot, later ones are logged and left untouched.
pub fn build_index(store: &impl ContentStore) -> Result<SyncIndex, StoreError> {
    let records = store.linked_records()?;
    let scanned = records.len();

    let mut index = SyncIndex::with_capacity(scanned);
    for record in records {
        match index.entry(record.story_id.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
            Entry::Occupied(existing) => {
                tracing::warn!(
                    "records {} and {} both link story {}; keeping the first",
                    existing.get().id,
                    record.id,
                    record.story_id
                );
            }
        }
    }

    tracing::debug!("indexed {} record(s) from {scanned} scanned", index.len());
    Ok(index)
}

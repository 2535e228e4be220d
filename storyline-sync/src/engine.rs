//! Reconciliation engine.
//!
//! One pass over the remote set, serially in board-list order:
//!
//! 1. Validate config (fatal before any network call).
//! 2. Fetch the board's story stubs once (failure aborts the run).
//! 3. Build the local index in a single scan.
//! 4. Walk the stubs: matched records are updated or skipped per the update
//!    policy; unmatched stories are staged for creation. Matched entries
//!    leave the index as they are seen.
//! 5. Entries still in the index are orphans — trashed if permitted.
//! 6. Staged creations are applied.
//!
//! Per-story failures (detail fetch, attachment, single store write) are
//! logged and counted, never raised; only the board-list fetch, the index
//! scan, and missing configuration abort the run.

use storyline_api::{ApiClient, ApiError};
use storyline_core::{
    AssetId, ContentStore, LocalRecord, NewRecord, RecordStatus, RecordUpdate, StoreError,
    StoryStub, SyncConfig,
};
use storyline_render::render_markdown;

use crate::error::SyncError;
use crate::report::{RecordAction, SyncReport};
use crate::{attach, category, index, policy};

/// A creation decided during the walk, applied in the creation phase.
#[derive(Debug)]
struct StagedCreation {
    draft: NewRecord,
    thumbnail: Option<AssetId>,
}

/// A failure scoped to one story. Logged and reported; never aborts the run.
#[derive(Debug, thiserror::Error)]
enum ItemError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Run one complete sync pass. Remote is authoritative.
///
/// With `dry_run` set, every story is classified exactly as in a real run
/// but nothing is written: no records, no assets, no categories.
pub fn run_sync(
    config: &SyncConfig,
    client: &ApiClient,
    store: &impl ContentStore,
    dry_run: bool,
) -> Result<SyncReport, SyncError> {
    config.validate()?;

    tracing::info!("starting sync for board '{}'", config.board_name);
    let stubs = client.board_stories()?;
    tracing::info!("{} stories on board '{}'", stubs.len(), config.board_name);

    let mut index = index::build_index(store)?;
    let mut report = SyncReport::new(dry_run);
    let mut staged: Vec<StagedCreation> = Vec::new();

    for stub in &stubs {
        if stub.id.is_empty() {
            tracing::warn!("skipping board entry with empty story id");
            continue;
        }
        report.seen += 1;

        let outcome = match index.remove(&stub.id) {
            Some(record) => sync_matched(client, store, stub, record, dry_run),
            None if dry_run => Ok(Some(RecordAction::WouldCreate {
                story: stub.id.clone(),
            })),
            None => stage_creation(client, store, stub).map(|creation| {
                staged.push(creation);
                None
            }),
        };

        match outcome {
            Ok(Some(action)) => report.push(action),
            Ok(None) => {} // staged; reported during the creation phase
            Err(err) => {
                tracing::warn!("story {} failed: {err}", stub.id);
                report.push(RecordAction::Failed {
                    story: stub.id.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }

    cleanup_orphans(store, index, &mut report, dry_run);
    apply_creations(store, staged, &mut report);

    tracing::info!("{report}");
    Ok(report)
}

/// Reconcile a story that already has a local record.
fn sync_matched(
    client: &ApiClient,
    store: &impl ContentStore,
    stub: &StoryStub,
    record: LocalRecord,
    dry_run: bool,
) -> Result<Option<RecordAction>, ItemError> {
    let story = client.story(&stub.id)?;
    let attachment = attach::select_attachment(&story);

    let Some(trigger) = policy::update_required(&story, attachment, &record) else {
        tracing::debug!("story {} unchanged; skipping record {}", story.id, record.id);
        return Ok(Some(RecordAction::Skipped {
            record: record.id,
            story: story.id,
        }));
    };

    tracing::info!(
        "updating record {} for story {} ({trigger})",
        record.id,
        story.id
    );
    if dry_run {
        return Ok(Some(RecordAction::WouldUpdate {
            record: record.id,
            story: story.id,
            trigger,
        }));
    }

    let thumbnail = attachment.and_then(|a| attach::resolve_and_store(client, store, a));
    let content = render_markdown(&story.specification);
    let category = category::resolve_category(store, story.card_kind.as_deref())?;

    store.update_record(RecordUpdate {
        id: record.id.clone(),
        title: story.title.clone(),
        content,
        category: category.slug,
    })?;
    attach::apply_thumbnail(store, &record.id, thumbnail.as_ref())?;

    Ok(Some(RecordAction::Updated {
        record: record.id,
        story: story.id,
        trigger,
    }))
}

/// Fetch and prepare a story that has no local record yet. The insert
/// itself is deferred to the creation phase.
fn stage_creation(
    client: &ApiClient,
    store: &impl ContentStore,
    stub: &StoryStub,
) -> Result<StagedCreation, ItemError> {
    let story = client.story(&stub.id)?;
    let thumbnail = attach::select_attachment(&story)
        .and_then(|a| attach::resolve_and_store(client, store, a));
    let content = render_markdown(&story.specification);
    let category = category::resolve_category(store, story.card_kind.as_deref())?;

    tracing::debug!("staged creation for story {}", story.id);
    Ok(StagedCreation {
        draft: NewRecord {
            title: story.title,
            content,
            story_id: story.id,
            category: category.slug,
        },
        thumbnail,
    })
}

/// Trash records whose story no longer appears on the board.
fn cleanup_orphans(
    store: &impl ContentStore,
    index: index::SyncIndex,
    report: &mut SyncReport,
    dry_run: bool,
) {
    // Already-trashed orphans were handled on an earlier pass; deleting them
    // again would double-count.
    let mut orphans: Vec<_> = index
        .into_iter()
        .filter(|(_, record)| {
            if record.status == RecordStatus::Trashed {
                tracing::debug!("record {} already trashed; leaving as is", record.id);
                false
            } else {
                true
            }
        })
        .collect();
    if orphans.is_empty() {
        return;
    }
    orphans.sort_by(|a, b| a.0 .0.cmp(&b.0 .0));

    if !store.delete_permitted() {
        tracing::warn!(
            "leaving {} orphaned record(s) in place: delete not permitted",
            orphans.len()
        );
        for (story_id, record) in orphans {
            report.push(RecordAction::DeleteSkipped {
                record: record.id,
                story: story_id,
            });
        }
        return;
    }

    for (story_id, record) in orphans {
        tracing::info!(
            "story {story_id} no longer on the board; trashing record {}",
            record.id
        );
        if dry_run {
            report.push(RecordAction::WouldDelete {
                record: record.id,
                story: story_id,
            });
            continue;
        }
        match trash_orphan(store, &record) {
            Ok(()) => report.push(RecordAction::Deleted {
                record: record.id,
                story: story_id,
            }),
            Err(err) => {
                tracing::warn!("failed to trash record {}: {err}", record.id);
                report.push(RecordAction::Failed {
                    story: story_id,
                    reason: err.to_string(),
                });
            }
        }
    }
}

/// Trash the record, release its thumbnail reference, and delete the asset
/// only once nothing else references it. Shared assets always survive.
fn trash_orphan(store: &impl ContentStore, record: &LocalRecord) -> Result<(), StoreError> {
    store.trash_record(&record.id)?;
    if let Some(asset) = &record.thumbnail {
        store.set_thumbnail(&record.id, None)?;
        if store.asset_reference_count(asset)? == 0 {
            tracing::debug!("asset {asset} has no remaining references; deleting");
            store.delete_asset(asset)?;
        }
    }
    Ok(())
}

/// Apply staged creations in board order. A rejected insert is logged and
/// skipped; the remaining creations proceed.
fn apply_creations(
    store: &impl ContentStore,
    staged: Vec<StagedCreation>,
    report: &mut SyncReport,
) {
    for creation in staged {
        let story_id = creation.draft.story_id.clone();
        let record = match store.insert_record(creation.draft) {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!("failed to create record for story {story_id}: {err}");
                report.push(RecordAction::Failed {
                    story: story_id,
                    reason: err.to_string(),
                });
                continue;
            }
        };
        if let Some(asset) = &creation.thumbnail {
            if let Err(err) = attach::apply_thumbnail(store, &record.id, Some(asset)) {
                tracing::warn!("failed to set thumbnail on record {}: {err}", record.id);
            }
        }
        tracing::info!("created record {} for story {story_id}", record.id);
        report.push(RecordAction::Created {
            record: record.id,
            story: story_id,
        });
    }
}

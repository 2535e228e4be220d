//! Run report and summary.

use std::fmt;

use serde::Serialize;

use storyline_core::{RecordId, StoryId};

use crate::policy::UpdateTrigger;

/// Outcome for a single record touched (or deliberately left alone) during
/// a pass. `Would*` variants are the dry-run counterparts: classification
/// without mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RecordAction {
    Created {
        record: RecordId,
        story: StoryId,
    },
    WouldCreate {
        story: StoryId,
    },
    Updated {
        record: RecordId,
        story: StoryId,
        trigger: UpdateTrigger,
    },
    WouldUpdate {
        record: RecordId,
        story: StoryId,
        trigger: UpdateTrigger,
    },
    Skipped {
        record: RecordId,
        story: StoryId,
    },
    Deleted {
        record: RecordId,
        story: StoryId,
    },
    WouldDelete {
        record: RecordId,
        story: StoryId,
    },
    /// Orphan left in place because the actor lacks delete capability.
    DeleteSkipped {
        record: RecordId,
        story: StoryId,
    },
    /// Per-story failure, isolated from the rest of the run.
    Failed {
        story: StoryId,
        reason: String,
    },
}

/// Aggregated outcome of one sync pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SyncReport {
    pub dry_run: bool,
    /// Remote stories observed on the board this pass.
    pub seen: usize,
    pub actions: Vec<RecordAction>,
}

impl SyncReport {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            seen: 0,
            actions: Vec::new(),
        }
    }

    pub fn push(&mut self, action: RecordAction) {
        self.actions.push(action);
    }

    pub fn created(&self) -> usize {
        self.count(|a| {
            matches!(
                a,
                RecordAction::Created { .. } | RecordAction::WouldCreate { .. }
            )
        })
    }

    pub fn updated(&self) -> usize {
        self.count(|a| {
            matches!(
                a,
                RecordAction::Updated { .. } | RecordAction::WouldUpdate { .. }
            )
        })
    }

    pub fn deleted(&self) -> usize {
        self.count(|a| {
            matches!(
                a,
                RecordAction::Deleted { .. } | RecordAction::WouldDelete { .. }
            )
        })
    }

    pub fn skipped(&self) -> usize {
        self.count(|a| matches!(a, RecordAction::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|a| matches!(a, RecordAction::Failed { .. }))
    }

    pub fn delete_skipped(&self) -> usize {
        self.count(|a| matches!(a, RecordAction::DeleteSkipped { .. }))
    }

    fn count(&self, predicate: impl Fn(&RecordAction) -> bool) -> usize {
        self.actions.iter().filter(|a| predicate(a)).count()
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.dry_run {
            write!(f, "[dry-run] ")?;
        }
        write!(
            f,
            "sync finished: {} stories seen, {} updated, {} created, {} deleted",
            self.seen,
            self.updated(),
            self.created(),
            self.deleted()
        )?;
        if self.failed() > 0 {
            write!(f, ", {} failed", self.failed())?;
        }
        if self.delete_skipped() > 0 {
            write!(f, ", {} orphan(s) left in place", self.delete_skipped())?;
        }
        Ok(())
    }
}

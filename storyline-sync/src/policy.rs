//! Update decision policy.
//!
//! Trigger precedence:
//! 1. `RemoteNewer` (story updated after the record's last modification)
//! 2. `AttachmentRemoved` (remote has none, record has a thumbnail)
//! 3. `AttachmentAdded` (remote has one, record has no thumbnail)
//! 4. `AttachmentNewer` (attachment created after the record's last
//!    modification)
//!
//! A missing attachment is "no attachment", never an error. Equal
//! timestamps trigger nothing: only strictly newer remote state updates.

use std::fmt;

use serde::Serialize;

use storyline_core::{LocalRecord, RemoteAttachment, RemoteStory};

/// Why a matched record needs an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateTrigger {
    RemoteNewer,
    AttachmentRemoved,
    AttachmentAdded,
    AttachmentNewer,
}

impl fmt::Display for UpdateTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateTrigger::RemoteNewer => write!(f, "story updated remotely"),
            UpdateTrigger::AttachmentRemoved => write!(f, "attachment removed"),
            UpdateTrigger::AttachmentAdded => write!(f, "attachment added"),
            UpdateTrigger::AttachmentNewer => write!(f, "attachment replaced"),
        }
    }
}

/// First matching trigger, or `None` when the record can be skipped.
pub fn update_required(
    story: &RemoteStory,
    attachment: Option<&RemoteAttachment>,
    record: &LocalRecord,
) -> Option<UpdateTrigger> {
    if story.updated_at > record.last_modified {
        return Some(UpdateTrigger::RemoteNewer);
    }

    match attachment {
        None if record.thumbnail.is_some() => Some(UpdateTrigger::AttachmentRemoved),
        None => None,
        Some(_) if record.thumbnail.is_none() => Some(UpdateTrigger::AttachmentAdded),
        Some(att) if att.created_at > record.last_modified => {
            Some(UpdateTrigger::AttachmentNewer)
        }
        Some(_) => None,
    }
}

//! Domain types for Storyline.
//!
//! Remote types mirror the board API's JSON payloads (camelCase field names,
//! `card-kind` for the category tag). Local types are what the content store
//! persists. All timestamps are `chrono::DateTime<Utc>` and all types are
//! serializable via serde.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A story's identifier on the remote board. Unique within a board.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct StoryId(pub String);

impl StoryId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for StoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for StoryId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for StoryId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A local record's identifier, assigned by the content store on insert.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub String);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A local asset's identifier, assigned by the content store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssetId(pub String);

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for AssetId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AssetId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Remote types (board API payloads)
// ---------------------------------------------------------------------------

/// Board-level story listing entry: identifier plus minimal fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryStub {
    /// May be empty in malformed board payloads; such stubs are skipped.
    #[serde(default)]
    pub id: StoryId,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A full story as returned by the detail endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteStory {
    pub id: StoryId,
    #[serde(default)]
    pub title: String,
    /// Markdown body. Rendered through the safe-mode renderer before storage.
    #[serde(default)]
    pub specification: String,
    pub updated_at: DateTime<Utc>,
    #[serde(default, rename = "card-kind")]
    pub card_kind: Option<String>,
    #[serde(default)]
    pub attachments: Vec<RemoteAttachment>,
}

/// One attachment entry on a story, in board order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteAttachment {
    /// Relative to the board's base URL.
    pub url: String,
    pub filename: String,
    pub size_in_bytes: u64,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Local types (content store)
// ---------------------------------------------------------------------------

/// Lifecycle status of a local record. Trashed records still exist: they are
/// indexed during sync and must not be recreated or double-deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    #[default]
    Published,
    Trashed,
}

/// A locally stored derivative of a remote story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalRecord {
    pub id: RecordId,
    pub title: String,
    /// Sanitized HTML.
    pub content: String,
    pub last_modified: DateTime<Utc>,
    /// Link back to the remote story this record mirrors.
    pub story_id: StoryId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<AssetId>,
    pub category: String,
    #[serde(default)]
    pub status: RecordStatus,
}

/// Metadata for a stored binary asset. The `content_hash` (filename + size)
/// is the dedup key: identical attachments are stored at most once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalAsset {
    pub id: AssetId,
    pub filename: String,
    pub content_hash: String,
    pub created_at: DateTime<Utc>,
}

/// A content category. Records carry the slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub slug: String,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newtype_display() {
        assert_eq!(StoryId::from("42").to_string(), "42");
        assert_eq!(RecordId::from("r-1").to_string(), "r-1");
        assert_eq!(AssetId::from("a-1").to_string(), "a-1");
    }

    #[test]
    fn story_stub_tolerates_missing_id() {
        let stub: StoryStub = serde_json::from_str(r#"{"updatedAt":"2024-01-01T00:00:00Z"}"#)
            .expect("deserialize");
        assert!(stub.id.is_empty());
    }

    #[test]
    fn remote_story_uses_api_field_names() {
        let json = r##"{
            "id": "42",
            "title": "A story",
            "specification": "# Heading",
            "updatedAt": "2024-01-01T00:00:00Z",
            "card-kind": "blog",
            "attachments": [{
                "url": "/attachments/cover.png",
                "filename": "cover.png",
                "sizeInBytes": 2048,
                "createdAt": "2024-01-01T00:00:00Z"
            }]
        }"##;
        let story: RemoteStory = serde_json::from_str(json).expect("deserialize");
        assert_eq!(story.id, StoryId::from("42"));
        assert_eq!(story.card_kind.as_deref(), Some("blog"));
        assert_eq!(story.attachments.len(), 1);
        assert_eq!(story.attachments[0].size_in_bytes, 2048);
    }

    #[test]
    fn remote_story_defaults_optional_fields() {
        let json = r#"{"id": "7", "updatedAt": "2024-01-01T00:00:00Z"}"#;
        let story: RemoteStory = serde_json::from_str(json).expect("deserialize");
        assert_eq!(story.title, "");
        assert_eq!(story.specification, "");
        assert!(story.card_kind.is_none());
        assert!(story.attachments.is_empty());
    }

    #[test]
    fn record_status_defaults_to_published() {
        let yaml = r#"
id: r-1
title: t
content: ""
last_modified: 2024-01-01T00:00:00Z
story_id: "42"
category: blog
"#;
        let record: LocalRecord = serde_yaml::from_str(yaml).expect("deserialize");
        assert_eq!(record.status, RecordStatus::Published);
        assert!(record.thumbnail.is_none());
    }
}

//! Attachment selection, dedup, and thumbnail lifecycle.
//!
//! A story's first image attachment (in board order) becomes the record's
//! thumbnail. Binary content is deduplicated by a hash of filename + size,
//! so identical attachments across stories and runs are fetched and stored
//! at most once. Any failure along the way is non-fatal: the record simply
//! proceeds without a thumbnail.

use sha2::{Digest, Sha256};

use storyline_api::ApiClient;
use storyline_core::{
    AssetId, ContentStore, RecordId, RemoteAttachment, RemoteStory, StoreError,
};

/// File extensions accepted as thumbnail material.
const IMAGE_EXTENSIONS: &[&str] = &["jpeg", "jpg", "jpe", "png", "gif", "webp"];

/// First attachment whose URL carries an allow-listed image extension.
/// Order matters: the board's ordering decides, not any quality metric.
pub fn select_attachment(story: &RemoteStory) -> Option<&RemoteAttachment> {
    story.attachments.iter().find(|attachment| {
        url_extension(&attachment.url)
            .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
    })
}

fn url_extension(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let (_, ext) = path.rsplit_once('.')?;
    if ext.is_empty() || ext.contains('/') {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Dedup fingerprint: SHA-256 over filename + decimal size. Identical
/// filename+size pairs map to the same stored asset regardless of URL.
pub fn content_hash(filename: &str, size_in_bytes: u64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(filename.as_bytes());
    hasher.update(size_in_bytes.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

/// Resolve an attachment to a stored asset reference.
///
/// Dedup short-circuit first: if an asset with the same content hash already
/// exists, return it without any network fetch. Otherwise fetch the binary
/// and store it with the hash recorded. Every failure is logged and mapped
/// to `None` — an attachment problem never sinks the record.
pub fn resolve_and_store(
    client: &ApiClient,
    store: &impl ContentStore,
    attachment: &RemoteAttachment,
) -> Option<AssetId> {
    let hash = content_hash(&attachment.filename, attachment.size_in_bytes);

    match store.find_asset(&hash) {
        Ok(Some(existing)) => {
            tracing::debug!(
                "attachment '{}' already stored as asset {}",
                attachment.filename,
                existing.id
            );
            return Some(existing.id);
        }
        Ok(None) => {}
        Err(err) => {
            tracing::warn!("asset lookup failed for '{}': {err}", attachment.filename);
            return None;
        }
    }

    let bytes = match client.attachment_bytes(attachment) {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(
                "attachment fetch failed for '{}': {err}",
                attachment.filename
            );
            return None;
        }
    };

    match store.store_asset(&attachment.filename, &hash, &bytes) {
        Ok(asset) => {
            tracing::info!("stored attachment '{}' as asset {}", attachment.filename, asset.id);
            Some(asset.id)
        }
        Err(err) => {
            tracing::warn!(
                "attachment store failed for '{}': {err}",
                attachment.filename
            );
            None
        }
    }
}

/// Swap the record's thumbnail: `None` clears any existing association,
/// `Some` replaces whatever was there.
pub fn apply_thumbnail(
    store: &impl ContentStore,
    record: &RecordId,
    asset: Option<&AssetId>,
) -> Result<(), StoreError> {
    store.set_thumbnail(record, asset)
}

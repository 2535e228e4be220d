//! File-backed content store.
//!
//! # Storage layout
//!
//! ```text
//! <root>/
//!   records/
//!     <record_id>.yaml     (one file per record — mode 0600)
//!   assets/
//!     <asset_id>           (binary content)
//!     <asset_id>.yaml      (metadata sidecar — mode 0600)
//!   categories.yaml
//! ```
//!
//! Every write goes to a `.tmp` sibling first and is renamed into place.
//! The `.tmp` is always in the same directory as the target (same
//! filesystem — no EXDEV on macOS). Record ids are UUID v4 strings assigned
//! on insert. Soft delete flips `status: trashed` in place.

use std::path::{Path, PathBuf};

use chrono::Utc;
use uuid::Uuid;

use crate::error::{io_err, StoreError};
use crate::store::{ContentStore, NewRecord, RecordUpdate};
use crate::types::{AssetId, Category, LocalAsset, LocalRecord, RecordId, RecordStatus};

/// Content store rooted at an explicit directory.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
    delete_permitted: bool,
}

impl LocalStore {
    /// Open (creating directories as needed) a store with full capabilities.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Self::open_with_capabilities(root, true)
    }

    /// Open a store whose acting identity lacks delete capability; orphan
    /// cleanup will be skipped against it.
    pub fn without_delete(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Self::open_with_capabilities(root, false)
    }

    fn open_with_capabilities(
        root: impl Into<PathBuf>,
        delete_permitted: bool,
    ) -> Result<Self, StoreError> {
        let root = root.into();
        for dir in [root.clone(), root.join("records"), root.join("assets")] {
            if !dir.exists() {
                std::fs::create_dir_all(&dir).map_err(|e| io_err(&dir, e))?;
                set_dir_permissions(&dir)?;
            }
        }
        Ok(Self {
            root,
            delete_permitted,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, id: &RecordId) -> PathBuf {
        self.root.join("records").join(format!("{}.yaml", id.0))
    }

    fn asset_data_path(&self, id: &AssetId) -> PathBuf {
        self.root.join("assets").join(&id.0)
    }

    fn asset_meta_path(&self, id: &AssetId) -> PathBuf {
        self.root.join("assets").join(format!("{}.yaml", id.0))
    }

    fn categories_path(&self) -> PathBuf {
        self.root.join("categories.yaml")
    }

    fn load_record(&self, path: &Path) -> Result<LocalRecord, StoreError> {
        let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
        serde_yaml::from_str(&contents).map_err(|e| StoreError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    fn save_record(&self, record: &LocalRecord) -> Result<(), StoreError> {
        let path = self.record_path(&record.id);
        write_yaml_atomic(&path, record)
    }

    fn load_categories(&self) -> Result<Vec<Category>, StoreError> {
        let path = self.categories_path();
        if !path.exists() {
            return Ok(vec![]);
        }
        let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        serde_yaml::from_str(&contents).map_err(|e| StoreError::Parse { path, source: e })
    }

    fn save_categories(&self, categories: &[Category]) -> Result<(), StoreError> {
        write_yaml_atomic(&self.categories_path(), &categories)
    }

    /// All stored asset metadata, sorted by id for deterministic scans.
    fn assets(&self) -> Result<Vec<LocalAsset>, StoreError> {
        let dir = self.root.join("assets");
        let mut entries: Vec<_> = std::fs::read_dir(&dir)
            .map_err(|e| io_err(&dir, e))?
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".yaml"))
            .collect();
        entries.sort_by_key(|e| e.file_name());

        let mut assets = Vec::new();
        for entry in entries {
            let path = entry.path();
            let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
            let asset: LocalAsset =
                serde_yaml::from_str(&contents).map_err(|e| StoreError::Parse { path, source: e })?;
            assets.push(asset);
        }
        Ok(assets)
    }
}

impl ContentStore for LocalStore {
    fn linked_records(&self) -> Result<Vec<LocalRecord>, StoreError> {
        let dir = self.root.join("records");
        let mut entries: Vec<_> = std::fs::read_dir(&dir)
            .map_err(|e| io_err(&dir, e))?
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".yaml"))
            .collect();
        entries.sort_by_key(|e| e.file_name());

        let mut records = Vec::new();
        for entry in entries {
            let record = self.load_record(&entry.path())?;
            if !record.story_id.is_empty() {
                records.push(record);
            }
        }
        Ok(records)
    }

    fn record(&self, id: &RecordId) -> Result<LocalRecord, StoreError> {
        let path = self.record_path(id);
        if !path.exists() {
            return Err(StoreError::RecordNotFound { id: id.clone() });
        }
        self.load_record(&path)
    }

    fn insert_record(&self, draft: NewRecord) -> Result<LocalRecord, StoreError> {
        let record = LocalRecord {
            id: RecordId(Uuid::new_v4().to_string()),
            title: draft.title,
            content: draft.content,
            last_modified: Utc::now(),
            story_id: draft.story_id,
            thumbnail: None,
            category: draft.category,
            status: RecordStatus::Published,
        };
        self.save_record(&record)?;
        Ok(record)
    }

    fn update_record(&self, update: RecordUpdate) -> Result<(), StoreError> {
        let mut record = self.record(&update.id)?;
        record.title = update.title;
        record.content = update.content;
        record.category = update.category;
        record.last_modified = Utc::now();
        self.save_record(&record)
    }

    fn trash_record(&self, id: &RecordId) -> Result<(), StoreError> {
        let mut record = self.record(id)?;
        record.status = RecordStatus::Trashed;
        self.save_record(&record)
    }

    fn find_asset(&self, content_hash: &str) -> Result<Option<LocalAsset>, StoreError> {
        Ok(self
            .assets()?
            .into_iter()
            .find(|a| a.content_hash == content_hash))
    }

    fn store_asset(
        &self,
        filename: &str,
        content_hash: &str,
        bytes: &[u8],
    ) -> Result<LocalAsset, StoreError> {
        let asset = LocalAsset {
            id: AssetId(Uuid::new_v4().to_string()),
            filename: filename.to_owned(),
            content_hash: content_hash.to_owned(),
            created_at: Utc::now(),
        };
        let data_path = self.asset_data_path(&asset.id);
        write_bytes_atomic(&data_path, bytes)?;
        write_yaml_atomic(&self.asset_meta_path(&asset.id), &asset)?;
        Ok(asset)
    }

    fn delete_asset(&self, id: &AssetId) -> Result<(), StoreError> {
        let meta = self.asset_meta_path(id);
        if !meta.exists() {
            return Err(StoreError::AssetNotFound { id: id.clone() });
        }
        let data = self.asset_data_path(id);
        std::fs::remove_file(&meta).map_err(|e| io_err(&meta, e))?;
        if data.exists() {
            std::fs::remove_file(&data).map_err(|e| io_err(&data, e))?;
        }
        Ok(())
    }

    fn asset_reference_count(&self, id: &AssetId) -> Result<usize, StoreError> {
        Ok(self
            .linked_records()?
            .iter()
            .filter(|r| r.thumbnail.as_ref() == Some(id))
            .count())
    }

    fn set_thumbnail(
        &self,
        record: &RecordId,
        asset: Option<&AssetId>,
    ) -> Result<(), StoreError> {
        let mut record = self.record(record)?;
        record.thumbnail = asset.cloned();
        self.save_record(&record)
    }

    fn category_by_slug(&self, slug: &str) -> Result<Option<Category>, StoreError> {
        Ok(self.load_categories()?.into_iter().find(|c| c.slug == slug))
    }

    fn create_category(&self, slug: &str, name: &str) -> Result<Category, StoreError> {
        let mut categories = self.load_categories()?;
        if let Some(existing) = categories.iter().find(|c| c.slug == slug) {
            return Ok(existing.clone());
        }
        let category = Category {
            slug: slug.to_owned(),
            name: name.to_owned(),
        };
        categories.push(category.clone());
        self.save_categories(&categories)?;
        Ok(category)
    }

    fn delete_permitted(&self) -> bool {
        self.delete_permitted
    }
}

// ---------------------------------------------------------------------------
// Atomic write helpers
// ---------------------------------------------------------------------------

fn write_yaml_atomic<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let yaml = serde_yaml::to_string(value)?;
    write_bytes_atomic(path, yaml.as_bytes())
}

fn write_bytes_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!("{file_name}.tmp"));
    std::fs::write(&tmp, bytes).map_err(|e| io_err(&tmp, e))?;
    set_file_permissions(&tmp)?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
        .map_err(|e| io_err(path, e))
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| io_err(path, e))
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

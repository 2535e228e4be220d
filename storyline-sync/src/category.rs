//! Category resolution.
//!
//! A story's card kind doubles as a category slug. The match must exist
//! locally and its name must be on the fixed allow-list; anything else —
//! missing kind, unknown slug, disallowed name — falls back to the default
//! catch-all, which is auto-created on first use.

use storyline_core::{Category, ContentStore, StoreError};

/// Category names a story may be filed under.
pub const ALLOWED_CATEGORY_NAMES: &[&str] = &["Training", "Blog", "Project", "Creation", "Service"];

pub const DEFAULT_CATEGORY_SLUG: &str = "uncategorized";
pub const DEFAULT_CATEGORY_NAME: &str = "Uncategorized";

/// Map a story's card kind to a local category, falling back to the default.
pub fn resolve_category(
    store: &impl ContentStore,
    card_kind: Option<&str>,
) -> Result<Category, StoreError> {
    let Some(kind) = card_kind.filter(|kind| !kind.is_empty()) else {
        tracing::debug!("story has no card kind; using the default category");
        return default_category(store);
    };

    let Some(category) = store.category_by_slug(kind)? else {
        tracing::debug!("no category matches kind '{kind}'; using the default");
        return default_category(store);
    };

    if !ALLOWED_CATEGORY_NAMES.contains(&category.name.as_str()) {
        tracing::debug!(
            "category '{}' is not on the allow-list; using the default",
            category.name
        );
        return default_category(store);
    }

    Ok(category)
}

fn default_category(store: &impl ContentStore) -> Result<Category, StoreError> {
    if let Some(existing) = store.category_by_slug(DEFAULT_CATEGORY_SLUG)? {
        return Ok(existing);
    }
    store.create_category(DEFAULT_CATEGORY_SLUG, DEFAULT_CATEGORY_NAME)
}

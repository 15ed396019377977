//! Content Store
//!
//! Owns the ordered content records (newest first), their display
//! derivation, and the content side of category synchronization. Category
//! metadata arrives through the shared lookup cache the event bus keeps
//! fresh; stored category ids are never rewritten by a broadcast.

use std::cell::RefCell;
use std::rc::Rc;

use chrono::Utc;
use indexmap::IndexMap;
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{Category, Content, DomainError, DomainResult, FALLBACK_CATEGORY, FALLBACK_COLOR};
use crate::markdown;
use crate::storage::{coerce_date, StorageBackend, CONTENTS_KEY, FORMAT_VERSION};

/// Category metadata cache shared between the store and the event bus
/// subscription that refreshes it.
pub type SharedLookup = Rc<RefCell<IndexMap<String, Category>>>;

/// Name and color used when rendering a content record's category tag.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryLabel {
    pub name: String,
    pub color: String,
}

/// Persisted shape of the store (`portfolio_contents` key).
#[derive(Serialize, Deserialize)]
struct ContentsPayload {
    contents: Vec<Content>,
    #[serde(rename = "nextId")]
    next_id: u32,
    version: String,
}

/// Ordered content records and their id counter.
pub struct ContentStore {
    /// Newest first; this ordering is a hard contract
    contents: Vec<Content>,
    next_id: u32,
    markdown_enabled: bool,
    lookup: SharedLookup,
    storage: Rc<dyn StorageBackend>,
}

impl ContentStore {
    pub fn new(storage: Rc<dyn StorageBackend>, lookup: SharedLookup) -> Self {
        let mut store = Self {
            contents: Vec::new(),
            next_id: 1,
            markdown_enabled: true,
            lookup,
            storage,
        };
        store.reload();
        store
    }

    /// Drop in-memory state and re-read the persisted payload.
    pub fn reload(&mut self) {
        self.contents.clear();
        self.next_id = 1;
        self.load();
    }

    // ========================
    // CRUD
    // ========================

    /// Add a record. Title and body are required; the new record is
    /// prepended so the list stays newest-first.
    pub fn add_content(&mut self, title: &str, category: &str, body: &str) -> DomainResult<Content> {
        let (title, body) = validate_fields(title, body)?;
        let category = self.resolve_category(category);
        let content = Content::new(self.allocate_id(), title, category, body);
        self.contents.insert(0, content.clone());
        self.save();
        Ok(content)
    }

    /// Update a record in place. When `id` does not resolve to an owned
    /// record (it belonged to static example content), the edit becomes an
    /// insert with a freshly allocated id instead of mutating foreign
    /// state.
    pub fn edit_content(
        &mut self,
        id: u32,
        title: &str,
        category: &str,
        body: &str,
    ) -> DomainResult<Content> {
        let (title, body) = validate_fields(title, body)?;
        let category = self.resolve_category(category);

        if let Some(content) = self.contents.iter_mut().find(|c| c.id == id) {
            content.title = title;
            content.category = category;
            content.content = body;
            content.updated_at = Utc::now();
            let updated = content.clone();
            self.save();
            return Ok(updated);
        }

        let content = Content::new(self.allocate_id(), title, category, body);
        self.contents.insert(0, content.clone());
        self.save();
        info!("edit of unknown content {} inserted as {}", id, content.id);
        Ok(content)
    }

    pub fn delete_content(&mut self, id: u32) -> DomainResult<Content> {
        let index = self
            .contents
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("content {}", id)))?;
        let removed = self.contents.remove(index);
        self.save();
        Ok(removed)
    }

    /// Copy a record under a new id with fresh timestamps.
    pub fn duplicate_content(&mut self, id: u32) -> DomainResult<Content> {
        let source = self
            .find_content(id)
            .ok_or_else(|| DomainError::NotFound(format!("content {}", id)))?
            .clone();
        let copy = Content::new(
            self.allocate_id(),
            format!("{} (복사본)", source.title),
            source.category,
            source.content,
        );
        self.contents.insert(0, copy.clone());
        self.save();
        Ok(copy)
    }

    /// Reassign one record to another category.
    pub fn move_to_category(&mut self, id: u32, new_category: &str) -> DomainResult<Content> {
        let new_category = self.resolve_category(new_category);
        let content = self
            .contents
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| DomainError::NotFound(format!("content {}", id)))?;
        content.category = new_category;
        content.updated_at = Utc::now();
        let updated = content.clone();
        self.save();
        Ok(updated)
    }

    /// Move every record in `from` to `to`. Returns how many moved.
    /// Used when a category is deleted to keep the foreign keys resolving.
    pub fn reassign_category(&mut self, from: &str, to: &str) -> usize {
        let mut moved = 0;
        for content in self.contents.iter_mut().filter(|c| c.category == from) {
            content.category = to.to_string();
            content.updated_at = Utc::now();
            moved += 1;
        }
        if moved > 0 {
            self.save();
        }
        moved
    }

    /// Remove everything and reset the id counter.
    pub fn delete_all(&mut self) {
        self.contents.clear();
        self.next_id = 1;
        self.save();
    }

    // ========================
    // Lookup & display
    // ========================

    pub fn find_content(&self, id: u32) -> Option<&Content> {
        self.contents.iter().find(|c| c.id == id)
    }

    /// Category id of a record, for the registry's filter predicate.
    pub fn category_of(&self, id: u32) -> Option<String> {
        self.find_content(id).map(|c| c.category.clone())
    }

    pub fn all_contents(&self) -> &[Content] {
        &self.contents
    }

    pub fn count_in_category(&self, category: &str) -> usize {
        self.contents.iter().filter(|c| c.category == category).count()
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// Render a record's body. Falls back to escaped plain text when the
    /// markdown converter is disabled.
    pub fn render(&self, content: &Content) -> String {
        markdown::render(&content.content, self.markdown_enabled)
    }

    pub fn set_markdown_enabled(&mut self, enabled: bool) {
        self.markdown_enabled = enabled;
    }

    /// Display name and color for a category id: cached metadata first,
    /// then the built-in defaults, then the id itself with the fallback
    /// color.
    pub fn category_label(&self, id: &str) -> CategoryLabel {
        if let Some(category) = self.lookup.borrow().get(id) {
            return CategoryLabel {
                name: category.name.clone(),
                color: category.color.clone(),
            };
        }
        match id {
            "projects" => CategoryLabel { name: "💻 프로젝트".to_string(), color: "#007bff".to_string() },
            "blog" => CategoryLabel { name: "📝 블로그".to_string(), color: "#dc3545".to_string() },
            "study" => CategoryLabel { name: "📖 스터디".to_string(), color: "#ffc107".to_string() },
            other => CategoryLabel { name: other.to_string(), color: FALLBACK_COLOR.to_string() },
        }
    }

    // ========================
    // Import / export
    // ========================

    /// Serialize the full content list as a JSON array document.
    pub fn export_json(&self) -> DomainResult<String> {
        serde_json::to_string_pretty(&self.contents)
            .map_err(|e| DomainError::Storage(format!("export failed: {}", e)))
    }

    /// Replace the full content set from an exported JSON array. Records
    /// get fresh sequential ids and coerced dates. Anything that is not a
    /// JSON array rejects the whole import; no partial merge.
    pub fn import_json(&mut self, json: &str) -> DomainResult<usize> {
        let value: Value = serde_json::from_str(json)
            .map_err(|e| DomainError::InvalidInput(format!("import is not valid JSON: {}", e)))?;
        let Value::Array(items) = value else {
            return Err(DomainError::InvalidInput("import must be a JSON array".to_string()));
        };

        let mut imported = Vec::with_capacity(items.len());
        for item in &items {
            imported.push(Content {
                id: self.allocate_id(),
                title: item.get("title").and_then(Value::as_str).unwrap_or_default().to_string(),
                category: item
                    .get("category")
                    .and_then(Value::as_str)
                    .unwrap_or(FALLBACK_CATEGORY)
                    .to_string(),
                content: item
                    .get("content")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                created_at: coerce_date(item.get("createdAt")),
                updated_at: coerce_date(item.get("updatedAt")),
            });
        }

        let count = imported.len();
        self.contents = imported;
        self.save();
        info!("imported {} content records", count);
        Ok(count)
    }

    // ========================
    // Persistence
    // ========================

    fn allocate_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Unknown category ids fall back to the default once a category set
    /// is known; with an empty cache (standalone store) ids pass through.
    fn resolve_category(&self, category: &str) -> String {
        let cache = self.lookup.borrow();
        if cache.is_empty() || cache.contains_key(category) {
            category.to_string()
        } else {
            FALLBACK_CATEGORY.to_string()
        }
    }

    fn save(&self) {
        let payload = ContentsPayload {
            contents: self.contents.clone(),
            next_id: self.next_id,
            version: FORMAT_VERSION.to_string(),
        };
        let raw = match serde_json::to_string(&payload) {
            Ok(raw) => raw,
            Err(e) => {
                error!("failed to serialize contents: {}", e);
                return;
            }
        };
        if let Err(e) = self.storage.set(CONTENTS_KEY, &raw) {
            error!("failed to persist contents: {}", e);
        }
    }

    fn load(&mut self) {
        let raw = match self.storage.get(CONTENTS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return,
            Err(e) => {
                warn!("contents unreadable, starting empty: {}", e);
                return;
            }
        };
        let value: Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!("contents corrupt, starting empty: {}", e);
                return;
            }
        };

        if value.get("version").and_then(Value::as_str) == Some(FORMAT_VERSION) {
            match serde_json::from_value::<ContentsPayload>(value) {
                Ok(payload) => {
                    self.contents = payload.contents;
                    self.next_id = payload.next_id.max(self.max_id() + 1);
                }
                Err(e) => warn!("contents invalid, starting empty: {}", e),
            }
        } else {
            self.migrate_legacy(&value);
        }
    }

    /// Legacy payloads lack the version tag; dates are coerced, the id
    /// counter is rebuilt, and the result is re-saved in the 2.0 shape.
    fn migrate_legacy(&mut self, value: &Value) {
        let Some(items) = value.get("contents").and_then(Value::as_array) else {
            warn!("legacy contents without a contents array, starting empty");
            return;
        };

        for item in items {
            let Some(id) = item.get("id").and_then(Value::as_u64) else {
                continue;
            };
            self.contents.push(Content {
                id: id as u32,
                title: item.get("title").and_then(Value::as_str).unwrap_or_default().to_string(),
                category: item
                    .get("category")
                    .and_then(Value::as_str)
                    .unwrap_or(FALLBACK_CATEGORY)
                    .to_string(),
                content: item
                    .get("content")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                created_at: coerce_date(item.get("createdAt")),
                updated_at: coerce_date(item.get("updatedAt")),
            });
        }
        self.next_id = value
            .get("nextId")
            .and_then(Value::as_u64)
            .map(|n| n as u32)
            .unwrap_or(0)
            .max(self.max_id() + 1);

        info!("migrated legacy contents");
        self.save();
    }

    fn max_id(&self) -> u32 {
        self.contents.iter().map(|c| c.id).max().unwrap_or(0)
    }
}

fn validate_fields(title: &str, body: &str) -> DomainResult<(String, String)> {
    let title = title.trim();
    let body = body.trim();
    if title.is_empty() || body.is_empty() {
        return Err(DomainError::InvalidInput("title and body are required".to_string()));
    }
    Ok((title.to_string(), body.to_string()))
}

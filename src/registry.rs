//! Category Registry
//!
//! Owns the canonical category set: CRUD, lookup, active-selection state,
//! persistence, and the change broadcast other modules subscribe to.

use std::rc::Rc;

use chrono::Utc;
use indexmap::IndexMap;
use log::{error, info, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{
    default_categories, Category, DomainError, DomainResult, COLOR_PALETTE, FALLBACK_COLOR,
};
use crate::events::{CategoryEvent, EventBus};
use crate::slug;
use crate::storage::{coerce_date, StorageBackend, CATEGORY_SETTINGS_KEY, FORMAT_VERSION};

/// Persisted shape of the registry (`category_settings` key).
#[derive(Serialize, Deserialize)]
struct CategorySettings {
    /// Ordered `[id, record]` pairs
    categories: Vec<(String, Category)>,
    #[serde(rename = "activeCategory")]
    active_category: String,
    version: String,
}

/// A display row the filter predicate runs against. `category` is the
/// explicit attribute when the row was rendered from a live record; rows
/// derived from static markup leave it empty and fall back to id lookup
/// and keyword matching.
#[derive(Debug, Clone)]
pub struct ContentRow {
    pub content_id: u32,
    pub category: Option<String>,
    pub text: String,
}

/// The canonical category set.
pub struct CategoryRegistry {
    categories: IndexMap<String, Category>,
    active: String,
    storage: Rc<dyn StorageBackend>,
    bus: Rc<EventBus>,
}

impl CategoryRegistry {
    /// Seed the default categories, then overlay whatever the storage
    /// backend holds. Does not broadcast; publish a
    /// [`CategoryEvent::Request`] once wiring is complete.
    pub fn new(storage: Rc<dyn StorageBackend>, bus: Rc<EventBus>) -> Self {
        let mut registry = Self {
            categories: IndexMap::new(),
            active: "all".to_string(),
            storage,
            bus,
        };
        registry.reload();
        registry
    }

    /// Reset to defaults and re-read persisted state. Used at startup and
    /// after a whole-application import replaced the stored payload.
    pub fn reload(&mut self) {
        self.categories.clear();
        self.active = "all".to_string();
        for category in default_categories() {
            self.categories.insert(category.id.clone(), category);
        }
        self.load();
    }

    // ========================
    // CRUD
    // ========================

    /// Add a category. The id is derived from the name; the color comes
    /// from the palette (or a random HSL value) when none is given.
    pub fn add_category(&mut self, name: &str, color: Option<&str>) -> DomainResult<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::InvalidInput("category name is required".to_string()));
        }

        let id = slug::unique_id(name, |candidate| self.categories.contains_key(candidate));
        let color = match color.map(str::trim) {
            Some(c) if !c.is_empty() => c.to_string(),
            _ => self.next_color(),
        };
        let category = Category::new(id.clone(), name.to_string(), color, slug::keywords(name));

        self.categories.insert(id, category.clone());
        self.save();
        self.broadcast();
        info!("category added: {}", category.id);
        Ok(category)
    }

    /// Update name, color, and derived keywords of a non-default category.
    pub fn edit_category(&mut self, id: &str, name: &str, color: &str) -> DomainResult<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::InvalidInput("category name is required".to_string()));
        }

        let category = self
            .categories
            .get_mut(id)
            .ok_or_else(|| DomainError::NotFound(format!("category {}", id)))?;
        if category.is_default {
            return Err(DomainError::Conflict("default categories cannot be edited".to_string()));
        }

        category.name = name.to_string();
        category.color = color.to_string();
        category.keywords = slug::keywords(name);
        category.updated_at = Utc::now();
        let updated = category.clone();

        self.save();
        self.broadcast();
        Ok(updated)
    }

    /// Remove a non-default category and return it. Content referencing the
    /// id must be reassigned by the caller; [`crate::app::PortfolioApp`]
    /// orchestrates that. Resets the active selection to `all` when it
    /// pointed at the deleted id. The id is never reused.
    pub fn delete_category(&mut self, id: &str) -> DomainResult<Category> {
        let category = self
            .categories
            .get(id)
            .ok_or_else(|| DomainError::NotFound(format!("category {}", id)))?;
        if category.is_default {
            return Err(DomainError::Conflict("default categories cannot be deleted".to_string()));
        }

        // shift_remove keeps the remaining insertion order intact
        let removed = self
            .categories
            .shift_remove(id)
            .ok_or_else(|| DomainError::NotFound(format!("category {}", id)))?;
        if self.active == id {
            self.active = "all".to_string();
        }

        self.save();
        self.broadcast();
        info!("category deleted: {}", removed.id);
        Ok(removed)
    }

    /// Set the active filter category.
    pub fn select_category(&mut self, id: &str) -> DomainResult<()> {
        if !self.categories.contains_key(id) {
            return Err(DomainError::NotFound(format!("category {}", id)));
        }
        self.active = id.to_string();
        self.save();
        Ok(())
    }

    // ========================
    // Filtering
    // ========================

    /// Whether a display row is visible under the active category.
    ///
    /// Priority: explicit category attribute, then lookup of the live
    /// record via `resolve`, then legacy keyword matching against the
    /// row text. `all` matches everything.
    pub fn should_show(&self, row: &ContentRow, resolve: impl Fn(u32) -> Option<String>) -> bool {
        if self.active == "all" {
            return true;
        }
        if let Some(category) = &row.category {
            return *category == self.active;
        }
        if let Some(category) = resolve(row.content_id) {
            return category == self.active;
        }
        self.keyword_match(&row.text)
    }

    fn keyword_match(&self, text: &str) -> bool {
        let Some(category) = self.categories.get(&self.active) else {
            return false;
        };
        let lower = text.to_lowercase();
        category
            .keywords
            .iter()
            .any(|keyword| lower.contains(&keyword.to_lowercase()))
    }

    // ========================
    // Lookup
    // ========================

    pub fn all_categories(&self) -> Vec<Category> {
        self.categories.values().cloned().collect()
    }

    pub fn category_by_id(&self, id: &str) -> Option<&Category> {
        self.categories.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.categories.contains_key(id)
    }

    pub fn display_name(&self, id: &str) -> String {
        self.categories
            .get(id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn color_of(&self, id: &str) -> String {
        self.categories
            .get(id)
            .map(|c| c.color.clone())
            .unwrap_or_else(|| FALLBACK_COLOR.to_string())
    }

    pub fn active_category(&self) -> &str {
        &self.active
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Re-publish the current category set to all subscribers.
    pub fn broadcast(&self) {
        self.bus.publish(&CategoryEvent::Updated {
            categories: self.all_categories(),
            lookup: self.categories.clone(),
        });
    }

    /// First unused palette entry (random among the unused), else a random
    /// HSL color once the palette is exhausted.
    fn next_color(&self) -> String {
        let used: Vec<&str> = self.categories.values().map(|c| c.color.as_str()).collect();
        let available: Vec<&str> = COLOR_PALETTE
            .iter()
            .copied()
            .filter(|color| !used.contains(color))
            .collect();

        let mut rng = rand::thread_rng();
        if available.is_empty() {
            format!("hsl({}, 70%, 50%)", rng.gen_range(0..360))
        } else {
            available[rng.gen_range(0..available.len())].to_string()
        }
    }

    // ========================
    // Persistence
    // ========================

    fn save(&self) {
        let settings = CategorySettings {
            categories: self
                .categories
                .iter()
                .map(|(id, category)| (id.clone(), category.clone()))
                .collect(),
            active_category: self.active.clone(),
            version: FORMAT_VERSION.to_string(),
        };
        let payload = match serde_json::to_string(&settings) {
            Ok(payload) => payload,
            Err(e) => {
                error!("failed to serialize category settings: {}", e);
                return;
            }
        };
        if let Err(e) = self.storage.set(CATEGORY_SETTINGS_KEY, &payload) {
            // In-memory state stands; storage is last-write-wins anyway
            error!("failed to persist category settings: {}", e);
        }
    }

    fn load(&mut self) {
        let raw = match self.storage.get(CATEGORY_SETTINGS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return,
            Err(e) => {
                warn!("category settings unreadable, keeping defaults: {}", e);
                return;
            }
        };
        let value: Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                warn!("category settings corrupt, keeping defaults: {}", e);
                return;
            }
        };

        if value.get("version").and_then(Value::as_str) == Some(FORMAT_VERSION) {
            match serde_json::from_value::<CategorySettings>(value.clone()) {
                Ok(settings) => {
                    for (id, category) in settings.categories {
                        // Defaults are re-seeded, never trusted from storage
                        if !category.is_default {
                            self.categories.insert(id, category);
                        }
                    }
                }
                Err(e) => {
                    warn!("category settings invalid, keeping defaults: {}", e);
                    return;
                }
            }
        } else {
            self.migrate_legacy(&value);
        }

        if let Some(active) = value.get("activeCategory").and_then(Value::as_str) {
            if self.categories.contains_key(active) {
                self.active = active.to_string();
            }
        }
    }

    /// Legacy (pre-version-tag) payloads stored a flat array of records.
    /// Keywords are re-derived and the result is re-saved in the 2.0 shape.
    fn migrate_legacy(&mut self, value: &Value) {
        let Some(entries) = value.get("categories").and_then(Value::as_array) else {
            warn!("legacy category settings without a categories array, keeping defaults");
            return;
        };

        for entry in entries {
            let Some(id) = entry.get("id").and_then(Value::as_str) else {
                continue;
            };
            let is_default = entry.get("isDefault").and_then(Value::as_bool).unwrap_or(false);
            if id == "all" || is_default || self.categories.contains_key(id) {
                continue;
            }
            let name = entry
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or(id)
                .to_string();
            let color = match entry.get("color").and_then(Value::as_str) {
                Some(color) => color.to_string(),
                None => self.next_color(),
            };
            let category = Category {
                id: id.to_string(),
                name: name.clone(),
                color,
                keywords: slug::keywords(&name),
                is_default: false,
                created_at: coerce_date(entry.get("createdAt")),
                updated_at: coerce_date(entry.get("updatedAt")),
            };
            self.categories.insert(id.to_string(), category);
        }

        info!("migrated legacy category settings");
        self.save();
    }
}

//! Application Context
//!
//! Wires the category registry, content store, event bus, and storage
//! backend together and exposes the operations a frontend calls. The
//! context owns the cross-module rules the individual stores cannot see:
//! deleting a category reassigns its content, a whole-application import
//! reloads both stores, and the cold-start handshake primes the content
//! side's category cache before anything renders.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use log::info;

use crate::backup;
use crate::domain::{Category, Content, DomainResult, FALLBACK_CATEGORY};
use crate::events::{CategoryEvent, EventBus};
use crate::registry::{CategoryRegistry, ContentRow};
use crate::storage::StorageBackend;
use crate::store::{CategoryLabel, ContentStore, SharedLookup};

/// The assembled application: one registry, one content store, one bus.
pub struct PortfolioApp {
    bus: Rc<EventBus>,
    storage: Rc<dyn StorageBackend>,
    registry: Rc<RefCell<CategoryRegistry>>,
    store: Rc<RefCell<ContentStore>>,
}

impl PortfolioApp {
    /// Build and wire everything over the given backend, then run the
    /// cold-start handshake: the content side requests the category set
    /// and the registry answers with a broadcast.
    pub fn new(storage: Rc<dyn StorageBackend>) -> Self {
        let bus = Rc::new(EventBus::new());
        let lookup: SharedLookup = Rc::new(RefCell::new(IndexMap::new()));

        // Keep the shared category cache fresh on every broadcast. The
        // cache is its own cell so handlers never borrow the store.
        {
            let lookup = lookup.clone();
            bus.subscribe(move |event| {
                if let CategoryEvent::Updated { lookup: current, .. } = event {
                    *lookup.borrow_mut() = current.clone();
                }
            });
        }

        let registry = Rc::new(RefCell::new(CategoryRegistry::new(
            storage.clone(),
            bus.clone(),
        )));

        // Answer late subscribers that ask for the current set.
        {
            let registry = registry.clone();
            bus.subscribe(move |event| {
                if matches!(event, CategoryEvent::Request) {
                    registry.borrow().broadcast();
                }
            });
        }

        let store = Rc::new(RefCell::new(ContentStore::new(storage.clone(), lookup)));

        bus.publish(&CategoryEvent::Request);
        info!("application context ready");

        Self { bus, storage, registry, store }
    }

    // ========================
    // Categories
    // ========================

    pub fn categories(&self) -> Vec<Category> {
        self.registry.borrow().all_categories()
    }

    pub fn add_category(&self, name: &str, color: Option<&str>) -> DomainResult<Category> {
        self.registry.borrow_mut().add_category(name, color)
    }

    pub fn edit_category(&self, id: &str, name: &str, color: &str) -> DomainResult<Category> {
        self.registry.borrow_mut().edit_category(id, name, color)
    }

    /// Delete a category and move its content to the fallback category.
    /// Returns the removed category and how many records moved.
    pub fn delete_category(&self, id: &str) -> DomainResult<(Category, usize)> {
        let removed = self.registry.borrow_mut().delete_category(id)?;
        let moved = self
            .store
            .borrow_mut()
            .reassign_category(&removed.id, FALLBACK_CATEGORY);
        if moved > 0 {
            info!("moved {} records from {} to {}", moved, removed.id, FALLBACK_CATEGORY);
        }
        Ok((removed, moved))
    }

    pub fn select_category(&self, id: &str) -> DomainResult<()> {
        self.registry.borrow_mut().select_category(id)
    }

    pub fn active_category(&self) -> String {
        self.registry.borrow().active_category().to_string()
    }

    // ========================
    // Content
    // ========================

    pub fn add_content(&self, title: &str, category: &str, body: &str) -> DomainResult<Content> {
        self.store.borrow_mut().add_content(title, category, body)
    }

    pub fn edit_content(
        &self,
        id: u32,
        title: &str,
        category: &str,
        body: &str,
    ) -> DomainResult<Content> {
        self.store.borrow_mut().edit_content(id, title, category, body)
    }

    pub fn delete_content(&self, id: u32) -> DomainResult<Content> {
        self.store.borrow_mut().delete_content(id)
    }

    pub fn duplicate_content(&self, id: u32) -> DomainResult<Content> {
        self.store.borrow_mut().duplicate_content(id)
    }

    pub fn move_content(&self, id: u32, category: &str) -> DomainResult<Content> {
        self.store.borrow_mut().move_to_category(id, category)
    }

    pub fn delete_all_contents(&self) {
        self.store.borrow_mut().delete_all()
    }

    pub fn all_contents(&self) -> Vec<Content> {
        self.store.borrow().all_contents().to_vec()
    }

    /// Content visible under the active category, newest first.
    pub fn visible_contents(&self) -> Vec<Content> {
        let registry = self.registry.borrow();
        let store = self.store.borrow();
        store
            .all_contents()
            .iter()
            .filter(|content| {
                let row = ContentRow {
                    content_id: content.id,
                    category: Some(content.category.clone()),
                    text: content.title.clone(),
                };
                registry.should_show(&row, |id| store.category_of(id))
            })
            .cloned()
            .collect()
    }

    /// Record count for a category tab; `all` counts everything.
    pub fn content_count(&self, category: &str) -> usize {
        let store = self.store.borrow();
        if category == "all" {
            store.len()
        } else {
            store.count_in_category(category)
        }
    }

    pub fn render_content(&self, content: &Content) -> String {
        self.store.borrow().render(content)
    }

    pub fn set_markdown_enabled(&self, enabled: bool) {
        self.store.borrow_mut().set_markdown_enabled(enabled)
    }

    pub fn category_label(&self, id: &str) -> CategoryLabel {
        self.store.borrow().category_label(id)
    }

    // ========================
    // Import / export
    // ========================

    pub fn export_contents(&self) -> DomainResult<String> {
        self.store.borrow().export_json()
    }

    pub fn import_contents(&self, json: &str) -> DomainResult<usize> {
        self.store.borrow_mut().import_json(json)
    }

    /// Export every module's persisted state as one backup document.
    pub fn export_backup(&self) -> DomainResult<String> {
        backup::export_backup(self.storage.as_ref())
    }

    /// Validate and restore a backup document, then reload both stores
    /// from the replaced payloads and re-broadcast the category set.
    pub fn import_backup(&self, json: &str) -> DomainResult<usize> {
        let restored = backup::import_backup(self.storage.as_ref(), json)?;
        self.registry.borrow_mut().reload();
        self.store.borrow_mut().reload();
        self.registry.borrow().broadcast();
        Ok(restored)
    }

    /// The bus, for frontends that subscribe their own handlers.
    pub fn bus(&self) -> &Rc<EventBus> {
        &self.bus
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn setup() -> PortfolioApp {
        PortfolioApp::new(Rc::new(MemoryStorage::new()))
    }

    #[test]
    fn test_cold_start_primes_category_cache() {
        let app = setup();
        // The store resolves default ids through the cache the handshake
        // filled, so an unknown id falls back instead of passing through
        let content = app.add_content("A", "ghost", "# hi").unwrap();
        assert_eq!(content.category, FALLBACK_CATEGORY);
        let content = app.add_content("B", "blog", "# hi").unwrap();
        assert_eq!(content.category, "blog");
    }

    #[test]
    fn test_new_category_is_usable_immediately() {
        let app = setup();
        let category = app.add_category("🎉 이벤트", Some("#112233")).unwrap();

        // The broadcast reached the content side without any manual sync
        let content = app.add_content("A", &category.id, "# hi").unwrap();
        assert_eq!(content.category, "event");
        let label = app.category_label("event");
        assert_eq!(label.name, "🎉 이벤트");
        assert_eq!(label.color, "#112233");
    }

    #[test]
    fn test_delete_category_reassigns_content() {
        let app = setup();
        let category = app.add_category("🎉 이벤트", None).unwrap();
        app.add_content("A", &category.id, "1").unwrap();
        app.add_content("B", &category.id, "2").unwrap();
        app.add_content("C", "blog", "3").unwrap();

        let (removed, moved) = app.delete_category(&category.id).unwrap();
        assert_eq!(removed.id, "event");
        assert_eq!(moved, 2);
        assert_eq!(app.content_count(FALLBACK_CATEGORY), 2);
        assert_eq!(app.content_count("blog"), 1);
        // No record points at the dead id
        assert!(app.all_contents().iter().all(|c| c.category != "event"));
    }

    #[test]
    fn test_visible_contents_follow_active_category() {
        let app = setup();
        app.add_content("A", "blog", "1").unwrap();
        app.add_content("B", "study", "2").unwrap();
        app.add_content("C", "blog", "3").unwrap();

        assert_eq!(app.visible_contents().len(), 3);

        app.select_category("blog").unwrap();
        let titles: Vec<String> = app
            .visible_contents()
            .iter()
            .map(|c| c.title.clone())
            .collect();
        // Newest first within the filter
        assert_eq!(titles, ["C", "A"]);
    }

    #[test]
    fn test_content_counts_per_tab() {
        let app = setup();
        app.add_content("A", "blog", "1").unwrap();
        app.add_content("B", "study", "2").unwrap();
        assert_eq!(app.content_count("all"), 2);
        assert_eq!(app.content_count("blog"), 1);
        assert_eq!(app.content_count("projects"), 0);
    }

    #[test]
    fn test_backup_round_trip_across_contexts() {
        let backup = {
            let app = setup();
            let category = app.add_category("🎉 이벤트", Some("#112233")).unwrap();
            app.add_content("A", &category.id, "# hi").unwrap();
            app.export_backup().unwrap()
        };

        let app = setup();
        let restored = app.import_backup(&backup).unwrap();
        assert_eq!(restored, 2);

        // Registry, store, and cache all reflect the restored state
        assert!(app.categories().iter().any(|c| c.id == "event"));
        assert_eq!(app.content_count("event"), 1);
        assert_eq!(app.category_label("event").name, "🎉 이벤트");
    }

    #[test]
    fn test_failed_backup_import_leaves_state_alone() {
        let app = setup();
        app.add_content("A", "blog", "1").unwrap();
        assert!(app.import_backup(r#"{"data":{}}"#).is_err());
        assert_eq!(app.content_count("all"), 1);
    }

    #[test]
    fn test_render_through_context() {
        let app = setup();
        let content = app.add_content("A", "blog", "**bold**").unwrap();
        assert!(app.render_content(&content).contains("<strong>bold</strong>"));

        app.set_markdown_enabled(false);
        assert_eq!(app.render_content(&content), "**bold**");
    }
}

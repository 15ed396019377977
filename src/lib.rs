//! Portfolio Core
//!
//! Category and content state layer for a portfolio site, with the two
//! registries kept in sync over an in-process event bus.
//!
//! Layered architecture:
//! - domain: Core entities and business rules
//! - storage: Key-value persistence backends
//! - registry / store: Category and content state with versioned payloads
//! - app: Wiring context exposing the operations a frontend calls
//!
//! Everything is single-threaded and synchronous; shared state moves
//! through `Rc<RefCell<_>>` handles the [`app::PortfolioApp`] context owns.

pub mod app;
pub mod backup;
pub mod domain;
pub mod events;
pub mod markdown;
pub mod registry;
pub mod slug;
pub mod storage;
pub mod store;

pub use app::PortfolioApp;
pub use domain::{Category, Content, DomainError, DomainResult};
pub use events::{CategoryEvent, EventBus};
pub use registry::{CategoryRegistry, ContentRow};
pub use storage::{FileStorage, MemoryStorage, StorageBackend};
pub use store::{CategoryLabel, ContentStore};

//! Domain Layer
//!
//! Contains all domain entities and core abstractions.
//! This layer has no dependencies on storage or the event bus.

mod category;
mod content;
mod entity;

pub use category::{default_categories, Category, COLOR_PALETTE, FALLBACK_CATEGORY, FALLBACK_COLOR};
pub use content::Content;
pub use entity::{DomainError, DomainResult, Entity};

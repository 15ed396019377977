//! Domain Layer - Core Entity Trait
//!
//! This trait defines the basic contract for all domain entities.

use thiserror::Error;

/// Core trait for all domain entities
pub trait Entity: Sized + Clone {
    /// The type of the entity's unique identifier
    type Id: Clone + Eq + std::hash::Hash;

    /// Returns the entity's unique identifier
    fn id(&self) -> Self::Id;
}

/// Common result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("storage error: {0}")]
    Storage(String),
}

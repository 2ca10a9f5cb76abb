//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::{CorrelationKey, ItemId, LanguageId};

/// Domain errors represent business rule violations and unresolved references.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("key can not be empty")]
    EmptyKey,

    #[error("dictionary item with key already exists: {0}")]
    DuplicateKey(String),

    #[error("dictionary item not found: {0}")]
    ItemNotFound(ItemId),

    #[error("parent dictionary item not found: {0}")]
    ParentNotFound(ItemId),

    #[error("language not found: {0}")]
    LanguageNotFound(LanguageId),
}

impl DomainError {
    /// Referenced id, key or language does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ItemNotFound(_) | Self::ParentNotFound(_) | Self::LanguageNotFound(_)
        )
    }

    /// Input rejected by a validation rule (empty key, key conflict).
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::EmptyKey | Self::DuplicateKey(_))
    }
}

/// Structural problems found while assembling a forest from stored items.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeShapeError {
    #[error("item '{key}' references missing parent {parent}")]
    DanglingParent { key: String, parent: CorrelationKey },

    #[error("cycle detected in dictionary hierarchy at: {0}")]
    CycleDetected(String),

    #[error("correlation key used by more than one item: {0}")]
    DuplicateCorrelation(CorrelationKey),
}

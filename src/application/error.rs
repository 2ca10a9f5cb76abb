//! Application-level errors (wraps domain and store errors)

use thiserror::Error;

use crate::domain::{DomainError, ItemId};
use crate::infrastructure::StoreError;

/// Message key for a key clash, parameterized by the attempted key.
pub const CHANGE_KEY_ERROR: &str = "dictionaryItem/changeKeyError";

/// Message key for an empty key.
pub const EMPTY_KEY_ERROR: &str = "dictionaryItem/emptyKeyError";

/// Application errors wrap domain and store errors and add the
/// partial-delete report.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("partial delete of item {requested}: {count} item(s) not removed", count = .surviving.len())]
    PartialDelete {
        requested: ItemId,
        /// Ids removed before the failure, descendants first
        removed: Vec<ItemId>,
        /// Ids that still resolve in the store
        surviving: Vec<ItemId>,
        #[source]
        source: StoreError,
    },

    #[error("config error: {message}")]
    Config { message: String },
}

impl ApplicationError {
    /// Referenced id, key or language does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Domain(e) if e.is_not_found())
    }

    /// Empty key or key conflict.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Domain(e) if e.is_validation())
    }

    pub fn is_partial_delete(&self) -> bool {
        matches!(self, Self::PartialDelete { .. })
    }

    /// Localizable message key for validation failures.
    pub fn message_key(&self) -> Option<&'static str> {
        match self {
            Self::Domain(DomainError::DuplicateKey(_)) => Some(CHANGE_KEY_ERROR),
            Self::Domain(DomainError::EmptyKey) => Some(EMPTY_KEY_ERROR),
            _ => None,
        }
    }

    /// Positional arguments for [`message_key`](Self::message_key).
    pub fn message_args(&self) -> Vec<String> {
        match self {
            Self::Domain(DomainError::DuplicateKey(key)) => vec![key.clone()],
            _ => Vec::new(),
        }
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;

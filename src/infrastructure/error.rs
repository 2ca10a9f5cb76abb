//! Infrastructure-level errors: store failures and the wrapper used at the edge

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::{CorrelationKey, ItemId, LanguageId, TreeShapeError};

/// Failures reported by a [`DictionaryStore`](crate::infrastructure::traits::DictionaryStore).
///
/// The service forwards these unchanged unless it can classify them
/// (key conflicts, vanished items).
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("key already taken: {0}")]
    KeyConflict(String),

    #[error("parent does not resolve: {0}")]
    MissingParent(CorrelationKey),

    #[error("item not found in store: {0}")]
    NotFound(ItemId),

    #[error("item {0} still has children")]
    HasChildren(ItemId),

    #[error("language already exists: {0}")]
    LanguageExists(LanguageId),

    #[error("inconsistent store state: {0}")]
    Inconsistent(#[from] TreeShapeError),

    #[error("I/O error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid store document {context}: {message}")]
    Serialization { context: String, message: String },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Create an I/O error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Infrastructure errors wrap application errors and add I/O-level concerns.
#[derive(Error, Debug)]
pub enum InfraError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("I/O error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl InfraError {
    /// Create an I/O error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// Result type for infrastructure layer operations.
pub type InfraResult<T> = Result<T, InfraError>;

//! Error conversion helpers for store calls
//!
//! Classifies the store failures the service knows how to report and passes
//! everything else through unchanged.

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::DomainError;
use crate::infrastructure::{StoreError, StoreResult};

/// Extension trait for converting `StoreResult` to `ApplicationResult`.
pub trait StoreResultExt<T> {
    /// Map a store unique-index clash to `DuplicateKey` and a vanished item to
    /// `ItemNotFound`; everything else stays a store error.
    ///
    /// # Example
    /// ```ignore
    /// store.update(&item).classified()?;
    /// ```
    fn classified(self) -> ApplicationResult<T>;
}

impl<T> StoreResultExt<T> for StoreResult<T> {
    fn classified(self) -> ApplicationResult<T> {
        self.map_err(|e| match e {
            StoreError::KeyConflict(key) => ApplicationError::from(DomainError::DuplicateKey(key)),
            StoreError::NotFound(id) => ApplicationError::from(DomainError::ItemNotFound(id)),
            other => ApplicationError::Store(other),
        })
    }
}

//! Service container for dependency injection
//!
//! Wires the dictionary service to its store.

use std::sync::Arc;

use crate::application::services::DictionaryService;
use crate::config::Settings;
use crate::infrastructure::store::{MemoryStore, TomlFileStore};
use crate::infrastructure::traits::{DictionaryStore, FileSystem, RealFileSystem};

/// Container holding all application services.
///
/// One container owns one [`DictionaryService`]; callers share it through the
/// `Arc` so that delete and create/rename coordinate on the same tree gate.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Persistence collaborator
    pub store: Arc<dyn DictionaryStore>,

    /// Dictionary tree service
    pub dictionary: Arc<DictionaryService>,
}

impl ServiceContainer {
    /// Create a container backed by the TOML store at `settings.store_path`.
    pub fn new(settings: Settings) -> Self {
        Self::with_fs(settings, Arc::new(RealFileSystem))
    }

    /// File-backed container with a custom filesystem (for testing).
    pub fn with_fs(settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        let store = TomlFileStore::new(settings.store_path.clone(), fs)
            .with_seed_languages(settings.seed_languages());
        Self::with_store(settings, Arc::new(store))
    }

    /// Container backed by an in-memory store seeded with the configured languages.
    pub fn in_memory(settings: Settings) -> Self {
        let store = MemoryStore::with_languages(settings.seed_languages());
        Self::with_store(settings, Arc::new(store))
    }

    /// Create a container around any store implementation.
    pub fn with_store(settings: Settings, store: Arc<dyn DictionaryStore>) -> Self {
        let settings = Arc::new(settings);
        let dictionary = Arc::new(DictionaryService::new(Arc::clone(&store)));

        Self {
            settings,
            store,
            dictionary,
        }
    }
}

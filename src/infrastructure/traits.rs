//! I/O boundary traits for testability
//!
//! The dictionary service only talks to persistence through [`DictionaryStore`];
//! the file-backed store in turn only touches disk through [`FileSystem`].

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

use fs2::FileExt;

use crate::domain::{
    ActorId, CorrelationKey, DictionaryItem, ItemId, Language, LanguageId, NewDictionaryItem,
};
use crate::infrastructure::error::StoreResult;

/// Durable keyed storage for dictionary items.
///
/// Each call is expected to be transactional on its own. Implementations must
/// enforce a unique index on `key` in [`insert`](Self::insert) and
/// [`update`](Self::update), reporting a clash as `StoreError::KeyConflict`.
pub trait DictionaryStore: Send + Sync {
    /// Look up an item by its primary id.
    fn get_by_id(&self, id: ItemId) -> StoreResult<Option<DictionaryItem>>;

    /// Look up an item by its key (exact, case-sensitive).
    fn get_by_key(&self, key: &str) -> StoreResult<Option<DictionaryItem>>;

    /// Direct children of the item with the given correlation key.
    fn children_of(&self, parent: CorrelationKey) -> StoreResult<Vec<DictionaryItem>>;

    /// All transitive descendants of the item with the given correlation key.
    fn descendants_of(&self, ancestor: CorrelationKey) -> StoreResult<Vec<DictionaryItem>>;

    /// Every item, read in one consistent pass.
    fn snapshot(&self) -> StoreResult<Vec<DictionaryItem>>;

    /// Persist a new item; the store assigns id, correlation key and timestamps.
    fn insert(&self, item: NewDictionaryItem) -> StoreResult<DictionaryItem>;

    /// Persist key, parent and translations of an existing item.
    fn update(&self, item: &DictionaryItem) -> StoreResult<DictionaryItem>;

    /// Remove one item. Items that still have children are refused.
    fn delete(&self, id: ItemId, actor: ActorId) -> StoreResult<()>;

    fn get_language(&self, id: &LanguageId) -> StoreResult<Option<Language>>;

    fn languages(&self) -> StoreResult<Vec<Language>>;

    fn add_language(&self, language: Language) -> StoreResult<()>;
}

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write string content to file.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Rename/move a file. Atomic on the same filesystem.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Remove a file.
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Create parent directories if needed.
    fn ensure_parent(&self, path: &Path) -> io::Result<()>;

    /// Open (creating if needed) `path` and block until an exclusive OS lock
    /// is held. The lock is released when the returned handle is dropped.
    fn lock_exclusive(&self, path: &Path) -> io::Result<File>;

    /// Like [`lock_exclusive`](Self::lock_exclusive), but shared with other readers.
    fn lock_shared(&self, path: &Path) -> io::Result<File>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        std::fs::rename(from, to)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }

    fn ensure_parent(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }

    fn lock_exclusive(&self, path: &Path) -> io::Result<File> {
        let file = open_lock_file(path)?;
        FileExt::lock_exclusive(&file)?;
        Ok(file)
    }

    fn lock_shared(&self, path: &Path) -> io::Result<File> {
        let file = open_lock_file(path)?;
        FileExt::lock_shared(&file)?;
        Ok(file)
    }
}

fn open_lock_file(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .create(true)
        .truncate(false)
        .read(true)
        .write(true)
        .open(path)
}

//! TOML-file backed store.
//!
//! Every call loads the document, applies one operation and, for writes,
//! replaces the file via write-to-temp + rename. An OS lock on a sidecar
//! `<file>.lock` spans the whole call (shared for reads, exclusive for
//! writes), so each call is a transaction across threads and processes.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument};
use uuid::Uuid;

use crate::domain::{
    ActorId, CorrelationKey, DictionaryItem, ItemId, Language, LanguageId, NewDictionaryItem,
};
use crate::infrastructure::error::{StoreError, StoreResult};
use crate::infrastructure::store::state::{StoreDocument, StoreState};
use crate::infrastructure::traits::{DictionaryStore, FileSystem};

/// Dictionary store persisted as a single TOML document.
pub struct TomlFileStore {
    path: PathBuf,
    fs: Arc<dyn FileSystem>,
    /// Languages a missing store file starts out with
    seed_languages: Vec<Language>,
}

impl TomlFileStore {
    pub fn new(path: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            path: path.into(),
            fs,
            seed_languages: Vec::new(),
        }
    }

    pub fn with_seed_languages(mut self, languages: Vec<Language>) -> Self {
        self.seed_languages = languages;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(suffix);
        self.path.with_file_name(name)
    }

    fn lock_path(&self) -> PathBuf {
        self.sibling(".lock")
    }

    /// Unique per write, so writers never share a temp file.
    fn tmp_path(&self) -> PathBuf {
        self.sibling(&format!(".{}.tmp", Uuid::new_v4().simple()))
    }

    fn acquire(&self, exclusive: bool) -> StoreResult<File> {
        let lock_path = self.lock_path();
        let context = lock_path.display().to_string();
        self.fs
            .ensure_parent(&lock_path)
            .map_err(|e| StoreError::io(format!("create parent of {context}"), e))?;
        let locked = if exclusive {
            self.fs.lock_exclusive(&lock_path)
        } else {
            self.fs.lock_shared(&lock_path)
        };
        locked.map_err(|e| StoreError::io(format!("lock {context}"), e))
    }

    fn load(&self) -> StoreResult<StoreState> {
        if !self.fs.exists(&self.path) {
            debug!("store file missing, starting empty: {}", self.path.display());
            return Ok(StoreState::with_languages(self.seed_languages.clone()));
        }
        let context = self.path.display().to_string();
        let content = self
            .fs
            .read_to_string(&self.path)
            .map_err(|e| StoreError::io(format!("read {context}"), e))?;
        let doc: StoreDocument = toml::from_str(&content).map_err(|e| StoreError::Serialization {
            context: context.clone(),
            message: e.to_string(),
        })?;
        StoreState::from_document(doc, &context)
    }

    fn save(&self, state: &StoreState) -> StoreResult<()> {
        let context = self.path.display().to_string();
        let content =
            toml::to_string_pretty(&state.to_document()).map_err(|e| StoreError::Serialization {
                context: context.clone(),
                message: e.to_string(),
            })?;

        let tmp = self.tmp_path();
        self.fs
            .ensure_parent(&self.path)
            .map_err(|e| StoreError::io(format!("create parent of {context}"), e))?;
        self.fs
            .write(&tmp, &content)
            .map_err(|e| StoreError::io(format!("write {}", tmp.display()), e))?;
        self.fs.rename(&tmp, &self.path).map_err(|e| {
            let _ = self.fs.remove_file(&tmp);
            StoreError::io(format!("replace {context}"), e)
        })
    }

    fn read<T>(&self, f: impl FnOnce(&StoreState) -> T) -> StoreResult<T> {
        let _guard = self.acquire(false)?;
        let state = self.load()?;
        Ok(f(&state))
    }

    #[instrument(level = "trace", skip_all, fields(path = %self.path.display()))]
    fn write<T>(&self, f: impl FnOnce(&mut StoreState) -> StoreResult<T>) -> StoreResult<T> {
        let _guard = self.acquire(true)?;
        let mut state = self.load()?;
        let result = f(&mut state)?;
        self.save(&state)?;
        Ok(result)
    }
}

impl DictionaryStore for TomlFileStore {
    fn get_by_id(&self, id: ItemId) -> StoreResult<Option<DictionaryItem>> {
        self.read(|s| s.get_by_id(id).cloned())
    }

    fn get_by_key(&self, key: &str) -> StoreResult<Option<DictionaryItem>> {
        self.read(|s| s.get_by_key(key).cloned())
    }

    fn children_of(&self, parent: CorrelationKey) -> StoreResult<Vec<DictionaryItem>> {
        self.read(|s| s.children_of(parent))
    }

    fn descendants_of(&self, ancestor: CorrelationKey) -> StoreResult<Vec<DictionaryItem>> {
        self.read(|s| s.descendants_of(ancestor))
    }

    fn snapshot(&self) -> StoreResult<Vec<DictionaryItem>> {
        self.read(StoreState::snapshot)
    }

    fn insert(&self, item: NewDictionaryItem) -> StoreResult<DictionaryItem> {
        self.write(|s| s.insert(item))
    }

    fn update(&self, item: &DictionaryItem) -> StoreResult<DictionaryItem> {
        self.write(|s| s.update(item))
    }

    fn delete(&self, id: ItemId, actor: ActorId) -> StoreResult<()> {
        self.write(|s| s.delete(id, actor))
    }

    fn get_language(&self, id: &LanguageId) -> StoreResult<Option<Language>> {
        self.read(|s| s.get_language(id).cloned())
    }

    fn languages(&self) -> StoreResult<Vec<Language>> {
        self.read(StoreState::languages)
    }

    fn add_language(&self, language: Language) -> StoreResult<()> {
        self.write(|s| s.add_language(language))
    }
}

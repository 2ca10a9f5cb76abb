//! Dictionary tree service
//!
//! Enforces key uniqueness, orchestrates cascading delete, merges translation
//! updates and produces the ordered tree listing. Holds no tree state between
//! calls: every operation re-reads the store.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult, StoreResultExt};
use crate::domain::{
    ActorId, DictionaryForest, DictionaryItem, DomainError, ItemId, Language, LanguageId,
    NewDictionaryItem, Translation, TranslationMap, TreeEntry,
};
use crate::infrastructure::traits::DictionaryStore;
use crate::infrastructure::StoreError;

/// Rename and/or translation changes applied as one save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    pub id: ItemId,
    /// New key, `None` leaves the key untouched
    pub key: Option<String>,
    pub translations: Vec<Translation>,
}

impl SaveRequest {
    pub fn new(id: ItemId) -> Self {
        Self {
            id,
            key: None,
            translations: Vec::new(),
        }
    }

    pub fn rename(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn translate(mut self, language: impl Into<LanguageId>, text: impl Into<String>) -> Self {
        self.translations.push(Translation::new(language, text));
        self
    }
}

/// Outcome of a successful cascading delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteReport {
    pub requested: ItemId,
    /// Removed ids in deletion order: descendants first, `requested` last
    pub removed: Vec<ItemId>,
}

/// Service for the dictionary item tree.
pub struct DictionaryService {
    store: Arc<dyn DictionaryStore>,
    /// Delete holds this exclusively; writers that depend on parent linkage or
    /// keys hold it shared. Listing does not take it.
    tree_gate: RwLock<()>,
}

impl DictionaryService {
    /// Create a new dictionary service.
    pub fn new(store: Arc<dyn DictionaryStore>) -> Self {
        Self {
            store,
            tree_gate: RwLock::new(()),
        }
    }

    /// Get an item by id.
    pub fn get(&self, id: ItemId) -> ApplicationResult<DictionaryItem> {
        debug!("get: id={}", id);
        self.existing(id)
    }

    /// Get an item by its key.
    pub fn get_by_key(&self, key: &str) -> ApplicationResult<Option<DictionaryItem>> {
        Ok(self.store.get_by_key(key)?)
    }

    /// Check whether any item in the tree owns `key`.
    pub fn exists(&self, key: &str) -> ApplicationResult<bool> {
        Ok(self.get_by_key(key)?.is_some())
    }

    /// Direct children of an item, ascending by key.
    pub fn children(&self, id: ItemId) -> ApplicationResult<Vec<DictionaryItem>> {
        let item = self.existing(id)?;
        let mut children = self.store.children_of(item.correlation)?;
        children.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(children)
    }

    /// Create a new item, as a root when `parent_id` is `None`.
    ///
    /// The key must be non-empty and unused anywhere in the tree. The optional
    /// initial translation is the only one attached.
    #[instrument(level = "debug", skip(self, initial))]
    pub fn create(
        &self,
        key: &str,
        parent_id: Option<ItemId>,
        initial: Option<Translation>,
    ) -> ApplicationResult<DictionaryItem> {
        if key.is_empty() {
            return Err(DomainError::EmptyKey.into());
        }
        let _gate = self.tree_gate.read();

        if self.store.get_by_key(key)?.is_some() {
            return Err(DomainError::DuplicateKey(key.to_string()).into());
        }

        let parent = match parent_id {
            Some(pid) => Some(
                self.store
                    .get_by_id(pid)?
                    .ok_or(DomainError::ParentNotFound(pid))?
                    .correlation,
            ),
            None => None,
        };

        let mut translations = TranslationMap::new();
        if let Some(t) = initial {
            self.require_language(&t.language)?;
            translations.upsert(t.language, t.text);
        }

        let result = self.store.insert(NewDictionaryItem {
            key: key.to_string(),
            parent,
            translations,
        });
        match (result, parent_id) {
            (Err(StoreError::MissingParent(_)), Some(pid)) => {
                Err(DomainError::ParentNotFound(pid).into())
            }
            (result, _) => {
                let item = result.classified()?;
                debug!("create: id={} key={}", item.id, item.key);
                Ok(item)
            }
        }
    }

    /// Change the key of an item.
    ///
    /// Renaming onto the item's own current key is a no-op.
    pub fn rename(&self, id: ItemId, new_key: &str) -> ApplicationResult<DictionaryItem> {
        self.save(SaveRequest::new(id).rename(new_key))
    }

    /// Insert or overwrite one translation.
    pub fn upsert_translation(
        &self,
        id: ItemId,
        language: LanguageId,
        text: impl Into<String>,
    ) -> ApplicationResult<DictionaryItem> {
        self.upsert_translations(id, vec![Translation::new(language, text)])
    }

    /// Apply several translations as one save: all languages are resolved
    /// before anything changes, and the item is persisted once.
    pub fn upsert_translations(
        &self,
        id: ItemId,
        translations: Vec<Translation>,
    ) -> ApplicationResult<DictionaryItem> {
        self.save(SaveRequest {
            id,
            key: None,
            translations,
        })
    }

    /// Optional rename plus translations, validated up front and persisted
    /// with a single store update.
    #[instrument(level = "debug", skip(self, request), fields(id = %request.id))]
    pub fn save(&self, request: SaveRequest) -> ApplicationResult<DictionaryItem> {
        let SaveRequest {
            id,
            key,
            translations,
        } = request;
        if matches!(key.as_deref(), Some("")) {
            return Err(DomainError::EmptyKey.into());
        }
        let _gate = self.tree_gate.read();

        let current = self.existing(id)?;
        let mut updated = current.clone();

        if let Some(new_key) = key {
            if new_key != current.key {
                if let Some(owner) = self.store.get_by_key(&new_key)? {
                    if owner.id != current.id {
                        return Err(DomainError::DuplicateKey(new_key).into());
                    }
                }
                updated.key = new_key;
            }
        }

        for t in &translations {
            self.require_language(&t.language)?;
        }
        for t in translations {
            updated.translations.upsert(t.language, t.text);
        }

        if updated == current {
            debug!("save: nothing changed for id={}", id);
            return Ok(current);
        }
        self.store.update(&updated).classified()
    }

    /// Delete an item together with its whole subtree.
    ///
    /// Nodes are removed in post-order, so a parent goes only after all of its
    /// children did. If a removal fails, that node and its ancestors are kept
    /// (no orphans), siblings are still attempted, and the survivors are
    /// reported in [`ApplicationError::PartialDelete`].
    #[instrument(level = "debug", skip(self))]
    pub fn delete(&self, id: ItemId, actor: ActorId) -> ApplicationResult<DeleteReport> {
        let _gate = self.tree_gate.write();

        let root = self.existing(id)?;
        let descendants = self.store.descendants_of(root.correlation)?;
        let forest = DictionaryForest::build_subtree(root, descendants).map_err(StoreError::from)?;
        debug!("delete: id={} subtree size={}", id, forest.len());

        let mut removed = Vec::with_capacity(forest.len());
        let mut surviving = Vec::new();
        let mut blocked = HashSet::new();
        let mut first_error: Option<StoreError> = None;

        for (idx, node) in forest.iter_postorder() {
            let item_id = node.item.id;
            let outcome = if blocked.contains(&idx) {
                Err(None)
            } else {
                match self.store.delete(item_id, actor) {
                    // Already gone: the store is authoritative
                    Ok(()) | Err(StoreError::NotFound(_)) => Ok(()),
                    Err(e) => Err(Some(e)),
                }
            };
            match outcome {
                Ok(()) => removed.push(item_id),
                Err(error) => {
                    if let Some(e) = error {
                        debug!("delete: id={} failed: {}", item_id, e);
                        first_error.get_or_insert(e);
                    }
                    surviving.push(item_id);
                    if let Some(parent) = node.parent {
                        blocked.insert(parent);
                    }
                }
            }
        }

        if !surviving.is_empty() {
            // Re-check against the store; whatever no longer resolves is gone
            let (still_there, gone): (Vec<ItemId>, Vec<ItemId>) = surviving
                .into_iter()
                .partition(|sid| !matches!(self.store.get_by_id(*sid), Ok(None)));
            removed.extend(gone);
            if !still_there.is_empty() {
                return Err(ApplicationError::PartialDelete {
                    requested: id,
                    removed,
                    surviving: still_there,
                    source: first_error.unwrap_or_else(|| {
                        StoreError::Unavailable("delete interrupted".to_string())
                    }),
                });
            }
        }

        Ok(DeleteReport {
            requested: id,
            removed,
        })
    }

    /// Flattened pre-order listing of the whole forest.
    ///
    /// Roots first, each subtree complete before the next root; siblings
    /// ascending by key (case-sensitive). Built from one store snapshot.
    #[instrument(level = "debug", skip(self))]
    pub fn list_tree(&self) -> ApplicationResult<Vec<TreeEntry>> {
        let items = self.store.snapshot()?;
        let forest = DictionaryForest::build(items).map_err(StoreError::from)?;
        Ok(forest.into_entries())
    }

    /// All languages translations can be attached to.
    pub fn languages(&self) -> ApplicationResult<Vec<Language>> {
        Ok(self.store.languages()?)
    }

    /// Register a language.
    pub fn add_language(&self, language: Language) -> ApplicationResult<()> {
        Ok(self.store.add_language(language)?)
    }

    fn existing(&self, id: ItemId) -> ApplicationResult<DictionaryItem> {
        self.store
            .get_by_id(id)?
            .ok_or_else(|| DomainError::ItemNotFound(id).into())
    }

    fn require_language(&self, language: &LanguageId) -> ApplicationResult<Language> {
        self.store
            .get_language(language)?
            .ok_or_else(|| DomainError::LanguageNotFound(language.clone()).into())
    }
}

//! In-process store.

use parking_lot::RwLock;

use crate::domain::{
    ActorId, CorrelationKey, DictionaryItem, ItemId, Language, LanguageId, NewDictionaryItem,
};
use crate::infrastructure::error::StoreResult;
use crate::infrastructure::store::state::StoreState;
use crate::infrastructure::traits::DictionaryStore;

/// Dictionary store kept entirely in memory.
///
/// A single `RwLock` covers items and indexes, so every check-then-write in
/// [`StoreState`] runs as one unit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<StoreState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_languages(languages: impl IntoIterator<Item = Language>) -> Self {
        Self {
            state: RwLock::new(StoreState::with_languages(languages)),
        }
    }

    pub fn len(&self) -> usize {
        self.state.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().is_empty()
    }
}

impl DictionaryStore for MemoryStore {
    fn get_by_id(&self, id: ItemId) -> StoreResult<Option<DictionaryItem>> {
        Ok(self.state.read().get_by_id(id).cloned())
    }

    fn get_by_key(&self, key: &str) -> StoreResult<Option<DictionaryItem>> {
        Ok(self.state.read().get_by_key(key).cloned())
    }

    fn children_of(&self, parent: CorrelationKey) -> StoreResult<Vec<DictionaryItem>> {
        Ok(self.state.read().children_of(parent))
    }

    fn descendants_of(&self, ancestor: CorrelationKey) -> StoreResult<Vec<DictionaryItem>> {
        Ok(self.state.read().descendants_of(ancestor))
    }

    fn snapshot(&self) -> StoreResult<Vec<DictionaryItem>> {
        Ok(self.state.read().snapshot())
    }

    fn insert(&self, item: NewDictionaryItem) -> StoreResult<DictionaryItem> {
        self.state.write().insert(item)
    }

    fn update(&self, item: &DictionaryItem) -> StoreResult<DictionaryItem> {
        self.state.write().update(item)
    }

    fn delete(&self, id: ItemId, actor: ActorId) -> StoreResult<()> {
        self.state.write().delete(id, actor)
    }

    fn get_language(&self, id: &LanguageId) -> StoreResult<Option<Language>> {
        Ok(self.state.read().get_language(id).cloned())
    }

    fn languages(&self) -> StoreResult<Vec<Language>> {
        Ok(self.state.read().languages())
    }

    fn add_language(&self, language: Language) -> StoreResult<()> {
        self.state.write().add_language(language)
    }
}

//! Store state shared by the memory and file backends.
//!
//! Holds the items, the unique key index and the language table. All
//! constraint checks happen here, so both backends enforce them identically.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::domain::{
    ActorId, CorrelationKey, DictionaryItem, ItemId, Language, LanguageId, NewDictionaryItem,
};
use crate::infrastructure::error::{StoreError, StoreResult};

/// On-disk shape of a store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreDocument {
    #[serde(default)]
    pub next_id: u64,
    #[serde(default)]
    pub languages: Vec<Language>,
    #[serde(default)]
    pub items: Vec<DictionaryItem>,
}

#[derive(Debug, Clone, Default)]
pub struct StoreState {
    next_id: u64,
    languages: BTreeMap<LanguageId, Language>,
    items: BTreeMap<ItemId, DictionaryItem>,
    key_index: HashMap<String, ItemId>,
    correlation_index: HashMap<CorrelationKey, ItemId>,
}

impl StoreState {
    pub fn with_languages(languages: impl IntoIterator<Item = Language>) -> Self {
        Self {
            languages: languages.into_iter().map(|l| (l.id.clone(), l)).collect(),
            ..Self::default()
        }
    }

    /// Rebuild indexes from a document, refusing duplicate ids, keys or
    /// correlation keys.
    pub fn from_document(doc: StoreDocument, context: &str) -> StoreResult<Self> {
        let invalid = |message: String| StoreError::Serialization {
            context: context.to_string(),
            message,
        };

        let mut state = Self::with_languages(doc.languages);
        state.next_id = doc.next_id;

        for item in doc.items {
            if state.key_index.insert(item.key.clone(), item.id).is_some() {
                return Err(invalid(format!("duplicate key '{}'", item.key)));
            }
            if state.correlation_index.insert(item.correlation, item.id).is_some() {
                return Err(invalid(format!("duplicate correlation key {}", item.correlation)));
            }
            state.next_id = state.next_id.max(item.id.get());
            if state.items.insert(item.id, item).is_some() {
                return Err(invalid("duplicate item id".to_string()));
            }
        }
        Ok(state)
    }

    pub fn to_document(&self) -> StoreDocument {
        StoreDocument {
            next_id: self.next_id,
            languages: self.languages.values().cloned().collect(),
            items: self.items.values().cloned().collect(),
        }
    }

    pub fn get_by_id(&self, id: ItemId) -> Option<&DictionaryItem> {
        self.items.get(&id)
    }

    pub fn get_by_key(&self, key: &str) -> Option<&DictionaryItem> {
        self.key_index.get(key).and_then(|id| self.items.get(id))
    }

    pub fn children_of(&self, parent: CorrelationKey) -> Vec<DictionaryItem> {
        self.items
            .values()
            .filter(|item| item.parent == Some(parent))
            .cloned()
            .collect()
    }

    /// Explicit-stack walk; a visited set keeps corrupted links from looping.
    pub fn descendants_of(&self, ancestor: CorrelationKey) -> Vec<DictionaryItem> {
        let mut by_parent: HashMap<CorrelationKey, Vec<&DictionaryItem>> = HashMap::new();
        for item in self.items.values() {
            if let Some(parent) = item.parent {
                by_parent.entry(parent).or_default().push(item);
            }
        }

        let mut result = Vec::new();
        let mut visited = HashSet::from([ancestor]);
        let mut stack = vec![ancestor];
        while let Some(current) = stack.pop() {
            for child in by_parent.get(&current).into_iter().flatten() {
                if visited.insert(child.correlation) {
                    result.push((*child).clone());
                    stack.push(child.correlation);
                }
            }
        }
        result
    }

    pub fn snapshot(&self) -> Vec<DictionaryItem> {
        self.items.values().cloned().collect()
    }

    pub fn insert(&mut self, new: NewDictionaryItem) -> StoreResult<DictionaryItem> {
        if self.key_index.contains_key(&new.key) {
            return Err(StoreError::KeyConflict(new.key));
        }
        if let Some(parent) = new.parent {
            if !self.correlation_index.contains_key(&parent) {
                return Err(StoreError::MissingParent(parent));
            }
        }

        self.next_id += 1;
        let now = Utc::now();
        let item = DictionaryItem {
            id: ItemId::new(self.next_id),
            correlation: CorrelationKey::generate(),
            key: new.key,
            parent: new.parent,
            created_at: now,
            updated_at: now,
            translations: new.translations,
        };
        trace!(id = %item.id, key = %item.key, "insert");

        self.key_index.insert(item.key.clone(), item.id);
        self.correlation_index.insert(item.correlation, item.id);
        self.items.insert(item.id, item.clone());
        Ok(item)
    }

    pub fn update(&mut self, changed: &DictionaryItem) -> StoreResult<DictionaryItem> {
        let current = self
            .items
            .get(&changed.id)
            .cloned()
            .ok_or(StoreError::NotFound(changed.id))?;

        if current.key != changed.key {
            if let Some(owner) = self.key_index.get(&changed.key) {
                if *owner != changed.id {
                    return Err(StoreError::KeyConflict(changed.key.clone()));
                }
            }
        }
        if let Some(parent) = changed.parent {
            if parent == current.correlation || !self.correlation_index.contains_key(&parent) {
                return Err(StoreError::MissingParent(parent));
            }
        }

        let updated = DictionaryItem {
            id: current.id,
            correlation: current.correlation,
            key: changed.key.clone(),
            parent: changed.parent,
            created_at: current.created_at,
            updated_at: Utc::now(),
            translations: changed.translations.clone(),
        };
        trace!(id = %updated.id, key = %updated.key, "update");

        self.key_index.remove(&current.key);
        self.key_index.insert(updated.key.clone(), updated.id);
        self.items.insert(updated.id, updated.clone());
        Ok(updated)
    }

    pub fn delete(&mut self, id: ItemId, actor: ActorId) -> StoreResult<()> {
        let item = self.items.get(&id).ok_or(StoreError::NotFound(id))?;
        let correlation = item.correlation;
        if self.items.values().any(|i| i.parent == Some(correlation)) {
            return Err(StoreError::HasChildren(id));
        }
        trace!(id = %id, actor = actor.0, "delete");

        if let Some(item) = self.items.remove(&id) {
            self.key_index.remove(&item.key);
            self.correlation_index.remove(&item.correlation);
        }
        Ok(())
    }

    pub fn get_language(&self, id: &LanguageId) -> Option<&Language> {
        self.languages.get(id)
    }

    pub fn languages(&self) -> Vec<Language> {
        self.languages.values().cloned().collect()
    }

    pub fn add_language(&mut self, language: Language) -> StoreResult<()> {
        if self.languages.contains_key(&language.id) {
            return Err(StoreError::LanguageExists(language.id));
        }
        self.languages.insert(language.id.clone(), language);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TranslationMap;

    fn new_item(key: &str, parent: Option<CorrelationKey>) -> NewDictionaryItem {
        NewDictionaryItem {
            key: key.to_string(),
            parent,
            translations: TranslationMap::new(),
        }
    }

    #[test]
    fn given_taken_key_when_inserting_then_key_conflict() {
        let mut state = StoreState::default();
        state.insert(new_item("greeting", None)).unwrap();

        let result = state.insert(new_item("greeting", None));

        assert!(matches!(result, Err(StoreError::KeyConflict(k)) if k == "greeting"));
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn given_unknown_parent_when_inserting_then_missing_parent() {
        let mut state = StoreState::default();
        let result = state.insert(new_item("child", Some(CorrelationKey::generate())));
        assert!(matches!(result, Err(StoreError::MissingParent(_))));
        assert!(state.is_empty());
    }

    #[test]
    fn given_item_with_child_when_deleting_then_refused() {
        let mut state = StoreState::default();
        let parent = state.insert(new_item("parent", None)).unwrap();
        state
            .insert(new_item("child", Some(parent.correlation)))
            .unwrap();

        let result = state.delete(parent.id, ActorId::default());

        assert!(matches!(result, Err(StoreError::HasChildren(id)) if id == parent.id));
    }

    #[test]
    fn given_rename_when_updating_then_key_index_follows() {
        let mut state = StoreState::default();
        let mut item = state.insert(new_item("old", None)).unwrap();
        item.key = "new".to_string();

        state.update(&item).unwrap();

        assert!(state.get_by_key("old").is_none());
        assert_eq!(state.get_by_key("new").map(|i| i.id), Some(item.id));
    }

    #[test]
    fn given_three_levels_when_collecting_descendants_then_all_returned() {
        let mut state = StoreState::default();
        let root = state.insert(new_item("root", None)).unwrap();
        let mid = state.insert(new_item("mid", Some(root.correlation))).unwrap();
        state.insert(new_item("leaf", Some(mid.correlation))).unwrap();
        state.insert(new_item("other", None)).unwrap();

        let mut keys: Vec<String> = state
            .descendants_of(root.correlation)
            .into_iter()
            .map(|i| i.key)
            .collect();
        keys.sort();

        assert_eq!(keys, vec!["leaf", "mid"]);
    }

    #[test]
    fn given_document_with_duplicate_keys_when_loading_then_rejected() {
        let mut state = StoreState::default();
        let a = state.insert(new_item("same", None)).unwrap();
        let mut doc = state.to_document();
        let mut b = a.clone();
        b.id = ItemId::new(99);
        b.correlation = CorrelationKey::generate();
        doc.items.push(b);

        let result = StoreState::from_document(doc, "test");

        assert!(matches!(result, Err(StoreError::Serialization { .. })));
    }
}

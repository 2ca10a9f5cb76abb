//! Domain entities: dictionary items, translations, languages

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Store-assigned primary identifier used for CRUD addressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(u64);

impl ItemId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Interpret a transport-level id. Zero and negative values mean "no item",
    /// which is how callers ask for a root item on create.
    pub fn from_raw(raw: i64) -> Option<Self> {
        u64::try_from(raw).ok().filter(|v| *v > 0).map(Self)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable correlation token used only for parent/child linkage.
///
/// Survives id reassignment across environments, so parents are referenced by
/// this key and never by [`ItemId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationKey(Uuid);

impl CorrelationKey {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for CorrelationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Language identifier, compared by exact string match (e.g. `en-US`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageId(String);

impl LanguageId {
    pub fn new(iso_code: impl Into<String>) -> Self {
        Self(iso_code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LanguageId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Opaque acting-user identifier, forwarded to the store for audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ActorId(pub i64);

/// A language translations can be attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Language {
    pub id: LanguageId,
    pub name: String,
}

impl Language {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: LanguageId::new(id),
            name: name.into(),
        }
    }
}

/// One `(language, text)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub language: LanguageId,
    pub text: String,
}

impl Translation {
    pub fn new(language: impl Into<LanguageId>, text: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            text: text.into(),
        }
    }
}

impl From<String> for LanguageId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Language → text table owned by exactly one dictionary item.
///
/// At most one entry per language: [`TranslationMap::upsert`] overwrites.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranslationMap(BTreeMap<LanguageId, String>);

impl TranslationMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the text for `language`. Returns the previous text.
    pub fn upsert(&mut self, language: LanguageId, text: impl Into<String>) -> Option<String> {
        self.0.insert(language, text.into())
    }

    pub fn get(&self, language: &LanguageId) -> Option<&str> {
        self.0.get(language).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&LanguageId, &str)> {
        self.0.iter().map(|(k, v)| (k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Translation> for TranslationMap {
    fn from_iter<I: IntoIterator<Item = Translation>>(iter: I) -> Self {
        let mut map = Self::new();
        for t in iter {
            map.upsert(t.language, t.text);
        }
        map
    }
}

/// Node of the dictionary tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryItem {
    pub id: ItemId,
    pub correlation: CorrelationKey,
    /// Globally unique, case-sensitive key
    pub key: String,
    /// `None` marks a root item
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<CorrelationKey>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub translations: TranslationMap,
}

impl DictionaryItem {
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

impl fmt::Display for DictionaryItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (#{})", self.key, self.id)
    }
}

/// Item data handed to the store on creation; identity is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDictionaryItem {
    pub key: String,
    pub parent: Option<CorrelationKey>,
    pub translations: TranslationMap,
}

/// One row of the flattened tree listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub item: DictionaryItem,
    /// 0 for roots, +1 per level
    pub depth: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_non_positive_raw_id_when_converting_then_none() {
        assert_eq!(ItemId::from_raw(0), None);
        assert_eq!(ItemId::from_raw(-5), None);
        assert_eq!(ItemId::from_raw(7), Some(ItemId::new(7)));
    }

    #[test]
    fn given_same_language_twice_when_upserting_then_overwrites() {
        let mut map = TranslationMap::new();
        assert_eq!(map.upsert("en".into(), "A"), None);
        assert_eq!(map.upsert("en".into(), "B"), Some("A".to_string()));

        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&"en".into()), Some("B"));
    }

    #[test]
    fn given_language_ids_differing_in_case_when_upserting_then_kept_apart() {
        let mut map = TranslationMap::new();
        map.upsert("en-US".into(), "color");
        map.upsert("en-us".into(), "colour");
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn given_maps_with_same_entries_when_compared_then_equal() {
        let a: TranslationMap = vec![Translation::new("da", "Hej"), Translation::new("en", "Hi")]
            .into_iter()
            .collect();
        let b: TranslationMap = vec![Translation::new("en", "Hi"), Translation::new("da", "Hej")]
            .into_iter()
            .collect();
        assert_eq!(a, b);
    }
}

//! Arena-backed forest of dictionary items.
//!
//! Built from one flat read of items, it provides the presentation order
//! (pre-order, siblings ascending by key) and the cascade order (post-order)
//! without recursion, so deep or malformed data cannot exhaust the call stack.

use std::collections::HashMap;

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::error::TreeShapeError;
use crate::domain::{CorrelationKey, DictionaryItem, TreeEntry};

/// Node in the arena-based forest.
#[derive(Debug)]
pub struct ForestNode {
    pub item: DictionaryItem,
    /// Index of the parent node, None for roots
    pub parent: Option<Index>,
    /// Child indices, ascending by key
    pub children: Vec<Index>,
}

/// Arena-based forest holding every item of one snapshot.
#[derive(Debug, Default)]
pub struct DictionaryForest {
    arena: Arena<ForestNode>,
    /// Root indices, ascending by key
    roots: Vec<Index>,
}

impl DictionaryForest {
    /// Assemble the whole forest: items without a parent are roots.
    ///
    /// Every parent reference must resolve inside `items`, and every item must
    /// be reachable from a root.
    #[instrument(level = "debug", skip(items), fields(count = items.len()))]
    pub fn build(items: Vec<DictionaryItem>) -> Result<Self, TreeShapeError> {
        Self::assemble(items, |item| item.is_root())
    }

    /// Assemble the subtree below `root`: `descendants` must all hang off
    /// `root`, directly or transitively.
    #[instrument(level = "debug", skip_all, fields(root = %root.key, descendants = descendants.len()))]
    pub fn build_subtree(
        root: DictionaryItem,
        descendants: Vec<DictionaryItem>,
    ) -> Result<Self, TreeShapeError> {
        let root_key = root.correlation;
        let mut items = Vec::with_capacity(descendants.len() + 1);
        items.push(root);
        items.extend(descendants.into_iter().filter(|d| d.correlation != root_key));
        Self::assemble(items, |item| item.correlation == root_key)
    }

    fn assemble(
        items: Vec<DictionaryItem>,
        is_root: impl Fn(&DictionaryItem) -> bool,
    ) -> Result<Self, TreeShapeError> {
        let mut arena = Arena::with_capacity(items.len());
        let mut by_correlation: HashMap<CorrelationKey, Index> = HashMap::with_capacity(items.len());
        let mut roots = Vec::new();

        for item in items {
            let correlation = item.correlation;
            let root = is_root(&item);
            let idx = arena.insert(ForestNode {
                item,
                parent: None,
                children: Vec::new(),
            });
            if by_correlation.insert(correlation, idx).is_some() {
                return Err(TreeShapeError::DuplicateCorrelation(correlation));
            }
            if root {
                roots.push(idx);
            }
        }

        // Link children to parents
        let links: Vec<(Index, CorrelationKey)> = arena
            .iter()
            .filter(|(_, node)| !is_root(&node.item))
            .filter_map(|(idx, node)| node.item.parent.map(|p| (idx, p)))
            .collect();

        for (child_idx, parent_key) in links {
            let parent_idx = match by_correlation.get(&parent_key) {
                Some(&idx) => idx,
                None => {
                    let key = arena
                        .get(child_idx)
                        .map(|n| n.item.key.clone())
                        .unwrap_or_default();
                    return Err(TreeShapeError::DanglingParent {
                        key,
                        parent: parent_key,
                    });
                }
            };
            if let Some(child) = arena.get_mut(child_idx) {
                child.parent = Some(parent_idx);
            }
            if let Some(parent) = arena.get_mut(parent_idx) {
                parent.children.push(child_idx);
            }
        }

        let mut forest = Self { arena, roots };
        forest.sort_siblings();

        let reachable = forest.iter().count();
        if reachable != forest.arena.len() {
            let key = forest
                .unreachable_key()
                .unwrap_or_else(|| "<unknown>".to_string());
            return Err(TreeShapeError::CycleDetected(key));
        }

        Ok(forest)
    }

    /// Presentation order: ascending by key, case-sensitive.
    fn sort_siblings(&mut self) {
        let key_of = |arena: &Arena<ForestNode>, idx: Index| -> String {
            arena.get(idx).map(|n| n.item.key.clone()).unwrap_or_default()
        };

        let mut roots = std::mem::take(&mut self.roots);
        roots.sort_by_cached_key(|&idx| key_of(&self.arena, idx));
        self.roots = roots;

        let indices: Vec<Index> = self.arena.iter().map(|(idx, _)| idx).collect();
        for idx in indices {
            let mut children = match self.arena.get_mut(idx) {
                Some(node) => std::mem::take(&mut node.children),
                None => continue,
            };
            children.sort_by_cached_key(|&c| key_of(&self.arena, c));
            if let Some(node) = self.arena.get_mut(idx) {
                node.children = children;
            }
        }
    }

    fn unreachable_key(&self) -> Option<String> {
        let mut seen = std::collections::HashSet::new();
        for (idx, _, _) in self.iter() {
            seen.insert(idx);
        }
        self.arena
            .iter()
            .find(|(idx, _)| !seen.contains(idx))
            .map(|(_, node)| node.item.key.clone())
    }

    pub fn get_node(&self, idx: Index) -> Option<&ForestNode> {
        self.arena.get(idx)
    }

    pub fn roots(&self) -> &[Index] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Pre-order over all roots, yielding `(index, node, depth)`.
    pub fn iter(&self) -> PreOrderIterator<'_> {
        PreOrderIterator::new(self)
    }

    /// Post-order over all roots: every node after all of its descendants.
    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self)
    }

    /// Flatten into listing rows.
    pub fn into_entries(self) -> Vec<TreeEntry> {
        let order: Vec<(Index, usize)> = self.iter().map(|(idx, _, depth)| (idx, depth)).collect();
        let mut arena = self.arena;
        order
            .into_iter()
            .filter_map(|(idx, depth)| arena.remove(idx).map(|node| TreeEntry { item: node.item, depth }))
            .collect()
    }
}

pub struct PreOrderIterator<'a> {
    forest: &'a DictionaryForest,
    stack: Vec<(Index, usize)>,
}

impl<'a> PreOrderIterator<'a> {
    fn new(forest: &'a DictionaryForest) -> Self {
        // Reverse so the first root is popped first
        let stack = forest.roots.iter().rev().map(|&idx| (idx, 0)).collect();
        Self { forest, stack }
    }
}

impl<'a> Iterator for PreOrderIterator<'a> {
    type Item = (Index, &'a ForestNode, usize);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, depth)) = self.stack.pop() {
            if let Some(node) = self.forest.get_node(current_idx) {
                for &child in node.children.iter().rev() {
                    self.stack.push((child, depth + 1));
                }
                return Some((current_idx, node, depth));
            }
        }
        None
    }
}

pub struct PostOrderIterator<'a> {
    forest: &'a DictionaryForest,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(forest: &'a DictionaryForest) -> Self {
        let stack = forest.roots.iter().rev().map(|&idx| (idx, false)).collect();
        Self { forest, stack }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a ForestNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.forest.get_node(current_idx) {
                if visited {
                    return Some((current_idx, node));
                }
                self.stack.push((current_idx, true));
                for &child in node.children.iter().rev() {
                    self.stack.push((child, false));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ItemId, TranslationMap};
    use chrono::Utc;

    fn item(id: u64, key: &str, parent: Option<&DictionaryItem>) -> DictionaryItem {
        let now = Utc::now();
        DictionaryItem {
            id: ItemId::new(id),
            correlation: CorrelationKey::generate(),
            key: key.to_string(),
            parent: parent.map(|p| p.correlation),
            created_at: now,
            updated_at: now,
            translations: TranslationMap::new(),
        }
    }

    fn keys_with_depth(forest: DictionaryForest) -> Vec<(String, usize)> {
        forest
            .into_entries()
            .into_iter()
            .map(|e| (e.item.key, e.depth))
            .collect()
    }

    #[test]
    fn given_two_roots_with_children_when_listing_then_sorted_preorder() {
        let zebra = item(1, "zebra", None);
        let apple = item(2, "apple", None);
        let child2 = item(3, "child2", Some(&zebra));
        let child1 = item(4, "child1", Some(&apple));

        let forest = DictionaryForest::build(vec![zebra, child2, apple, child1]).unwrap();

        assert_eq!(
            keys_with_depth(forest),
            vec![
                ("apple".to_string(), 0),
                ("child1".to_string(), 1),
                ("zebra".to_string(), 0),
                ("child2".to_string(), 1),
            ]
        );
    }

    #[test]
    fn given_mixed_case_siblings_when_listing_then_uppercase_first() {
        let root = item(1, "root", None);
        let lower = item(2, "beta", Some(&root));
        let upper = item(3, "Zulu", Some(&root));
        let forest = DictionaryForest::build(vec![root, lower, upper]).unwrap();

        let keys: Vec<String> = keys_with_depth(forest).into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["root", "Zulu", "beta"]);
    }

    #[test]
    fn given_deep_chain_when_iterating_then_no_stack_overflow() {
        let mut items = vec![item(1, "k0", None)];
        for i in 1..20_000u64 {
            let parent = items.last().cloned();
            items.push(item(i + 1, &format!("k{i}"), parent.as_ref()));
        }
        let forest = DictionaryForest::build(items).unwrap();
        let max_depth = forest.iter().map(|(_, _, d)| d).max().unwrap();
        assert_eq!(max_depth, 19_999);
        assert_eq!(forest.iter_postorder().count(), 20_000);
    }

    #[test]
    fn given_subtree_when_postorder_then_children_before_parent() {
        let root = item(1, "root", None);
        let a = item(2, "a", Some(&root));
        let a1 = item(3, "a1", Some(&a));
        let b = item(4, "b", Some(&root));

        let forest = DictionaryForest::build_subtree(root, vec![a, a1, b]).unwrap();
        let order: Vec<String> = forest
            .iter_postorder()
            .map(|(_, n)| n.item.key.clone())
            .collect();
        assert_eq!(order, vec!["a1", "a", "b", "root"]);
    }

    #[test]
    fn given_wide_flat_forest_when_building_then_all_roots_sorted() {
        let count = 50_000u64;
        let items: Vec<DictionaryItem> = (0..count)
            .rev()
            .map(|i| item(i + 1, &format!("k{i:05}"), None))
            .collect();

        let forest = DictionaryForest::build(items).unwrap();

        assert_eq!(forest.roots().len(), count as usize);
        let keys: Vec<String> = keys_with_depth(forest).into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys.first().map(String::as_str), Some("k00000"));
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn given_subtree_root_with_outside_parent_when_building_subtree_then_not_linked() {
        let top = item(1, "top", None);
        let mid = item(2, "mid", Some(&top));
        let leaf = item(3, "leaf", Some(&mid));

        let forest = DictionaryForest::build_subtree(mid, vec![leaf]).unwrap();

        assert_eq!(keys_with_depth(forest), vec![("mid".to_string(), 0), ("leaf".to_string(), 1)]);
    }

    #[test]
    fn given_missing_parent_when_building_then_dangling_parent_error() {
        let ghost = item(9, "ghost", None);
        let orphan = item(1, "orphan", Some(&ghost));
        let result = DictionaryForest::build(vec![orphan]);
        assert!(matches!(result, Err(TreeShapeError::DanglingParent { .. })));
    }

    #[test]
    fn given_cycle_when_building_then_cycle_detected() {
        let mut a = item(1, "a", None);
        let mut b = item(2, "b", None);
        a.parent = Some(b.correlation);
        b.parent = Some(a.correlation);
        let root = item(3, "root", None);

        let result = DictionaryForest::build(vec![root, a, b]);
        assert!(matches!(result, Err(TreeShapeError::CycleDetected(_))));
    }
}

//! Rendering of the pre-order listing

use termtree::Tree;

use crate::domain::TreeEntry;

/// Label shown for one item: `key [id]`.
fn label(entry: &TreeEntry) -> String {
    format!("{} [{}]", entry.item.key, entry.item.id)
}

/// Fold a depth-annotated pre-order listing back into drawable trees.
///
/// Keeps a stack holding the open path from a root to the previous entry;
/// an entry at depth `d` closes everything deeper than `d` first.
pub fn build_trees(entries: &[TreeEntry]) -> Vec<Tree<String>> {
    let mut roots = Vec::new();
    let mut open: Vec<Tree<String>> = Vec::new();

    for entry in entries {
        close_to(&mut open, &mut roots, entry.depth);
        open.push(Tree::new(label(entry)));
    }
    close_to(&mut open, &mut roots, 0);
    roots
}

fn close_to(open: &mut Vec<Tree<String>>, roots: &mut Vec<Tree<String>>, depth: usize) {
    while open.len() > depth {
        let Some(done) = open.pop() else { break };
        match open.last_mut() {
            Some(parent) => {
                parent.push(done);
            }
            None => roots.push(done),
        }
    }
}

/// Indented one-line-per-item rendering.
pub fn flat_lines(entries: &[TreeEntry]) -> Vec<String> {
    entries
        .iter()
        .map(|e| format!("{}{}", "  ".repeat(e.depth), label(e)))
        .collect()
}

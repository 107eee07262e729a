use std::collections::HashMap;

use super::node::NodeKey;
use super::ConfigTree;

/// Finds nodes by id. Missing and ambiguous ids both yield `None`.
pub trait NodeLookup {
    fn find_by_id(&self, id: &str) -> Option<NodeKey>;
}

impl NodeLookup for ConfigTree {
    fn find_by_id(&self, id: &str) -> Option<NodeKey> {
        let mut matches = self
            .iter()
            .filter(|(_, node)| node.id().eq_ignore_ascii_case(id))
            .map(|(key, _)| key);
        let first = matches.next()?;
        match matches.next() {
            Some(_) => None,
            None => Some(first),
        }
    }
}

/// Id index built once over a tree for bulk resolution.
///
/// Stale as soon as the tree's structure changes; rebuild after edits.
#[derive(Debug, Clone, Default)]
pub struct IdIndex {
    entries: HashMap<String, Option<NodeKey>>,
}

impl IdIndex {
    pub fn build(tree: &ConfigTree) -> Self {
        let mut entries: HashMap<String, Option<NodeKey>> = HashMap::new();
        for (key, node) in tree.iter() {
            entries
                .entry(node.id().to_ascii_lowercase())
                .and_modify(|slot| *slot = None)
                .or_insert(Some(key));
        }
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ids shared by more than one node.
    pub fn duplicates(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .entries
            .iter()
            .filter(|(_, slot)| slot.is_none())
            .map(|(id, _)| id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }
}

impl NodeLookup for IdIndex {
    fn find_by_id(&self, id: &str) -> Option<NodeKey> {
        self.entries.get(&id.to_ascii_lowercase()).copied().flatten()
    }
}

use std::collections::HashMap;

use crate::entry::Entry;

use super::EntryMapping;

/// A prefix trie of mappings keyed by entry ancestry: class nodes hold
/// member nodes hold local-variable nodes.
///
/// Iteration yields parents strictly before their children, which is the
/// ordering contract file-format codecs rely on: a child node is only ever
/// emitted once its parent path is resolvable.
#[derive(Default)]
pub struct MappingTree {
    roots: HashMap<Entry, MappingNode>,
    delta: MappingDelta,
}

#[derive(Default)]
struct MappingNode {
    mapping: Option<EntryMapping>,
    children: HashMap<Entry, MappingNode>,
}

/// Append-only record of changes since the last [`MappingTree::take_delta`],
/// for synchronization consumers.
#[derive(Clone, Debug, Default)]
pub struct MappingDelta {
    pub added: Vec<Entry>,
    pub changed: Vec<Entry>,
    pub removed: Vec<Entry>,
}

impl MappingDelta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.changed.is_empty() && self.removed.is_empty()
    }
}

impl MappingTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the mapping for an entry, creating trie nodes for its ancestry
    /// as needed. Returns the previous mapping.
    pub fn insert(&mut self, entry: &Entry, mapping: EntryMapping) -> Option<EntryMapping> {
        let ancestry = entry.ancestry();
        let (root, rest) = ancestry.split_first().expect("ancestry is never empty");
        let mut node = self.roots.entry(root.clone()).or_default();
        for step in rest {
            node = node.children.entry(step.clone()).or_default();
        }

        let previous = node.mapping.replace(mapping);
        match previous {
            None => self.delta.added.push(entry.clone()),
            Some(_) => self.delta.changed.push(entry.clone()),
        }

        previous
    }

    /// Remove an entry's mapping. Empty nodes are kept; they hold the
    /// subtree structure for children that may still be mapped.
    pub fn remove(&mut self, entry: &Entry) -> Option<EntryMapping> {
        let node = self.node_mut(entry)?;
        let previous = node.mapping.take();
        if previous.is_some() {
            self.delta.removed.push(entry.clone());
        }

        previous
    }

    pub fn get(&self, entry: &Entry) -> Option<&EntryMapping> {
        self.node(entry)?.mapping.as_ref()
    }

    pub fn contains(&self, entry: &Entry) -> bool {
        self.get(entry).is_some()
    }

    /// All mapped entries, parents before children.
    pub fn iter(&self) -> impl Iterator<Item = (Entry, &EntryMapping)> {
        let mut out = Vec::new();
        for (entry, node) in &self.roots {
            collect(entry, node, &mut out);
        }

        out.into_iter()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Drain the accumulated change set.
    pub fn take_delta(&mut self) -> MappingDelta {
        std::mem::take(&mut self.delta)
    }

    fn node(&self, entry: &Entry) -> Option<&MappingNode> {
        let ancestry = entry.ancestry();
        let (root, rest) = ancestry.split_first()?;
        let mut node = self.roots.get(root)?;
        for step in rest {
            node = node.children.get(step)?;
        }

        Some(node)
    }

    fn node_mut(&mut self, entry: &Entry) -> Option<&mut MappingNode> {
        let ancestry = entry.ancestry();
        let (root, rest) = ancestry.split_first()?;
        let mut node = self.roots.get_mut(root)?;
        for step in rest {
            node = node.children.get_mut(step)?;
        }

        Some(node)
    }
}

fn collect<'a>(entry: &Entry, node: &'a MappingNode, out: &mut Vec<(Entry, &'a EntryMapping)>) {
    if let Some(mapping) = &node.mapping {
        out.push((entry.clone(), mapping));
    }

    for (child, child_node) in &node.children {
        collect(child, child_node, out);
    }
}

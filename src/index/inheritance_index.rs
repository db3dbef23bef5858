use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::entry::ClassEntry;

use super::entry_index::ClassDefinition;

/// Directed class graph built purely from declared superclass and interface
/// edges. Member resolution happens in the resolver, not here.
#[derive(Default)]
pub struct InheritanceIndex {
    parents: HashMap<Arc<ClassEntry>, Vec<Arc<ClassEntry>>>,
    children: HashMap<Arc<ClassEntry>, Vec<Arc<ClassEntry>>>,
}

impl InheritanceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index_class(&mut self, entry: &Arc<ClassEntry>, definition: &ClassDefinition) {
        let mut parents = Vec::new();
        if let Some(super_class) = &definition.super_class {
            parents.push(super_class.clone());
        }
        parents.extend(definition.interfaces.iter().cloned());

        for parent in &parents {
            if parent == entry {
                continue;
            }
            self.children.entry(parent.clone()).or_default().push(entry.clone());
        }

        self.parents.entry(entry.clone()).or_default().extend(parents);
    }

    /// Declared superclass and interfaces, in declaration order.
    pub fn parents(&self, entry: &ClassEntry) -> &[Arc<ClassEntry>] {
        self.parents.get(entry).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Direct subclasses and implementors.
    pub fn children(&self, entry: &ClassEntry) -> &[Arc<ClassEntry>] {
        self.children.get(entry).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Transitive closure over parent edges, unordered.
    pub fn ancestors(&self, entry: &ClassEntry) -> HashSet<Arc<ClassEntry>> {
        let mut ancestors = HashSet::new();
        let mut stack: Vec<Arc<ClassEntry>> = self.parents(entry).to_vec();
        while let Some(parent) = stack.pop() {
            if ancestors.insert(parent.clone()) {
                stack.extend(self.parents(&parent).iter().cloned());
            }
        }

        ancestors
    }

    /// Transitive closure over child edges, unordered.
    pub fn descendants(&self, entry: &ClassEntry) -> HashSet<Arc<ClassEntry>> {
        let mut descendants = HashSet::new();
        let mut stack: Vec<Arc<ClassEntry>> = self.children(entry).to_vec();
        while let Some(child) = stack.pop() {
            if descendants.insert(child.clone()) {
                stack.extend(self.children(&child).iter().cloned());
            }
        }

        descendants
    }

    /// Whether any indexed class extends or implements this one.
    pub fn is_parent(&self, entry: &ClassEntry) -> bool {
        !self.children(entry).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::AccessFlags;

    fn class(name: &str) -> Arc<ClassEntry> {
        Arc::new(ClassEntry::new(None, name))
    }

    fn definition(
        super_class: Option<Arc<ClassEntry>>,
        interfaces: Vec<Arc<ClassEntry>>,
    ) -> ClassDefinition {
        ClassDefinition {
            access: AccessFlags::PUBLIC,
            signature: None,
            super_class,
            interfaces,
        }
    }

    #[test]
    fn ancestors_and_descendants_are_transitive() {
        let (a, b, c, iface) = (class("a"), class("b"), class("c"), class("i"));
        let mut index = InheritanceIndex::new();
        index.index_class(&b, &definition(Some(a.clone()), vec![iface.clone()]));
        index.index_class(&c, &definition(Some(b.clone()), vec![]));

        let ancestors = index.ancestors(&c);
        assert!(ancestors.contains(&a));
        assert!(ancestors.contains(&b));
        assert!(ancestors.contains(&iface));

        let descendants = index.descendants(&a);
        assert!(descendants.contains(&b));
        assert!(descendants.contains(&c));

        assert!(index.is_parent(&a));
        assert!(!index.is_parent(&c));
    }
}

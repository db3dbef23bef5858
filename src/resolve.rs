//! Maps symbol references to the declarations they must share a rename with.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use crate::entry::{AccessFlags, Entry, FieldEntry, MethodEntry};
use crate::index::{BridgeMethodIndex, EntryIndex, InheritanceIndex};

/// How far up the inheritance tree a member reference is resolved.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ResolutionStrategy {
    /// The nearest visible declaration. Used to canonicalize references.
    Closest,
    /// The furthest visible declaration; falls back to the closest declared
    /// one. Used when a rename must land on the authoritative entry.
    Root,
}

/// Resolves member references against the inheritance graph, following
/// bridge links, and computes rename-equivalence sets.
pub struct EntryResolver<'a> {
    entries: &'a EntryIndex,
    inheritance: &'a InheritanceIndex,
    bridges: &'a BridgeMethodIndex,
}

impl<'a> EntryResolver<'a> {
    pub fn new(
        entries: &'a EntryIndex,
        inheritance: &'a InheritanceIndex,
        bridges: &'a BridgeMethodIndex,
    ) -> Self {
        EntryResolver {
            entries,
            inheritance,
            bridges,
        }
    }

    // -- Reference resolution --

    /// Resolve an entry to the declaration(s) it refers to under the given
    /// strategy. Classes resolve to themselves; members walk the
    /// inheritance tree; nested entries (locals) follow their owning
    /// method. Unresolvable entries come back unchanged — symbols outside
    /// the jar are an expected case, not an error.
    pub fn resolve_entry(&self, entry: &Entry, strategy: ResolutionStrategy) -> Vec<Entry> {
        let Some(class_child) = entry.class_child() else {
            return vec![entry.clone()];
        };

        let access = self.entries.entry_access(&class_child);

        // If we're looking for the closest declaration and this entry is
        // one, we're done looking.
        if strategy == ResolutionStrategy::Closest && access.is_some() {
            return vec![entry.clone()];
        }

        // Private and static members are never inherited.
        if access.map_or(true, |a| !a.is_private() && !a.is_static()) {
            let mut seen = HashSet::new();
            let resolved = self.resolve_child_entry(&class_child, strategy, &mut seen);
            if !resolved.is_empty() {
                return resolved
                    .iter()
                    .map(|r| entry.replace_ancestor(&class_child, r))
                    .collect();
            }
        }

        vec![entry.clone()]
    }

    /// Like [`Self::resolve_entry`], returning the first declaration.
    pub fn resolve_first_entry(&self, entry: &Entry, strategy: ResolutionStrategy) -> Entry {
        self.resolve_entry(entry, strategy)
            .into_iter()
            .next()
            .unwrap_or_else(|| entry.clone())
    }

    pub fn resolve_first_method(&self, method: &Arc<MethodEntry>) -> Arc<MethodEntry> {
        match self.resolve_first_entry(&Entry::Method(method.clone()), ResolutionStrategy::Closest)
        {
            Entry::Method(resolved) => resolved,
            _ => method.clone(),
        }
    }

    pub fn resolve_first_field(&self, field: &Arc<FieldEntry>) -> Arc<FieldEntry> {
        match self.resolve_first_entry(&Entry::Field(field.clone()), ResolutionStrategy::Closest) {
            Entry::Field(resolved) => resolved,
            _ => field.clone(),
        }
    }

    fn resolve_child_entry(
        &self,
        child: &Entry,
        strategy: ResolutionStrategy,
        seen: &mut HashSet<Entry>,
    ) -> Vec<Entry> {
        // A specialized method resolves through the bridge that wraps it;
        // bridges chain, so this recurses.
        if let Entry::Method(method) = child {
            if let Some(bridge) = self.bridges.bridge_from_specialized(method) {
                if bridge.parent() == method.parent()
                    && seen.insert(Entry::Method(bridge.clone()))
                {
                    let resolved =
                        self.resolve_child_entry(&Entry::Method(bridge.clone()), strategy, seen);
                    if resolved.is_empty() {
                        return vec![Entry::Method(bridge.clone())];
                    }

                    return resolved;
                }
            }
        }

        let owner = child.containing_class();
        let mut resolved = Vec::new();
        for parent_class in self.inheritance.parents(&owner) {
            let candidate = child.with_class_parent(parent_class);
            if !seen.insert(candidate.clone()) {
                continue;
            }

            let from_parent = match strategy {
                ResolutionStrategy::Root => self.resolve_root(&candidate, seen),
                ResolutionStrategy::Closest => self.resolve_closest(&candidate, seen),
            };
            for entry in from_parent {
                if !resolved.contains(&entry) {
                    resolved.push(entry);
                }
            }
        }

        resolved
    }

    /// Walk all the way up before settling for this declaration.
    fn resolve_root(&self, entry: &Entry, seen: &mut HashSet<Entry>) -> Vec<Entry> {
        let above = self.resolve_child_entry(entry, ResolutionStrategy::Root, seen);
        if above.is_empty() {
            if let Some(access) = self.entries.entry_access(entry) {
                if !access.is_private() {
                    return vec![self.interned(entry)];
                }
            }
        }

        above
    }

    /// Settle for this declaration before looking further up.
    fn resolve_closest(&self, entry: &Entry, seen: &mut HashSet<Entry>) -> Vec<Entry> {
        if let Some(access) = self.entries.entry_access(entry) {
            if !access.is_private() {
                return vec![self.interned(entry)];
            }
        }

        self.resolve_child_entry(entry, ResolutionStrategy::Closest, seen)
    }

    /// Swap a resolution probe for its canonical interned entry.
    fn interned(&self, entry: &Entry) -> Entry {
        match entry {
            Entry::Field(f) => self
                .entries
                .declared_field(f.parent(), f.obf_name(), f.desc())
                .map(Entry::Field)
                .unwrap_or_else(|| entry.clone()),
            Entry::Method(m) => self
                .entries
                .declared_method(m.parent(), m.obf_name(), m.desc())
                .map(Entry::Method)
                .unwrap_or_else(|| entry.clone()),
            _ => entry.clone(),
        }
    }

    // -- Equivalence sets --

    /// Every method that must be renamed together with `seed`: overrides and
    /// overridden declarations across the class hierarchy, interface
    /// declarations implemented along the way, and bridge partners, followed
    /// transitively in both directions.
    ///
    /// The membership predicate (non-constructor, non-private, non-static)
    /// is applied identically when collecting and when expanding, which
    /// keeps the relation symmetric: a `final` override still joins the set
    /// of the method it overrides.
    pub fn resolve_equivalent_methods(&self, seed: &Arc<MethodEntry>) -> Vec<Arc<MethodEntry>> {
        let Some(access) = self.entries.method_access(seed) else {
            return vec![seed.clone()];
        };
        if !can_join_equivalence(seed, access) {
            return vec![seed.clone()];
        }

        let mut result = Vec::new();
        let mut visited: HashSet<Arc<MethodEntry>> = HashSet::new();
        let mut queue: VecDeque<Arc<MethodEntry>> = VecDeque::from([seed.clone()]);

        while let Some(method) = queue.pop_front() {
            if !visited.insert(method.clone()) {
                continue;
            }

            let Some(access) = self.entries.method_access(&method) else {
                continue;
            };
            if !can_join_equivalence(&method, access) {
                continue;
            }

            result.push(method.clone());

            // Declarations of the same signature anywhere up or down the
            // hierarchy, hopping over classes that don't declare it.
            let owner = method.parent();
            let related = self
                .inheritance
                .ancestors(owner)
                .into_iter()
                .chain(self.inheritance.descendants(owner));
            for class in related {
                if let Some(other) =
                    self.entries
                        .declared_method(&class, method.obf_name(), method.desc())
                {
                    queue.push_back(other);
                }
            }

            // Bridge partners, both directions; chains recurse through the
            // queue.
            if let Some(bridge) = self.bridges.bridge_from_specialized(&method) {
                queue.push_back(bridge.clone());
            }

            if let Some(specialized) = self.bridges.specialized_from_bridge(&method) {
                queue.push_back(specialized.clone());
            }
        }

        result
    }

    /// Lift method equivalence to an arbitrary nested entry: a parameter's
    /// equivalence set is its owner's set with the parameter re-attached to
    /// each member.
    pub fn resolve_equivalent_entries(&self, entry: &Entry) -> Vec<Entry> {
        let Some(method) = entry.method_ancestor() else {
            return vec![entry.clone()];
        };
        if !self.entries.has_method(&method) {
            return vec![entry.clone()];
        }

        let target = Entry::Method(method.clone());
        self.resolve_equivalent_methods(&method)
            .into_iter()
            .map(|equivalent| entry.replace_ancestor(&target, &Entry::Method(equivalent)))
            .collect()
    }
}

fn can_join_equivalence(method: &MethodEntry, access: AccessFlags) -> bool {
    !method.is_constructor() && !access.is_private() && !access.is_static()
}

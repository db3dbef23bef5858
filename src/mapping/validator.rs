use std::sync::Arc;

use crate::entry::{ClassEntry, Entry, LocalVariableEntry, MethodEntry};
use crate::index::JarIndex;
use crate::validation::{
    validate_class_name, validate_identifier, Message, ValidationContext,
};

use super::translator::Translator;
use super::tree::MappingTree;

/// Checks a proposed rename against the index before it may commit.
///
/// Every comparison uses the sibling's *current visible name* — the
/// deobfuscated name when mapped, the obfuscated one otherwise — in both
/// the uniqueness and the shadowing paths, so renamed ancestors behave
/// consistently across the two checks.
pub struct MappingValidator<'a> {
    index: &'a JarIndex,
    mappings: &'a MappingTree,
}

impl<'a> MappingValidator<'a> {
    pub fn new(index: &'a JarIndex, mappings: &'a MappingTree) -> Self {
        MappingValidator { index, mappings }
    }

    /// Validate renaming `entry` to `name`. Renaming one member of an
    /// override/bridge/interface set is really renaming all of them, so
    /// every member of the equivalence set is validated independently.
    pub fn validate_rename(&self, vc: &mut ValidationContext<'_>, entry: &Entry, name: &str) {
        let resolver = self.index.resolver();
        for equivalent in resolver.resolve_equivalent_entries(entry) {
            self.validate_single(vc, &equivalent, name);
        }
    }

    fn validate_single(&self, vc: &mut ValidationContext<'_>, entry: &Entry, name: &str) {
        match entry {
            Entry::Class(class) => validate_class_name(vc, name, class.is_inner_class()),
            _ => validate_identifier(vc, name),
        }

        self.validate_unique(vc, entry, name);
    }

    /// The name must not collide with any other declared sibling in the
    /// same class, any ancestor member visible enough to conflict, or —
    /// for classes — any other class resolving to the same full name.
    fn validate_unique(&self, vc: &mut ValidationContext<'_>, entry: &Entry, name: &str) {
        let containing = entry.containing_class();

        if let Entry::LocalVariable(variable) = entry {
            self.validate_local_uniqueness(vc, variable.parent().clone(), variable, name);
            return;
        }

        if let Entry::Class(class) = entry {
            self.validate_class_unique(vc, class, name);
            return;
        }

        let mut siblings: Vec<Entry> = self.index.children_of(&containing).to_vec();
        for ancestor in self.index.inheritance_index().ancestors(&containing) {
            siblings.extend(self.index.children_of(&ancestor).iter().cloned());
        }

        if !self.is_unique(entry, &siblings, name) {
            self.raise_conflict(vc, entry, name, false);
        } else if let Some(shadowed) = self.shadowed_entry(entry, &siblings, name) {
            self.raise_conflict(vc, &shadowed, name, true);
        }
    }

    /// A local variable's name must be free among the other declared locals
    /// of its method.
    fn validate_local_uniqueness(
        &self,
        vc: &mut ValidationContext<'_>,
        method: Arc<MethodEntry>,
        variable: &Arc<LocalVariableEntry>,
        name: &str,
    ) {
        let translator = self.translator();
        for other in self.index.entry_index().local_variables_of(&method) {
            if other.index() == variable.index() {
                continue;
            }

            let visible = translator.translate(&Entry::LocalVariable(other));
            if visible == name {
                vc.raise(
                    Message::NonUniqueNameClass,
                    &[name, &method.to_string()],
                );
                return;
            }
        }
    }

    /// Classes collide when another class's visible full name equals the
    /// name this rename would produce. Covers package siblings (mapped or
    /// still obfuscated) and inner-class siblings in one comparison.
    fn validate_class_unique(
        &self,
        vc: &mut ValidationContext<'_>,
        class: &Arc<ClassEntry>,
        name: &str,
    ) {
        let translator = self.translator();
        let candidate_full = match class.outer_class() {
            Some(outer) => format!("{}${}", translator.class_full_name(outer), name),
            None => name.to_string(),
        };

        for other in self.index.entry_index().classes() {
            if other.as_ref() == class.as_ref() {
                continue;
            }

            if translator.class_full_name(&other) == candidate_full {
                self.raise_conflict(vc, &Entry::Class(class.clone()), name, false);
                return;
            }
        }
    }

    fn is_unique(&self, entry: &Entry, siblings: &[Entry], name: &str) -> bool {
        let translator = self.translator();
        for sibling in siblings {
            if sibling == entry {
                continue;
            }

            if !entry.can_conflict_with(sibling) {
                continue;
            }

            if translator.translate(sibling) != name {
                continue;
            }

            // Methods from different classes never accidentally override
            // when both are static or both are private.
            if matches!(entry, Entry::Method(_)) && entry.parent() != sibling.parent() {
                let entry_access = self.index.entry_index().entry_access(entry);
                let sibling_access = self.index.entry_index().entry_access(sibling);
                if let (Some(entry_access), Some(sibling_access)) = (entry_access, sibling_access)
                {
                    if (entry_access.is_static() && sibling_access.is_static())
                        || (entry_access.is_private() && sibling_access.is_private())
                    {
                        continue;
                    }
                }
            }

            return false;
        }

        true
    }

    /// A non-blocking collision: same name as a non-private ancestor member
    /// with compatible static-ness. The new name hides the ancestor's
    /// member rather than breaking compilation.
    fn shadowed_entry(&self, entry: &Entry, siblings: &[Entry], name: &str) -> Option<Entry> {
        let translator = self.translator();
        let ancestors = self
            .index
            .inheritance_index()
            .ancestors(&entry.containing_class());
        let entry_static = self
            .index
            .entry_index()
            .entry_access(entry)
            .map(|a| a.is_static())
            .unwrap_or(false);

        for sibling in siblings {
            if !entry.can_shadow(sibling) {
                continue;
            }

            if !ancestors.contains(&sibling.containing_class()) {
                continue;
            }

            let Some(sibling_access) = self.index.entry_index().entry_access(sibling) else {
                continue;
            };
            if sibling_access.is_private() || sibling_access.is_static() != entry_static {
                continue;
            }

            if translator.translate(sibling) == name {
                return Some(sibling.clone());
            }
        }

        None
    }

    fn raise_conflict(
        &self,
        vc: &mut ValidationContext<'_>,
        entry: &Entry,
        name: &str,
        shadow: bool,
    ) {
        match entry.parent() {
            Some(parent) => {
                let parent_name = match &parent {
                    Entry::Class(class) => self.translator().class_full_name(class),
                    other => other.to_string(),
                };
                let message = if shadow {
                    Message::ShadowedNameClass
                } else {
                    Message::NonUniqueNameClass
                };
                vc.raise(message, &[name, &parent_name]);
            }
            None => {
                let message = if shadow {
                    Message::ShadowedName
                } else {
                    Message::NonUniqueName
                };
                vc.raise(message, &[name]);
            }
        }
    }

    fn translator(&self) -> Translator<'_> {
        Translator::new(self.index, self.mappings)
    }
}

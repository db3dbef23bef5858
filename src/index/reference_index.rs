use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::descriptor::{MethodDescriptor, TypeDescriptor};
use crate::entry::{ClassEntry, FieldEntry, MethodEntry};
use crate::resolve::EntryResolver;

use super::entry_index::EntryIndex;

/// How a use-site reaches its target. Needed to apply Java's
/// protected-access rule: protected instance access is only package-free
/// when the receiver's type is assignable to the accessing class.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum ReferenceTargetType {
    /// No instance receiver is involved (e.g. a `super` call).
    None,
    /// Static member access.
    Static,
    /// Instance access through a receiver of the given compile-time type.
    ClassType(Arc<ClassEntry>),
    /// Constructor invocation on `this` (`this(..)` / `super(..)`).
    UninitializedThis,
    /// Constructor invocation on a freshly allocated object.
    Uninitialized,
}

/// A single use-site: `context` uses `entry`.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct EntryReference<E, C> {
    pub entry: E,
    pub context: C,
    pub target_type: ReferenceTargetType,
}

impl<E, C> EntryReference<E, C> {
    pub fn new(entry: E, context: C, target_type: ReferenceTargetType) -> Self {
        EntryReference {
            entry,
            context,
            target_type,
        }
    }
}

pub type MethodReference = EntryReference<Arc<MethodEntry>, Arc<MethodEntry>>;
pub type ClassReference = EntryReference<Arc<ClassEntry>, Arc<MethodEntry>>;
pub type FieldReference = EntryReference<Arc<FieldEntry>, Arc<MethodEntry>>;
pub type FieldTypeReference = EntryReference<Arc<ClassEntry>, Arc<FieldEntry>>;
pub type MethodTypeReference = EntryReference<Arc<ClassEntry>, Arc<MethodEntry>>;

/// Per-entry collections of use-sites.
///
/// During the scan, references are keyed by the syntactically nearest entry
/// the constant pool names, which may be a non-existent "override" declared
/// only in an ancestor. [`ReferenceIndex::process`] remaps everything onto
/// the resolved declaring entries, so "who calls X" is answered against the
/// class that actually declares X.
#[derive(Default)]
pub struct ReferenceIndex {
    method_references: HashMap<Arc<MethodEntry>, HashSet<Arc<MethodEntry>>>,
    references_to_methods: HashMap<Arc<MethodEntry>, HashSet<MethodReference>>,
    references_to_classes: HashMap<Arc<ClassEntry>, HashSet<ClassReference>>,
    references_to_fields: HashMap<Arc<FieldEntry>, HashSet<FieldReference>>,
    field_type_references: HashMap<Arc<ClassEntry>, HashSet<FieldTypeReference>>,
    method_type_references: HashMap<Arc<ClassEntry>, HashSet<MethodTypeReference>>,
}

impl ReferenceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Declaration-time indexing (descriptor type references) --

    pub fn index_field(&mut self, entries: &EntryIndex, field: &Arc<FieldEntry>) {
        self.index_field_type(entries, field, field.desc());
    }

    fn index_field_type(
        &mut self,
        entries: &EntryIndex,
        field: &Arc<FieldEntry>,
        desc: &TypeDescriptor,
    ) {
        if let Some(class_name) = desc.object_name() {
            let class = entries.get_class(class_name);
            self.field_type_references
                .entry(class.clone())
                .or_default()
                .insert(EntryReference::new(
                    class,
                    field.clone(),
                    ReferenceTargetType::None,
                ));
        } else if let Some(element) = desc.array_element() {
            self.index_field_type(entries, field, element);
        }
    }

    pub fn index_method(&mut self, entries: &EntryIndex, method: &Arc<MethodEntry>) {
        self.index_method_descriptor(entries, method, method.desc());
    }

    pub fn index_method_descriptor(
        &mut self,
        entries: &EntryIndex,
        method: &Arc<MethodEntry>,
        desc: &MethodDescriptor,
    ) {
        for arg in &desc.args {
            self.index_method_type(entries, method, arg);
        }

        self.index_method_type(entries, method, &desc.ret);
    }

    fn index_method_type(
        &mut self,
        entries: &EntryIndex,
        method: &Arc<MethodEntry>,
        desc: &TypeDescriptor,
    ) {
        if let Some(class_name) = desc.object_name() {
            let class = entries.get_class(class_name);
            self.method_type_references
                .entry(class.clone())
                .or_default()
                .insert(EntryReference::new(
                    class,
                    method.clone(),
                    ReferenceTargetType::None,
                ));
        } else if let Some(element) = desc.array_element() {
            self.index_method_type(entries, method, element);
        }
    }

    // -- Use-site indexing --

    pub fn index_method_reference(
        &mut self,
        caller: &Arc<MethodEntry>,
        referenced: &Arc<MethodEntry>,
        target_type: ReferenceTargetType,
    ) {
        self.references_to_methods
            .entry(referenced.clone())
            .or_default()
            .insert(EntryReference::new(
                referenced.clone(),
                caller.clone(),
                target_type.clone(),
            ));
        self.method_references
            .entry(caller.clone())
            .or_default()
            .insert(referenced.clone());

        // Constructor calls are the use-sites of the class itself.
        if referenced.is_constructor() {
            let class = referenced.parent().clone();
            self.references_to_classes
                .entry(class.clone())
                .or_default()
                .insert(EntryReference::new(class, caller.clone(), target_type));
        }
    }

    pub fn index_field_reference(
        &mut self,
        caller: &Arc<MethodEntry>,
        referenced: &Arc<FieldEntry>,
        target_type: ReferenceTargetType,
    ) {
        self.references_to_fields
            .entry(referenced.clone())
            .or_default()
            .insert(EntryReference::new(
                referenced.clone(),
                caller.clone(),
                target_type,
            ));
    }

    // -- Post-pass --

    /// Remap every reference onto the entry that actually declares its
    /// target, using closest-declaration resolution.
    pub fn process(&mut self, resolver: &EntryResolver<'_>) {
        let method_references = std::mem::take(&mut self.method_references);
        for (caller, targets) in method_references {
            let caller = resolver.resolve_first_method(&caller);
            let resolved = self.method_references.entry(caller).or_default();
            for target in targets {
                resolved.insert(resolver.resolve_first_method(&target));
            }
        }

        let to_methods = std::mem::take(&mut self.references_to_methods);
        for (_, refs) in to_methods {
            for r in refs {
                let entry = resolver.resolve_first_method(&r.entry);
                self.references_to_methods
                    .entry(entry.clone())
                    .or_default()
                    .insert(EntryReference::new(entry, r.context, r.target_type));
            }
        }

        let to_fields = std::mem::take(&mut self.references_to_fields);
        for (_, refs) in to_fields {
            for r in refs {
                let entry = resolver.resolve_first_field(&r.entry);
                self.references_to_fields
                    .entry(entry.clone())
                    .or_default()
                    .insert(EntryReference::new(entry, r.context, r.target_type));
            }
        }
    }

    // -- Queries --

    pub fn references_to_method(&self, entry: &MethodEntry) -> Vec<&MethodReference> {
        self.references_to_methods
            .get(entry)
            .map(|refs| refs.iter().collect())
            .unwrap_or_default()
    }

    pub fn references_to_class(&self, entry: &ClassEntry) -> Vec<&ClassReference> {
        self.references_to_classes
            .get(entry)
            .map(|refs| refs.iter().collect())
            .unwrap_or_default()
    }

    pub fn references_to_field(&self, entry: &FieldEntry) -> Vec<&FieldReference> {
        self.references_to_fields
            .get(entry)
            .map(|refs| refs.iter().collect())
            .unwrap_or_default()
    }

    pub fn field_type_references_to_class(&self, entry: &ClassEntry) -> Vec<&FieldTypeReference> {
        self.field_type_references
            .get(entry)
            .map(|refs| refs.iter().collect())
            .unwrap_or_default()
    }

    pub fn method_type_references_to_class(&self, entry: &ClassEntry) -> Vec<&MethodTypeReference> {
        self.method_type_references
            .get(entry)
            .map(|refs| refs.iter().collect())
            .unwrap_or_default()
    }

    pub fn methods_referenced_by(&self, caller: &MethodEntry) -> Vec<&Arc<MethodEntry>> {
        self.method_references
            .get(caller)
            .map(|refs| refs.iter().collect())
            .unwrap_or_default()
    }
}

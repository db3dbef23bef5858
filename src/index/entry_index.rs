use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::descriptor::{MethodDescriptor, Signature, TypeDescriptor};
use crate::entry::{AccessFlags, ClassEntry, Entry, FieldEntry, LocalVariableEntry, MethodEntry};

/// Definition of a class as declared in the scanned jar.
#[derive(Clone, Debug)]
pub struct ClassDefinition {
    pub access: AccessFlags,
    pub signature: Option<Signature>,
    /// `None` only for the root object type.
    pub super_class: Option<Arc<ClassEntry>>,
    pub interfaces: Vec<Arc<ClassEntry>>,
}

/// Definition of a declared field or method.
#[derive(Clone, Debug)]
pub struct MemberDefinition {
    pub access: AccessFlags,
    pub signature: Option<Signature>,
}

/// The interning registry: the canonical source of truth for "this symbol
/// exists".
///
/// Identity-equal lookups always return clones of the same `Arc`; looking up
/// a symbol nobody declared interns a bare, definition-less entry, which is
/// how forward references and symbols outside the jar are represented.
///
/// The intern maps are behind `RwLock`s because lazy interning happens at
/// query time from read-only consumers (translating against library classes
/// is an expected case); the definition side tables are written only by the
/// scan itself.
#[derive(Default)]
pub struct EntryIndex {
    classes: RwLock<HashMap<String, Arc<ClassEntry>>>,
    fields: RwLock<HashMap<(Arc<ClassEntry>, String, TypeDescriptor), Arc<FieldEntry>>>,
    methods: RwLock<HashMap<(Arc<ClassEntry>, String, MethodDescriptor), Arc<MethodEntry>>>,
    locals: RwLock<HashMap<(Arc<MethodEntry>, u16), Arc<LocalVariableEntry>>>,

    class_defs: HashMap<Arc<ClassEntry>, ClassDefinition>,
    field_defs: HashMap<Arc<FieldEntry>, MemberDefinition>,
    method_defs: HashMap<Arc<MethodEntry>, MemberDefinition>,
    local_defs: HashMap<Arc<LocalVariableEntry>, TypeDescriptor>,
}

impl EntryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Interning lookups --

    /// The canonical entry for a full internal class name, interning the
    /// whole outer-class chain on first sight.
    pub fn get_class(&self, name: &str) -> Arc<ClassEntry> {
        if let Some(found) = self.classes.read().unwrap().get(name) {
            return found.clone();
        }

        let mut parent: Option<Arc<ClassEntry>> = None;
        let mut entry: Option<Arc<ClassEntry>> = None;
        for (prefix, segment) in split_inner_chain(name) {
            let interned = self.intern_class(prefix, parent.take(), segment);
            parent = Some(interned.clone());
            entry = Some(interned);
        }

        entry.expect("class names have at least one segment")
    }

    fn intern_class(
        &self,
        full_name: &str,
        parent: Option<Arc<ClassEntry>>,
        segment: &str,
    ) -> Arc<ClassEntry> {
        if let Some(found) = self.classes.read().unwrap().get(full_name) {
            return found.clone();
        }

        let mut map = self.classes.write().unwrap();
        map.entry(full_name.to_string())
            .or_insert_with(|| Arc::new(ClassEntry::new(parent, segment)))
            .clone()
    }

    pub fn get_field(
        &self,
        parent: &Arc<ClassEntry>,
        name: &str,
        desc: &TypeDescriptor,
    ) -> Arc<FieldEntry> {
        let key = (parent.clone(), name.to_string(), desc.clone());
        if let Some(found) = self.fields.read().unwrap().get(&key) {
            return found.clone();
        }

        let mut map = self.fields.write().unwrap();
        map.entry(key)
            .or_insert_with(|| Arc::new(FieldEntry::new(parent.clone(), name, desc.clone())))
            .clone()
    }

    pub fn get_method(
        &self,
        parent: &Arc<ClassEntry>,
        name: &str,
        desc: &MethodDescriptor,
    ) -> Arc<MethodEntry> {
        let key = (parent.clone(), name.to_string(), desc.clone());
        if let Some(found) = self.methods.read().unwrap().get(&key) {
            return found.clone();
        }

        let mut map = self.methods.write().unwrap();
        map.entry(key)
            .or_insert_with(|| Arc::new(MethodEntry::new(parent.clone(), name, desc.clone())))
            .clone()
    }

    /// Local variables are identified by slot index; the name and parameter
    /// flag recorded at first interning stick.
    pub fn get_local_variable(
        &self,
        parent: &Arc<MethodEntry>,
        index: u16,
        name: &str,
        parameter: bool,
    ) -> Arc<LocalVariableEntry> {
        let key = (parent.clone(), index);
        if let Some(found) = self.locals.read().unwrap().get(&key) {
            return found.clone();
        }

        let mut map = self.locals.write().unwrap();
        map.entry(key)
            .or_insert_with(|| {
                Arc::new(LocalVariableEntry::new(parent.clone(), index, name, parameter))
            })
            .clone()
    }

    // -- Declaration registration --

    pub fn index_class(&mut self, entry: &Arc<ClassEntry>, definition: ClassDefinition) {
        self.class_defs.insert(entry.clone(), definition);
    }

    pub fn index_field(&mut self, entry: &Arc<FieldEntry>, definition: MemberDefinition) {
        self.field_defs.insert(entry.clone(), definition);
    }

    pub fn index_method(&mut self, entry: &Arc<MethodEntry>, definition: MemberDefinition) {
        self.method_defs.insert(entry.clone(), definition);
    }

    pub fn index_local_variable(&mut self, entry: &Arc<LocalVariableEntry>, desc: TypeDescriptor) {
        self.local_defs.insert(entry.clone(), desc);
    }

    // -- Declared-in-jar queries --

    pub fn has_class(&self, entry: &ClassEntry) -> bool {
        self.class_defs.contains_key(entry)
    }

    pub fn has_field(&self, entry: &FieldEntry) -> bool {
        self.field_defs.contains_key(entry)
    }

    pub fn has_method(&self, entry: &MethodEntry) -> bool {
        self.method_defs.contains_key(entry)
    }

    /// Whether the entry (or for locals, its owning method) was declared in
    /// the scanned jar rather than merely referenced.
    pub fn is_in_jar(&self, entry: &Entry) -> bool {
        match entry {
            Entry::Class(c) => self.has_class(c),
            Entry::Field(f) => self.has_field(f),
            Entry::Method(m) => self.has_method(m),
            Entry::LocalVariable(v) => self.has_method(v.parent()),
        }
    }

    pub fn class_access(&self, entry: &ClassEntry) -> Option<AccessFlags> {
        self.class_defs.get(entry).map(|d| d.access)
    }

    pub fn field_access(&self, entry: &FieldEntry) -> Option<AccessFlags> {
        self.field_defs.get(entry).map(|d| d.access)
    }

    pub fn method_access(&self, entry: &MethodEntry) -> Option<AccessFlags> {
        self.method_defs.get(entry).map(|d| d.access)
    }

    /// Access flags for any entry shape; a local variable borrows its
    /// method's flags. `None` means "not declared in the jar".
    pub fn entry_access(&self, entry: &Entry) -> Option<AccessFlags> {
        match entry {
            Entry::Class(c) => self.class_access(c),
            Entry::Field(f) => self.field_access(f),
            Entry::Method(m) => self.method_access(m),
            Entry::LocalVariable(v) => self.method_access(v.parent()),
        }
    }

    pub fn definition(&self, entry: &ClassEntry) -> Option<&ClassDefinition> {
        self.class_defs.get(entry)
    }

    pub fn field_definition(&self, entry: &FieldEntry) -> Option<&MemberDefinition> {
        self.field_defs.get(entry)
    }

    pub fn method_definition(&self, entry: &MethodEntry) -> Option<&MemberDefinition> {
        self.method_defs.get(entry)
    }

    pub fn local_variable_type(&self, entry: &LocalVariableEntry) -> Option<&TypeDescriptor> {
        self.local_defs.get(entry)
    }

    /// The canonical interned entry for a declared field, or `None` when no
    /// such declaration exists.
    pub fn declared_field(
        &self,
        parent: &Arc<ClassEntry>,
        name: &str,
        desc: &TypeDescriptor,
    ) -> Option<Arc<FieldEntry>> {
        let key = (parent.clone(), name.to_string(), desc.clone());
        let interned = self.fields.read().unwrap().get(&key).cloned()?;
        self.field_defs.contains_key(&interned).then_some(interned)
    }

    pub fn declared_method(
        &self,
        parent: &Arc<ClassEntry>,
        name: &str,
        desc: &MethodDescriptor,
    ) -> Option<Arc<MethodEntry>> {
        let key = (parent.clone(), name.to_string(), desc.clone());
        let interned = self.methods.read().unwrap().get(&key).cloned()?;
        self.method_defs.contains_key(&interned).then_some(interned)
    }

    // -- Whole-set accessors --

    pub fn classes(&self) -> Vec<Arc<ClassEntry>> {
        self.class_defs.keys().cloned().collect()
    }

    pub fn fields(&self) -> Vec<Arc<FieldEntry>> {
        self.field_defs.keys().cloned().collect()
    }

    pub fn methods(&self) -> Vec<Arc<MethodEntry>> {
        self.method_defs.keys().cloned().collect()
    }

    pub fn local_variables(&self) -> Vec<Arc<LocalVariableEntry>> {
        self.local_defs.keys().cloned().collect()
    }

    /// Declared parameters and locals of one method, ordered by slot.
    pub fn local_variables_of(&self, method: &Arc<MethodEntry>) -> Vec<Arc<LocalVariableEntry>> {
        let mut locals: Vec<Arc<LocalVariableEntry>> = self
            .local_defs
            .keys()
            .filter(|v| v.parent() == method)
            .cloned()
            .collect();
        locals.sort_by_key(|v| v.index());
        locals
    }
}

/// Split `a$b$c` into `[("a", "a"), ("a$b", "b"), ("a$b$c", "c")]`: each
/// element is the full interning key plus the entry's own name segment.
/// Names with leading, trailing or no `$` separators stay whole.
fn split_inner_chain(name: &str) -> Vec<(&str, &str)> {
    if name.is_empty() || !name.contains('$') || name.starts_with('$') || name.ends_with('$') {
        return vec![(name, name)];
    }

    let mut chain = Vec::new();
    let mut start = 0;
    for (pos, _) in name.match_indices('$') {
        let segment = &name[start..pos];
        if segment.is_empty() {
            return vec![(name, name)];
        }
        chain.push((&name[..pos], segment));
        start = pos + 1;
    }

    chain.push((name, &name[start..]));
    chain
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_returns_identical_arcs() {
        let index = EntryIndex::new();
        let a = index.get_class("com/example/a");
        let b = index.get_class("com/example/a");
        assert!(Arc::ptr_eq(&a, &b));

        let desc = TypeDescriptor::parse("I").unwrap();
        let f1 = index.get_field(&a, "x", &desc);
        let f2 = index.get_field(&b, "x", &desc);
        assert!(Arc::ptr_eq(&f1, &f2));
    }

    #[test]
    fn inner_classes_chain_to_outer() {
        let index = EntryIndex::new();
        let inner = index.get_class("a$b$c");
        let middle = inner.outer_class().unwrap();
        assert_eq!(middle.full_name(), "a$b");
        let outer = middle.outer_class().unwrap();
        assert_eq!(outer.full_name(), "a");
        assert!(Arc::ptr_eq(outer, &index.get_class("a")));
    }

    #[test]
    fn odd_dollar_names_stay_whole() {
        assert_eq!(split_inner_chain("$x"), vec![("$x", "$x")]);
        assert_eq!(split_inner_chain("x$"), vec![("x$", "x$")]);
        assert_eq!(split_inner_chain("a$$b"), vec![("a$$b", "a$$b")]);
    }

    #[test]
    fn lookup_without_declaration_is_not_in_jar() {
        let index = EntryIndex::new();
        let class = index.get_class("a");
        let desc = MethodDescriptor::parse("()V").unwrap();
        let method = index.get_method(&class, "m", &desc);

        assert!(!index.is_in_jar(&Entry::Method(method.clone())));
        assert!(index.declared_method(&class, "m", &desc).is_none());
    }
}

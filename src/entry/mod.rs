//! The interned symbol model: classes, fields, methods and local variables.
//!
//! An entry is pure identity. Definition data (access flags, signatures,
//! superclasses) lives in the index side tables and rename state lives in the
//! mapping store, so entries can be shared freely as `Arc`s and compared by
//! value without ever being mutated after construction.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::descriptor::{MethodDescriptor, TypeDescriptor};

/// Package prefixes whose classes are treated as library code: they can be
/// referenced but are never indexed or renamed.
const LIBRARY_NAMESPACES: [&str; 3] = ["java/", "javax/", "sun/"];

// ---------------------------------------------------------------------------
// Access flags
// ---------------------------------------------------------------------------

/// Unified member/class access bitset.
///
/// The low 16 bits are the raw JVM access flags (some bits are overloaded
/// between members and classes, mirroring the class file format); bits above
/// that mark properties the format expresses elsewhere, like `Record`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct AccessFlags(u32);

bitflags! {
    impl AccessFlags: u32 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const SYNCHRONIZED = 0x0020;
        const BRIDGE = 0x0040;
        const VARARGS = 0x0080;
        const NATIVE = 0x0100;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const STRICT = 0x0800;
        const SYNTHETIC = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;
        // Synthesized from the Record attribute, not a real access bit.
        const RECORD = 0x0001_0000;
    }
}

impl AccessFlags {
    pub fn from_raw(raw: u16) -> Self {
        AccessFlags::from_bits_retain(raw as u32)
    }

    pub fn with_record(self) -> Self {
        self | AccessFlags::RECORD
    }

    pub fn is_public(&self) -> bool {
        self.contains(AccessFlags::PUBLIC)
    }

    pub fn is_private(&self) -> bool {
        self.contains(AccessFlags::PRIVATE)
    }

    pub fn is_protected(&self) -> bool {
        self.contains(AccessFlags::PROTECTED)
    }

    pub fn is_static(&self) -> bool {
        self.contains(AccessFlags::STATIC)
    }

    pub fn is_final(&self) -> bool {
        self.contains(AccessFlags::FINAL)
    }

    pub fn is_synthetic(&self) -> bool {
        self.contains(AccessFlags::SYNTHETIC)
    }

    pub fn is_bridge(&self) -> bool {
        self.contains(AccessFlags::BRIDGE)
    }

    pub fn is_enum(&self) -> bool {
        self.contains(AccessFlags::ENUM)
    }

    pub fn is_record(&self) -> bool {
        self.contains(AccessFlags::RECORD)
    }

    pub fn is_abstract(&self) -> bool {
        self.contains(AccessFlags::ABSTRACT)
    }

    pub fn is_interface(&self) -> bool {
        self.contains(AccessFlags::INTERFACE)
    }
}

// ---------------------------------------------------------------------------
// Concrete entries
// ---------------------------------------------------------------------------

/// A class, identified by its outer-class chain and obfuscated name.
///
/// For a top-level class `obf_name` is the full internal name (with package
/// path); for an inner class it is only the segment after the last `$`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ClassEntry {
    parent: Option<Arc<ClassEntry>>,
    obf_name: String,
}

impl ClassEntry {
    pub fn new(parent: Option<Arc<ClassEntry>>, obf_name: impl Into<String>) -> Self {
        ClassEntry {
            parent,
            obf_name: obf_name.into(),
        }
    }

    pub fn obf_name(&self) -> &str {
        &self.obf_name
    }

    pub fn outer_class(&self) -> Option<&Arc<ClassEntry>> {
        self.parent.as_ref()
    }

    pub fn is_inner_class(&self) -> bool {
        self.parent.is_some()
    }

    /// The full internal name, e.g. `com/example/Foo$Bar`.
    pub fn full_name(&self) -> String {
        match &self.parent {
            Some(parent) => format!("{}${}", parent.full_name(), self.obf_name),
            None => self.obf_name.clone(),
        }
    }

    /// The unqualified name: package stripped for top-level classes, the
    /// inner-name segment for inner classes.
    pub fn simple_name(&self) -> &str {
        match self.obf_name.rfind('/') {
            Some(pos) if self.parent.is_none() => &self.obf_name[pos + 1..],
            _ => &self.obf_name,
        }
    }

    /// Simple-parent-qualified name used to disambiguate inner classes in
    /// display contexts, e.g. `Foo$Bar` rather than `com/example/Foo$Bar`.
    pub fn contextual_name(&self) -> String {
        match &self.parent {
            Some(parent) => format!("{}${}", parent.simple_name(), self.obf_name),
            None => self.simple_name().to_string(),
        }
    }

    /// The package of the outermost enclosing class, `None` for the default
    /// package.
    pub fn package_name(&self) -> Option<&str> {
        let outermost = self.outermost_name();
        outermost.rfind('/').map(|pos| &outermost[..pos])
    }

    fn outermost_name(&self) -> &str {
        match &self.parent {
            Some(parent) => parent.outermost_name(),
            None => &self.obf_name,
        }
    }

    /// Whether this class lives in a reserved library namespace and is
    /// therefore excluded from indexing and renaming.
    pub fn is_library(&self) -> bool {
        let name = self.outermost_name();
        LIBRARY_NAMESPACES.iter().any(|ns| name.starts_with(ns))
    }
}

impl fmt::Debug for ClassEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_name())
    }
}

impl fmt::Display for ClassEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_name())
    }
}

/// A field, identified by owner, obfuscated name and type descriptor.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct FieldEntry {
    pub(crate) parent: Arc<ClassEntry>,
    pub(crate) obf_name: String,
    pub(crate) desc: TypeDescriptor,
}

impl FieldEntry {
    pub fn new(parent: Arc<ClassEntry>, obf_name: impl Into<String>, desc: TypeDescriptor) -> Self {
        FieldEntry {
            parent,
            obf_name: obf_name.into(),
            desc,
        }
    }

    pub fn parent(&self) -> &Arc<ClassEntry> {
        &self.parent
    }

    pub fn obf_name(&self) -> &str {
        &self.obf_name
    }

    pub fn desc(&self) -> &TypeDescriptor {
        &self.desc
    }
}

impl fmt::Debug for FieldEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}:{}", self.parent.full_name(), self.obf_name, self.desc)
    }
}

impl fmt::Display for FieldEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.parent.full_name(), self.obf_name)
    }
}

/// A method, identified by owner, obfuscated name and method descriptor.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct MethodEntry {
    pub(crate) parent: Arc<ClassEntry>,
    pub(crate) obf_name: String,
    pub(crate) desc: MethodDescriptor,
}

impl MethodEntry {
    pub fn new(
        parent: Arc<ClassEntry>,
        obf_name: impl Into<String>,
        desc: MethodDescriptor,
    ) -> Self {
        MethodEntry {
            parent,
            obf_name: obf_name.into(),
            desc,
        }
    }

    pub fn parent(&self) -> &Arc<ClassEntry> {
        &self.parent
    }

    pub fn obf_name(&self) -> &str {
        &self.obf_name
    }

    pub fn desc(&self) -> &MethodDescriptor {
        &self.desc
    }

    /// Instance or class initializer; never renamed and never inherited.
    pub fn is_constructor(&self) -> bool {
        self.obf_name == "<init>" || self.obf_name == "<clinit>"
    }
}

impl fmt::Debug for MethodEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}{}", self.parent.full_name(), self.obf_name, self.desc)
    }
}

impl fmt::Display for MethodEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.parent.full_name(), self.obf_name)
    }
}

/// A local variable or parameter, identified by its method and slot index.
///
/// The recorded name and parameter flag describe the slot but are not part
/// of the identity: two lookups for the same `(method, index)` must unify
/// even when one side had no debug information.
#[derive(Clone)]
pub struct LocalVariableEntry {
    pub(crate) parent: Arc<MethodEntry>,
    pub(crate) index: u16,
    pub(crate) obf_name: String,
    pub(crate) parameter: bool,
}

impl LocalVariableEntry {
    pub fn new(
        parent: Arc<MethodEntry>,
        index: u16,
        obf_name: impl Into<String>,
        parameter: bool,
    ) -> Self {
        LocalVariableEntry {
            parent,
            index,
            obf_name: obf_name.into(),
            parameter,
        }
    }

    pub fn parent(&self) -> &Arc<MethodEntry> {
        &self.parent
    }

    pub fn index(&self) -> u16 {
        self.index
    }

    pub fn obf_name(&self) -> &str {
        &self.obf_name
    }

    pub fn is_parameter(&self) -> bool {
        self.parameter
    }
}

impl PartialEq for LocalVariableEntry {
    fn eq(&self, other: &Self) -> bool {
        self.parent == other.parent && self.index == other.index
    }
}

impl Eq for LocalVariableEntry {}

impl Hash for LocalVariableEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.parent.hash(state);
        self.index.hash(state);
    }
}

impl fmt::Debug for LocalVariableEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}[{}]", self.parent, self.index)
    }
}

// ---------------------------------------------------------------------------
// The closed entry variant
// ---------------------------------------------------------------------------

/// Any indexable symbol. The resolver and validator match exhaustively on
/// this, so a new resolution rule has to consider all four shapes.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Entry {
    Class(Arc<ClassEntry>),
    Field(Arc<FieldEntry>),
    Method(Arc<MethodEntry>),
    LocalVariable(Arc<LocalVariableEntry>),
}

impl Entry {
    /// The immediate parent entry, `None` for top-level classes.
    pub fn parent(&self) -> Option<Entry> {
        match self {
            Entry::Class(c) => c.outer_class().cloned().map(Entry::Class),
            Entry::Field(f) => Some(Entry::Class(f.parent.clone())),
            Entry::Method(m) => Some(Entry::Class(m.parent.clone())),
            Entry::LocalVariable(v) => Some(Entry::Method(v.parent.clone())),
        }
    }

    /// The closest enclosing class; for a class entry, itself.
    pub fn containing_class(&self) -> Arc<ClassEntry> {
        match self {
            Entry::Class(c) => c.clone(),
            Entry::Field(f) => f.parent.clone(),
            Entry::Method(m) => m.parent.clone(),
            Entry::LocalVariable(v) => v.parent.parent.clone(),
        }
    }

    /// The ancestry chain from the outermost class down to this entry.
    pub fn ancestry(&self) -> Vec<Entry> {
        let mut chain = match self.parent() {
            Some(parent) => parent.ancestry(),
            None => Vec::new(),
        };
        chain.push(self.clone());
        chain
    }

    /// The member of this entry's ancestry that is the direct child of a
    /// class: the entry itself for fields and methods, the owning method for
    /// local variables, `None` for classes.
    pub fn class_child(&self) -> Option<Entry> {
        match self {
            Entry::Class(_) => None,
            Entry::Field(_) | Entry::Method(_) => Some(self.clone()),
            Entry::LocalVariable(v) => Some(Entry::Method(v.parent.clone())),
        }
    }

    /// The owning method, walking up through local variables.
    pub fn method_ancestor(&self) -> Option<Arc<MethodEntry>> {
        match self {
            Entry::Method(m) => Some(m.clone()),
            Entry::LocalVariable(v) => Some(v.parent.clone()),
            Entry::Class(_) | Entry::Field(_) => None,
        }
    }

    /// Rebuild this entry with `target` (an ancestor or the entry itself)
    /// swapped for `replacement`.
    pub fn replace_ancestor(&self, target: &Entry, replacement: &Entry) -> Entry {
        if target == replacement {
            return self.clone();
        }

        if self == target {
            return replacement.clone();
        }

        if let (Entry::LocalVariable(v), Entry::Method(t), Entry::Method(r)) =
            (self, target, replacement)
        {
            if &v.parent == t {
                return Entry::LocalVariable(Arc::new(LocalVariableEntry::new(
                    r.clone(),
                    v.index,
                    v.obf_name.clone(),
                    v.parameter,
                )));
            }
        }

        self.clone()
    }

    /// Rebuild a member entry under a different owning class. Classes and
    /// local variables are returned unchanged.
    pub fn with_class_parent(&self, parent: &Arc<ClassEntry>) -> Entry {
        match self {
            Entry::Field(f) => Entry::Field(Arc::new(FieldEntry::new(
                parent.clone(),
                f.obf_name.clone(),
                f.desc.clone(),
            ))),
            Entry::Method(m) => Entry::Method(Arc::new(MethodEntry::new(
                parent.clone(),
                m.obf_name.clone(),
                m.desc.clone(),
            ))),
            other => other.clone(),
        }
    }

    /// The unqualified obfuscated name.
    pub fn simple_obf_name(&self) -> &str {
        match self {
            Entry::Class(c) => c.simple_name(),
            Entry::Field(f) => &f.obf_name,
            Entry::Method(m) => &m.obf_name,
            Entry::LocalVariable(v) => &v.obf_name,
        }
    }

    /// Whether a sibling with the same target name would fail to compile.
    pub fn can_conflict_with(&self, other: &Entry) -> bool {
        match (self, other) {
            (Entry::Class(_), Entry::Class(_)) => true,
            // Fields only collide within one class; a same-named field in
            // an ancestor is legal shadowing, reported separately.
            (Entry::Field(a), Entry::Field(b)) => a.parent == b.parent,
            // Methods collide at the source level when their parameter
            // lists erase to the same shape, whatever the return type —
            // across classes, that is an accidental override.
            (Entry::Method(a), Entry::Method(b)) => a.desc.args == b.desc.args,
            (Entry::LocalVariable(a), Entry::LocalVariable(b)) => a.parent == b.parent,
            _ => false,
        }
    }

    /// Whether this entry would shadow `other` if `other` sat in an
    /// ancestor class under the same name.
    pub fn can_shadow(&self, other: &Entry) -> bool {
        match (self, other) {
            (Entry::Field(_), Entry::Field(_)) => true,
            (Entry::Method(a), Entry::Method(b)) => a.desc.args == b.desc.args,
            _ => false,
        }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Class(c) => write!(f, "{c}"),
            Entry::Field(e) => write!(f, "{e}"),
            Entry::Method(m) => write!(f, "{m}"),
            Entry::LocalVariable(v) => write!(f, "{}[{}]", v.parent, v.index),
        }
    }
}

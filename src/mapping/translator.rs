use std::sync::Arc;

use crate::descriptor::{MethodDescriptor, TypeDescriptor};
use crate::entry::{ClassEntry, Entry};
use crate::index::JarIndex;
use crate::resolve::ResolutionStrategy;

use super::tree::MappingTree;
use super::TokenType;

/// A translated name and where it came from.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Translated<T> {
    pub value: T,
    pub token_type: TokenType,
}

/// Applies the mapping overlay to entries and descriptors.
///
/// Member lookups resolve through RESOLVE_ROOT first, so a rename stored on
/// the authoritative declaration is seen by every override, bridge and
/// interface implementation. Symbols outside the jar fall back silently to
/// their obfuscated identity.
pub struct Translator<'a> {
    index: &'a JarIndex,
    mappings: &'a MappingTree,
}

impl<'a> Translator<'a> {
    pub fn new(index: &'a JarIndex, mappings: &'a MappingTree) -> Self {
        Translator { index, mappings }
    }

    /// The visible name of any entry: for classes the full internal name,
    /// for members and locals the simple name.
    pub fn translate(&self, entry: &Entry) -> String {
        self.extended_translate(entry).value
    }

    /// Like [`Self::translate`], additionally reporting the name's
    /// provenance.
    pub fn extended_translate(&self, entry: &Entry) -> Translated<String> {
        match entry {
            Entry::Class(class) => {
                let (value, token_type) = self.class_full_name_ex(class);
                Translated { value, token_type }
            }
            _ => match self.mapping_for(entry) {
                Some((name, token_type)) => Translated {
                    value: name,
                    token_type,
                },
                None => {
                    let fallback = entry.simple_obf_name().to_string();
                    Translated {
                        value: fallback,
                        token_type: TokenType::Obfuscated,
                    }
                }
            },
        }
    }

    /// Documentation attached to the entry, if any.
    pub fn docs(&self, entry: &Entry) -> Option<String> {
        self.mappings.get(entry).and_then(|m| m.javadoc.clone())
    }

    /// The full visible internal name of a class, e.g.
    /// `com/example/Foo$Inner` once `Foo` is mapped.
    pub fn class_full_name(&self, class: &Arc<ClassEntry>) -> String {
        self.class_full_name_ex(class).0
    }

    fn class_full_name_ex(&self, class: &Arc<ClassEntry>) -> (String, TokenType) {
        let mapping = self.mappings.get(&Entry::Class(class.clone()));
        let (own_name, token_type) = match mapping.and_then(|m| m.target_name.as_deref()) {
            Some(target) => (
                target.to_string(),
                mapping.map(|m| m.token_type).unwrap_or(TokenType::Deobfuscated),
            ),
            None => (class.obf_name().to_string(), TokenType::Obfuscated),
        };

        match class.outer_class() {
            Some(outer) => {
                let (outer_name, _) = self.class_full_name_ex(outer);
                (format!("{outer_name}${own_name}"), token_type)
            }
            None => (own_name, token_type),
        }
    }

    /// The visible package of a class, `None` for the default package.
    pub fn class_package(&self, class: &Arc<ClassEntry>) -> Option<String> {
        let full = self.class_full_name(class);
        full.rfind('/').map(|pos| full[..pos].to_string())
    }

    /// Rewrite a type descriptor through the class mappings.
    pub fn translate_type(&self, desc: &TypeDescriptor) -> TypeDescriptor {
        desc.remap(&|name| {
            let class = self.index.entry_index().get_class(name);
            let translated = self.class_full_name(&class);
            (translated != name).then_some(translated)
        })
    }

    /// Rewrite a method descriptor through the class mappings.
    pub fn translate_method_desc(&self, desc: &MethodDescriptor) -> MethodDescriptor {
        desc.remap(&|name| {
            let class = self.index.entry_index().get_class(name);
            let translated = self.class_full_name(&class);
            (translated != name).then_some(translated)
        })
    }

    /// The mapped name for a member entry, read through root resolution.
    fn mapping_for(&self, entry: &Entry) -> Option<(String, TokenType)> {
        let resolver = self.index.resolver();
        for candidate in resolver.resolve_entry(entry, ResolutionStrategy::Root) {
            if let Some(mapping) = self.mappings.get(&candidate) {
                if let Some(target) = &mapping.target_name {
                    return Some((target.clone(), mapping.token_type));
                }
            }
        }

        // Direct hit without resolution, e.g. a mapping recorded against an
        // entry the jar never declared.
        if let Some(mapping) = self.mappings.get(entry) {
            if let Some(target) = &mapping.target_name {
                return Some((target.clone(), mapping.token_type));
            }
        }

        None
    }
}

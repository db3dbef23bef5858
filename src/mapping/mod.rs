//! The rename overlay: mapping values, the ancestry-keyed store, the
//! translator that applies it, and the validator that guards it.

mod remapper;
mod translator;
mod tree;
mod validator;

pub use remapper::{EntryRemapper, PackageSplit};
pub use translator::{Translated, Translator};
pub use tree::{MappingDelta, MappingTree};
pub use validator::MappingValidator;

/// Where a name came from.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum TokenType {
    /// No mapping: the name is as it appears in the input class files.
    Obfuscated,
    /// Set by direct user action.
    Deobfuscated,
    /// Supplied by an automated name-proposal collaborator.
    Proposed,
    /// Recovered from debug information in the class file.
    Debug,
}

/// A user- or tool-assigned name and documentation for one entry.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct EntryMapping {
    pub target_name: Option<String>,
    pub javadoc: Option<String>,
    pub token_type: TokenType,
}

impl Default for EntryMapping {
    fn default() -> Self {
        EntryMapping {
            target_name: None,
            javadoc: None,
            token_type: TokenType::Obfuscated,
        }
    }
}

impl EntryMapping {
    pub fn deobfuscated(target_name: impl Into<String>) -> Self {
        EntryMapping {
            target_name: Some(target_name.into()),
            javadoc: None,
            token_type: TokenType::Deobfuscated,
        }
    }

    pub fn proposed(target_name: impl Into<String>) -> Self {
        EntryMapping {
            target_name: Some(target_name.into()),
            javadoc: None,
            token_type: TokenType::Proposed,
        }
    }

    pub fn with_deobf_name(self, target_name: impl Into<String>) -> Self {
        EntryMapping {
            target_name: Some(target_name.into()),
            token_type: TokenType::Deobfuscated,
            ..self
        }
    }

    pub fn with_docs(self, javadoc: impl Into<String>) -> Self {
        EntryMapping {
            javadoc: Some(javadoc.into()),
            ..self
        }
    }

    /// An empty mapping carries no information and is stored as absence.
    pub fn is_empty(&self) -> bool {
        self.target_name.is_none() && self.javadoc.is_none()
    }
}

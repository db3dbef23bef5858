//! The jar-wide symbol table and its auxiliary graphs.

use std::fmt;

mod bridge_index;
mod enclosing_index;
mod entry_index;
mod inheritance_index;
mod jar_index;
mod package_index;
mod reference_index;
mod visitor;

pub use bridge_index::BridgeMethodIndex;
pub use enclosing_index::{EnclosingMethodData, EnclosingMethodIndex};
pub use entry_index::{ClassDefinition, EntryIndex, MemberDefinition};
pub use inheritance_index::InheritanceIndex;
pub use jar_index::JarIndex;
pub use package_index::PackageVisibilityIndex;
pub use reference_index::{
    ClassReference, EntryReference, FieldReference, FieldTypeReference, MethodReference,
    MethodTypeReference, ReferenceIndex, ReferenceTargetType,
};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Fatal scan errors. Anything recoverable (external symbols, rename
/// conflicts) never surfaces here.
#[derive(Debug)]
pub enum IndexError {
    /// The provider listed a class it could not supply.
    MissingClass(String),
    /// The class bytes failed to parse.
    ClassParse {
        class: String,
        source: binrw::Error,
    },
    /// The class file parsed but its structure is inconsistent, e.g. a
    /// member reference pointing at a non-reference constant.
    MalformedClass {
        class: String,
        detail: String,
    },
    /// A class listed itself among its interfaces.
    SelfInterface(String),
}

impl fmt::Display for IndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexError::MissingClass(name) => write!(f, "class not found in provider: {name}"),
            IndexError::ClassParse { class, source } => {
                write!(f, "failed to parse class {class}: {source}")
            }
            IndexError::MalformedClass { class, detail } => {
                write!(f, "malformed class {class}: {detail}")
            }
            IndexError::SelfInterface(name) => {
                write!(f, "class cannot be its own interface: {name}")
            }
        }
    }
}

impl std::error::Error for IndexError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IndexError::ClassParse { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type IndexResult<T> = Result<T, IndexError>;

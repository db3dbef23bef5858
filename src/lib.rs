//! Indexes a jar of compiled [Java class files](https://docs.oracle.com/javase/specs/jvms/se17/html/jvms-4.html)
//! into an interned symbol table with inheritance, reference, bridge-method,
//! package-visibility and enclosing-method graphs, and layers a validated
//! rename store on top of it.
//!
//! The intended flow:
//!
//! ```ignore
//! let jar = JarFile::open("obfuscated.jar")?;
//! let mut index = JarIndex::new();
//! index.index_jar(&jar, &mut NoProgress)?;
//!
//! let mut remapper = EntryRemapper::new(Arc::new(index));
//! let method = remapper.jar_index().entry_index().get_method(&class, "a", &desc);
//! remapper.put_mapping(&mut vc, &Entry::Method(method), EntryMapping::deobfuscated("doStuff"));
//! ```

#[macro_use]
extern crate bitflags;

pub mod attribute_info;
pub mod code_attribute;
pub mod constant_info;
pub mod field_info;
pub mod method_info;

pub mod descriptor;
pub mod entry;
pub mod index;
pub mod jar_utils;
pub mod mapping;
pub mod progress;
pub mod provider;
pub mod resolve;
pub mod types;
pub mod validation;

pub use types::ClassFile;

use std::collections::{HashMap, HashSet};
use std::io::Cursor;
use std::sync::Arc;

use binrw::BinRead;
use tracing::debug;

use crate::entry::{ClassEntry, Entry};
use crate::progress::ProgressListener;
use crate::provider::ClassProvider;
use crate::resolve::EntryResolver;
use crate::ClassFile;

use super::bridge_index::BridgeMethodIndex;
use super::enclosing_index::EnclosingMethodIndex;
use super::entry_index::EntryIndex;
use super::inheritance_index::InheritanceIndex;
use super::package_index::PackageVisibilityIndex;
use super::reference_index::ReferenceIndex;
use super::visitor;
use super::{IndexError, IndexResult};

/// Post-pass steps in dependency order: references canonicalize against
/// entries and inheritance, bridges against entries and raw references,
/// package visibility against everything before it.
#[derive(Copy, Clone, Debug)]
enum IndexStep {
    Entries,
    Inheritance,
    References,
    Bridges,
    PackageVisibility,
    EnclosingMethods,
}

const PROCESS_ORDER: [IndexStep; 6] = [
    IndexStep::Entries,
    IndexStep::Inheritance,
    IndexStep::References,
    IndexStep::Bridges,
    IndexStep::PackageVisibility,
    IndexStep::EnclosingMethods,
];

/// The complete index over one jar snapshot.
///
/// Built by a one-shot batch scan: declarations first, then references
/// (which need all declarations), then bridge detection (which needs raw
/// references), then each sub-index's post-processing in [`PROCESS_ORDER`].
/// Indexes are rebuilt wholesale by re-running the scan, never patched.
#[derive(Default)]
pub struct JarIndex {
    pub(crate) indexed_classes: HashSet<String>,
    pub(crate) entry_index: EntryIndex,
    pub(crate) inheritance_index: InheritanceIndex,
    pub(crate) reference_index: ReferenceIndex,
    pub(crate) bridge_method_index: BridgeMethodIndex,
    pub(crate) package_visibility_index: PackageVisibilityIndex,
    pub(crate) enclosing_method_index: EnclosingMethodIndex,
    /// Non-synthetic declared members per class, for sibling-conflict
    /// checks. Excludes `<clinit>`.
    pub(crate) children_by_class: HashMap<Arc<ClassEntry>, Vec<Entry>>,
}

impl JarIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan every class the provider knows about and build all indexes.
    pub fn index_jar(
        &mut self,
        provider: &dyn ClassProvider,
        progress: &mut dyn ProgressListener,
    ) -> IndexResult<()> {
        let mut class_names = provider.class_names();
        class_names.sort();

        progress.init(4, "indexing jar");
        debug!(classes = class_names.len(), "indexing jar");

        progress.step(1, "indexing entries");
        for name in &class_names {
            let class_file = parse_class(provider, name)?;
            if visitor::index_declarations(self, &class_file)? {
                self.indexed_classes.insert(name.clone());
            }
        }

        progress.step(2, "indexing references");
        for name in &class_names {
            if !self.indexed_classes.contains(name) {
                continue;
            }

            let class_file = parse_class(provider, name)?;
            visitor::index_references(self, &class_file)?;
        }

        progress.step(3, "finding bridge methods");
        self.bridge_method_index
            .find_bridge_methods(&self.entry_index, &self.reference_index);

        progress.step(4, "processing index");
        self.process_index();

        debug!(
            indexed = self.indexed_classes.len(),
            partitions = self.package_visibility_index.partitions().len(),
            "jar indexing complete"
        );
        Ok(())
    }

    fn process_index(&mut self) {
        for step in PROCESS_ORDER {
            match step {
                // Entries, inheritance and enclosing methods are fully
                // populated during the passes; their processing slot exists
                // to pin the ordering.
                IndexStep::Entries | IndexStep::Inheritance | IndexStep::EnclosingMethods => {}
                IndexStep::References => {
                    let resolver = EntryResolver::new(
                        &self.entry_index,
                        &self.inheritance_index,
                        &self.bridge_method_index,
                    );
                    self.reference_index.process(&resolver);
                }
                // Bridge links are found between the passes, before
                // reference canonicalization consumes them.
                IndexStep::Bridges => {}
                IndexStep::PackageVisibility => self.package_visibility_index.process(
                    &self.entry_index,
                    &self.reference_index,
                    &self.inheritance_index,
                ),
            }
        }
    }

    // -- Accessors --

    pub fn entry_index(&self) -> &EntryIndex {
        &self.entry_index
    }

    pub fn inheritance_index(&self) -> &InheritanceIndex {
        &self.inheritance_index
    }

    pub fn reference_index(&self) -> &ReferenceIndex {
        &self.reference_index
    }

    pub fn bridge_method_index(&self) -> &BridgeMethodIndex {
        &self.bridge_method_index
    }

    pub fn package_visibility_index(&self) -> &PackageVisibilityIndex {
        &self.package_visibility_index
    }

    pub fn enclosing_method_index(&self) -> &EnclosingMethodIndex {
        &self.enclosing_method_index
    }

    /// A resolver borrowing this index's graphs.
    pub fn resolver(&self) -> EntryResolver<'_> {
        EntryResolver::new(
            &self.entry_index,
            &self.inheritance_index,
            &self.bridge_method_index,
        )
    }

    /// Non-synthetic declared members of a class.
    pub fn children_of(&self, class: &ClassEntry) -> &[Entry] {
        self.children_by_class
            .get(class)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_indexed(&self, internal_name: &str) -> bool {
        self.indexed_classes.contains(internal_name)
    }
}

fn parse_class(provider: &dyn ClassProvider, name: &str) -> IndexResult<ClassFile> {
    let bytes = provider
        .get(name)
        .ok_or_else(|| IndexError::MissingClass(name.to_string()))?;
    ClassFile::read(&mut Cursor::new(&bytes)).map_err(|source| IndexError::ClassParse {
        class: name.to_string(),
        source,
    })
}

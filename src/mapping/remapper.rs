use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::entry::{ClassEntry, Entry};
use crate::index::JarIndex;
use crate::resolve::ResolutionStrategy;
use crate::validation::ValidationContext;

use super::translator::{Translated, Translator};
use super::tree::{MappingDelta, MappingTree};
use super::validator::MappingValidator;
use super::EntryMapping;

/// Classes forced into one package by package-private coupling but mapped
/// to different packages.
#[derive(Clone, Debug)]
pub struct PackageSplit {
    /// Visible package name (`None` for the default package) to the classes
    /// of the partition mapped there.
    pub packages: BTreeMap<Option<String>, Vec<Arc<ClassEntry>>>,
}

/// The sanctioned surface over mapping state: every mutation goes through
/// [`EntryRemapper::put_mapping`], everything else is a read-only view.
///
/// The store is independent of the index it overlays: re-running a scan and
/// attaching the same tree to the fresh index preserves all mappings.
pub struct EntryRemapper {
    jar_index: Arc<JarIndex>,
    mappings: MappingTree,
}

impl EntryRemapper {
    pub fn new(jar_index: Arc<JarIndex>) -> Self {
        Self::with_mappings(jar_index, MappingTree::new())
    }

    pub fn with_mappings(jar_index: Arc<JarIndex>, mappings: MappingTree) -> Self {
        EntryRemapper {
            jar_index,
            mappings,
        }
    }

    pub fn jar_index(&self) -> &JarIndex {
        &self.jar_index
    }

    pub fn mappings(&self) -> &MappingTree {
        &self.mappings
    }

    pub fn into_mappings(self) -> MappingTree {
        self.mappings
    }

    /// Drain the change set accumulated since the last call, for
    /// synchronization consumers.
    pub fn take_delta(&mut self) -> MappingDelta {
        self.mappings.take_delta()
    }

    /// The sole commit path for rename state.
    ///
    /// Renames are validated across the entry's whole equivalence set and
    /// rejected on any hard conflict; warnings commit only when the
    /// notifier confirms them. The mapping is stored against the
    /// authoritative (root-resolved) declaration so every override, bridge
    /// and interface implementation reads it. Returns whether the commit
    /// happened.
    pub fn put_mapping(
        &mut self,
        vc: &mut ValidationContext<'_>,
        entry: &Entry,
        mapping: EntryMapping,
    ) -> bool {
        if let Some(target) = &mapping.target_name {
            let validator = MappingValidator::new(&self.jar_index, &self.mappings);
            validator.validate_rename(vc, entry, target);
            if !vc.can_proceed() {
                debug!(%entry, %target, "rename rejected");
                return false;
            }
        }

        let canonical = self
            .jar_index
            .resolver()
            .resolve_first_entry(entry, ResolutionStrategy::Root);

        if mapping.is_empty() {
            self.mappings.remove(&canonical);
        } else {
            self.mappings.insert(&canonical, mapping);
        }

        true
    }

    /// Validate a prospective mapping without committing it.
    pub fn validate_put_mapping(
        &self,
        vc: &mut ValidationContext<'_>,
        entry: &Entry,
        mapping: &EntryMapping,
    ) {
        if let Some(target) = &mapping.target_name {
            let validator = MappingValidator::new(&self.jar_index, &self.mappings);
            validator.validate_rename(vc, entry, target);
        }
    }

    /// The entry's visible name with provenance.
    pub fn deobfuscate(&self, entry: &Entry) -> Translated<String> {
        self.translator().extended_translate(entry)
    }

    /// The mapping stored for exactly this entry (not resolved through the
    /// hierarchy); the default mapping when none is stored.
    pub fn deobf_mapping(&self, entry: &Entry) -> EntryMapping {
        self.mappings.get(entry).cloned().unwrap_or_default()
    }

    /// Non-synthetic declared members of a class, for tree views.
    pub fn obf_children(&self, class: &ClassEntry) -> &[Entry] {
        self.jar_index.children_of(class)
    }

    pub fn translator(&self) -> Translator<'_> {
        Translator::new(&self.jar_index, &self.mappings)
    }

    /// Check that every package-visibility partition maps into a single
    /// package. Violations are collected and returned in aggregate, never
    /// raised fail-fast.
    pub fn check_packages(&self) -> Vec<PackageSplit> {
        let translator = self.translator();
        let mut splits = Vec::new();

        for partition in self.jar_index.package_visibility_index().partitions() {
            let mut packages: BTreeMap<Option<String>, Vec<Arc<ClassEntry>>> = BTreeMap::new();
            for class in partition {
                // Inner classes follow their outer class; only top-level
                // classes choose a package.
                if class.is_inner_class() {
                    continue;
                }
                packages
                    .entry(translator.class_package(class))
                    .or_default()
                    .push(class.clone());
            }

            if packages.len() > 1 {
                splits.push(PackageSplit { packages });
            }
        }

        splits
    }
}

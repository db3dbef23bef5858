use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::entry::{AccessFlags, ClassEntry};

use super::entry_index::EntryIndex;
use super::inheritance_index::InheritanceIndex;
use super::reference_index::{ReferenceIndex, ReferenceTargetType};

/// Connected components over the package-private coupling graph.
///
/// Two classes are coupled when moving them into different packages would
/// break an access: a use of a package-private (or protected-across-package)
/// member or class, a package-private supertype, or an outer/inner pair.
/// Every indexed class lands in exactly one partition; a partition must be
/// repackaged as a unit.
#[derive(Default)]
pub struct PackageVisibilityIndex {
    connections: HashMap<Arc<ClassEntry>, HashSet<Arc<ClassEntry>>>,
    partitions: Vec<Vec<Arc<ClassEntry>>>,
    partition_ids: HashMap<Arc<ClassEntry>, usize>,
}

impl PackageVisibilityIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process(
        &mut self,
        entries: &EntryIndex,
        references: &ReferenceIndex,
        inheritance: &InheritanceIndex,
    ) {
        self.add_connections(entries, references, inheritance);
        self.build_partitions(entries);
    }

    /// All partitions; disjoint, covering every indexed class.
    pub fn partitions(&self) -> &[Vec<Arc<ClassEntry>>] {
        &self.partitions
    }

    /// The partition containing the given class.
    pub fn partition(&self, entry: &ClassEntry) -> Option<&[Arc<ClassEntry>]> {
        self.partition_ids
            .get(entry)
            .map(|&id| self.partitions[id].as_slice())
    }

    fn add_connection(&mut self, a: &Arc<ClassEntry>, b: &Arc<ClassEntry>) {
        if a == b {
            return;
        }

        self.connections.entry(a.clone()).or_default().insert(b.clone());
        self.connections.entry(b.clone()).or_default().insert(a.clone());
    }

    fn add_connections(
        &mut self,
        entries: &EntryIndex,
        references: &ReferenceIndex,
        inheritance: &InheritanceIndex,
    ) {
        for field in entries.fields() {
            let Some(access) = entries.field_access(&field) else {
                continue;
            };
            if access.is_public() || access.is_private() {
                continue;
            }

            for reference in references.references_to_field(&field) {
                let target_class = reference.entry.parent().clone();
                let context_class = reference.context.parent().clone();
                if requires_same_package(
                    access,
                    &target_class,
                    &context_class,
                    &reference.target_type,
                    inheritance,
                ) {
                    self.add_connection(&target_class, &context_class);
                }
            }
        }

        for method in entries.methods() {
            let Some(access) = entries.method_access(&method) else {
                continue;
            };
            if access.is_public() || access.is_private() {
                continue;
            }

            for reference in references.references_to_method(&method) {
                let target_class = reference.entry.parent().clone();
                let context_class = reference.context.parent().clone();
                if requires_same_package(
                    access,
                    &target_class,
                    &context_class,
                    &reference.target_type,
                    inheritance,
                ) {
                    self.add_connection(&target_class, &context_class);
                }
            }
        }

        for class in entries.classes() {
            let access = entries.class_access(&class);

            if let Some(access) = access {
                if !access.is_public() && !access.is_private() {
                    for reference in references.field_type_references_to_class(&class) {
                        let context_class = reference.context.parent().clone();
                        if requires_same_package(
                            access,
                            &class,
                            &context_class,
                            &reference.target_type,
                            inheritance,
                        ) {
                            self.add_connection(&class, &context_class);
                        }
                    }

                    for reference in references.method_type_references_to_class(&class) {
                        let context_class = reference.context.parent().clone();
                        if requires_same_package(
                            access,
                            &class,
                            &context_class,
                            &reference.target_type,
                            inheritance,
                        ) {
                            self.add_connection(&class, &context_class);
                        }
                    }
                }
            }

            // A package-private or protected supertype binds the subclass to
            // its package.
            for parent in inheritance.parents(&class).to_vec() {
                if let Some(parent_access) = entries.class_access(&parent) {
                    if !parent_access.is_public() && !parent_access.is_private() {
                        self.add_connection(&class, &parent);
                    }
                }
            }

            // Inner classes always travel with their outer class.
            if let Some(outer) = class.outer_class() {
                let outer = outer.clone();
                self.add_connection(&class, &outer);
            }
        }
    }

    fn build_partitions(&mut self, entries: &EntryIndex) {
        let mut unassigned: HashSet<Arc<ClassEntry>> = entries.classes().into_iter().collect();

        while let Some(seed) = unassigned.iter().next().cloned() {
            unassigned.remove(&seed);
            let mut partition = vec![seed.clone()];
            let mut stack = vec![seed];

            while let Some(member) = stack.pop() {
                let Some(connected) = self.connections.get(&member) else {
                    continue;
                };
                for neighbor in connected {
                    if unassigned.remove(neighbor) {
                        partition.push(neighbor.clone());
                        stack.push(neighbor.clone());
                    }
                }
            }

            let id = self.partitions.len();
            for member in &partition {
                self.partition_ids.insert(member.clone(), id);
            }
            self.partitions.push(partition);
        }
    }
}

/// Whether this access breaks if the two classes end up in different
/// packages.
fn requires_same_package(
    access: AccessFlags,
    target_class: &Arc<ClassEntry>,
    context_class: &Arc<ClassEntry>,
    target_type: &ReferenceTargetType,
    inheritance: &InheritanceIndex,
) -> bool {
    if access.is_public() {
        return false;
    }

    if access.is_protected() {
        if !inheritance.ancestors(context_class).contains(target_class) {
            // Protected access from outside the subtype hierarchy behaves
            // like package-private access.
            return true;
        }

        return match target_type {
            ReferenceTargetType::None | ReferenceTargetType::Static => false,
            ReferenceTargetType::UninitializedThis | ReferenceTargetType::Uninitialized => false,
            // Instance access is package-free only when the receiver type is
            // assignable to the accessing class.
            ReferenceTargetType::ClassType(receiver) => {
                receiver != context_class
                    && !inheritance.ancestors(receiver).contains(context_class)
            }
        };
    }

    // Package-private.
    true
}

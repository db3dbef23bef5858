use std::collections::HashMap;
use std::sync::Arc;

use crate::descriptor::TypeDescriptor;
use crate::entry::MethodEntry;

use super::entry_index::EntryIndex;
use super::reference_index::ReferenceIndex;

/// Links compiler-synthesized bridge methods to the specialized methods
/// they forward to.
///
/// A bridge exists so a covariant-return or generics-erased override can
/// satisfy the ancestor's stricter signature: the compiler emits a synthetic
/// method with the erased descriptor whose whole body forwards to the real
/// override. Both must be renamed as one.
#[derive(Default)]
pub struct BridgeMethodIndex {
    bridge_to_specialized: HashMap<Arc<MethodEntry>, Arc<MethodEntry>>,
    specialized_to_bridge: HashMap<Arc<MethodEntry>, Arc<MethodEntry>>,
}

impl BridgeMethodIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Detect bridges among all indexed methods. Runs after the reference
    /// pass, which recorded what each candidate's body invokes; runs before
    /// reference canonicalization, which needs the links found here.
    pub fn find_bridge_methods(&mut self, entries: &EntryIndex, references: &ReferenceIndex) {
        for method in entries.methods() {
            let Some(access) = entries.method_access(&method) else {
                continue;
            };
            if !access.is_synthetic() && !access.is_bridge() {
                continue;
            }

            if let Some(specialized) = find_bridged_method(&method, references) {
                self.bridge_to_specialized
                    .insert(method.clone(), specialized.clone());
                self.specialized_to_bridge.insert(specialized, method);
            }
        }
    }

    /// The bridge wrapping `method`, if the compiler emitted one.
    pub fn bridge_from_specialized(&self, method: &MethodEntry) -> Option<&Arc<MethodEntry>> {
        self.specialized_to_bridge.get(method)
    }

    /// The specialized method a bridge forwards to.
    pub fn specialized_from_bridge(&self, method: &MethodEntry) -> Option<&Arc<MethodEntry>> {
        self.bridge_to_specialized.get(method)
    }

    pub fn is_bridge_method(&self, method: &MethodEntry) -> bool {
        self.bridge_to_specialized.contains_key(method)
    }
}

/// The unique forwarding target of a bridge candidate, or `None` when the
/// body does not forward to exactly one plausibly-specialized sibling.
fn find_bridged_method(
    bridge: &Arc<MethodEntry>,
    references: &ReferenceIndex,
) -> Option<Arc<MethodEntry>> {
    let mut candidates = references
        .methods_referenced_by(bridge)
        .into_iter()
        .filter(|target| is_potential_bridge(bridge, target));

    let found = candidates.next()?.clone();
    if candidates.next().is_some() {
        return None;
    }

    Some(found)
}

fn is_potential_bridge(bridge: &Arc<MethodEntry>, target: &Arc<MethodEntry>) -> bool {
    // A bridge and its specialized method sit in the same class with the
    // same arity; every bridge-side type is the erased (reference-typed)
    // version of the specialized type, and the descriptors differ.
    target.parent() == bridge.parent()
        && target != bridge
        && bridge.desc() != target.desc()
        && bridge.desc().args.len() == target.desc().args.len()
        && bridge
            .desc()
            .args
            .iter()
            .zip(&target.desc().args)
            .all(|(b, t)| erases_to(t, b))
        && erases_to(&target.desc().ret, &bridge.desc().ret)
}

/// Whether `specialized` can erase to `bridge_side` under generic erasure or
/// covariant-return widening.
fn erases_to(specialized: &TypeDescriptor, bridge_side: &TypeDescriptor) -> bool {
    specialized == bridge_side
        || (bridge_side.is_object() && (specialized.is_object() || specialized.is_array()))
}

//! Resolution strategies, equivalence sets, and bridge-aware renames.

mod common;

use std::collections::HashSet;
use std::sync::Arc;

use common::*;
use jarmap::code_attribute::Instruction;
use jarmap::entry::Entry;
use jarmap::index::JarIndex;
use jarmap::mapping::{EntryMapping, EntryRemapper, TokenType};
use jarmap::resolve::ResolutionStrategy;

/// `a` declares `m()V`; `b extends a` and `c extends b` override it; `c`
/// also has an unrelated private `p()V`.
fn override_chain() -> JarIndex {
    let mut a = ClassBuilder::new("a", ACC_PUBLIC, OBJECT);
    a.method(ACC_PUBLIC, "m", "()V", &[Instruction::Return]);
    a.method(ACC_PUBLIC, "r", "()V", &[Instruction::Return]);
    let mut b = ClassBuilder::new("b", ACC_PUBLIC, "a");
    b.method(ACC_PUBLIC, "m", "()V", &[Instruction::Return]);
    let mut c = ClassBuilder::new("c", ACC_PUBLIC, "b");
    c.method(ACC_PUBLIC, "m", "()V", &[Instruction::Return]);
    c.method(ACC_PRIVATE, "p", "()V", &[Instruction::Return]);
    index_classes(vec![a, b, c])
}

#[test]
fn resolve_root_walks_to_the_furthest_declaration() {
    let index = override_chain();
    let resolver = index.resolver();

    let c_m = entry_of_method(&index, "c", "m", "()V");
    let resolved = resolver.resolve_entry(&c_m, ResolutionStrategy::Root);
    assert_eq!(resolved, vec![entry_of_method(&index, "a", "m", "()V")]);
}

#[test]
fn resolve_root_is_a_fixpoint() {
    let index = override_chain();
    let resolver = index.resolver();

    let c_m = entry_of_method(&index, "c", "m", "()V");
    let root = resolver.resolve_first_entry(&c_m, ResolutionStrategy::Root);
    let root_of_root = resolver.resolve_first_entry(&root, ResolutionStrategy::Root);
    assert_eq!(root, root_of_root);
}

#[test]
fn resolve_closest_keeps_declared_entries() {
    let index = override_chain();
    let resolver = index.resolver();

    let b_m = entry_of_method(&index, "b", "m", "()V");
    assert_eq!(
        resolver.resolve_entry(&b_m, ResolutionStrategy::Closest),
        vec![b_m.clone()]
    );

    // A reference against a non-existent override resolves to the nearest
    // declaring ancestor.
    let phantom = entry_of_method(&index, "c", "r", "()V");
    assert_eq!(
        resolver.resolve_entry(&phantom, ResolutionStrategy::Closest),
        vec![entry_of_method(&index, "a", "r", "()V")]
    );
}

#[test]
fn private_members_never_resolve_into_ancestors() {
    let mut a = ClassBuilder::new("a", ACC_PUBLIC, OBJECT);
    a.method(ACC_PRIVATE, "m", "()V", &[Instruction::Return]);
    let mut b = ClassBuilder::new("b", ACC_PUBLIC, "a");
    b.method(ACC_PRIVATE, "m", "()V", &[Instruction::Return]);
    let index = index_classes(vec![a, b]);
    let resolver = index.resolver();

    let b_m = entry_of_method(&index, "b", "m", "()V");
    assert_eq!(
        resolver.resolve_entry(&b_m, ResolutionStrategy::Root),
        vec![b_m.clone()]
    );
    assert_eq!(resolver.resolve_equivalent_entries(&b_m), vec![b_m]);
}

#[test]
fn equivalence_spans_the_override_chain() {
    let index = override_chain();
    let resolver = index.resolver();

    let members: Vec<Entry> = ["a", "b", "c"]
        .iter()
        .map(|class| entry_of_method(&index, class, "m", "()V"))
        .collect();

    for member in &members {
        let Entry::Method(method) = member else { unreachable!() };
        let set: HashSet<Entry> = resolver
            .resolve_equivalent_methods(method)
            .into_iter()
            .map(Entry::Method)
            .collect();
        assert_eq!(set, members.iter().cloned().collect());
    }
}

#[test]
fn equivalence_is_symmetric() {
    let index = override_chain();
    let resolver = index.resolver();

    let a_m = method_entry(&index, "a", "m", "()V");
    let c_m = method_entry(&index, "c", "m", "()V");

    let from_a: HashSet<_> = resolver.resolve_equivalent_methods(&a_m).into_iter().collect();
    let from_c: HashSet<_> = resolver.resolve_equivalent_methods(&c_m).into_iter().collect();
    assert!(from_a.contains(&c_m));
    assert!(from_c.contains(&a_m));
    assert_eq!(from_a, from_c);
}

#[test]
fn equivalence_spans_interface_implementations() {
    let mut i = ClassBuilder::new("i", ACC_PUBLIC | ACC_INTERFACE | ACC_ABSTRACT, OBJECT);
    i.abstract_method(ACC_PUBLIC | ACC_ABSTRACT, "m", "()V");
    let mut j = ClassBuilder::new("j", ACC_PUBLIC | ACC_INTERFACE | ACC_ABSTRACT, OBJECT);
    j.abstract_method(ACC_PUBLIC | ACC_ABSTRACT, "m", "()V");
    // One method implements two unrelated interfaces at once.
    let mut x = ClassBuilder::new("x", ACC_PUBLIC, OBJECT);
    x.interface("i");
    x.interface("j");
    x.method(ACC_PUBLIC, "m", "()V", &[Instruction::Return]);
    let index = index_classes(vec![i, j, x]);
    let resolver = index.resolver();

    let set: HashSet<_> = resolver
        .resolve_equivalent_methods(&method_entry(&index, "x", "m", "()V"))
        .into_iter()
        .collect();
    assert_eq!(
        set,
        HashSet::from([
            method_entry(&index, "i", "m", "()V"),
            method_entry(&index, "j", "m", "()V"),
            method_entry(&index, "x", "m", "()V"),
        ])
    );
}

/// `a` declares `Object get()`; `b extends a` specializes it to
/// `String get()`, with the compiler bridge `Object get()` forwarding to it.
fn covariant_bridge() -> JarIndex {
    let mut a = ClassBuilder::new("a", ACC_PUBLIC, OBJECT);
    a.method(
        ACC_PUBLIC,
        "get",
        "()Ljava/lang/Object;",
        &[Instruction::Aconstnull, Instruction::Areturn],
    );
    let mut b = ClassBuilder::new("b", ACC_PUBLIC, "a");
    let specialized_ref = b.method_ref("b", "get", "()Ljava/lang/String;");
    b.method(
        ACC_PUBLIC,
        "get",
        "()Ljava/lang/String;",
        &[Instruction::Aconstnull, Instruction::Areturn],
    );
    b.method(
        ACC_PUBLIC | ACC_BRIDGE | ACC_SYNTHETIC,
        "get",
        "()Ljava/lang/Object;",
        &[
            Instruction::Aload0,
            Instruction::Invokevirtual(specialized_ref),
            Instruction::Areturn,
        ],
    );
    index_classes(vec![a, b])
}

#[test]
fn bridge_links_are_detected() {
    let index = covariant_bridge();
    let specialized = method_entry(&index, "b", "get", "()Ljava/lang/String;");
    let bridge = method_entry(&index, "b", "get", "()Ljava/lang/Object;");

    assert_eq!(
        index.bridge_method_index().bridge_from_specialized(&specialized),
        Some(&bridge)
    );
    assert_eq!(
        index.bridge_method_index().specialized_from_bridge(&bridge),
        Some(&specialized)
    );
    assert!(index.bridge_method_index().is_bridge_method(&bridge));
    assert!(!index.bridge_method_index().is_bridge_method(&specialized));
}

#[test]
fn bridge_joins_the_equivalence_set() {
    let index = covariant_bridge();
    let resolver = index.resolver();

    let specialized = method_entry(&index, "b", "get", "()Ljava/lang/String;");
    let set: HashSet<_> = resolver
        .resolve_equivalent_methods(&specialized)
        .into_iter()
        .collect();

    assert_eq!(
        set,
        HashSet::from([
            specialized.clone(),
            method_entry(&index, "b", "get", "()Ljava/lang/Object;"),
            method_entry(&index, "a", "get", "()Ljava/lang/Object;"),
        ])
    );
}

#[test]
fn specialized_methods_resolve_through_their_bridge() {
    let index = covariant_bridge();
    let resolver = index.resolver();

    let specialized = entry_of_method(&index, "b", "get", "()Ljava/lang/String;");
    let resolved = resolver.resolve_entry(&specialized, ResolutionStrategy::Root);
    assert_eq!(
        resolved,
        vec![entry_of_method(&index, "a", "get", "()Ljava/lang/Object;")]
    );
}

#[test]
fn renaming_the_root_reaches_the_specialized_override() {
    let index = covariant_bridge();
    let mut remapper = EntryRemapper::new(Arc::new(index));

    let root = entry_of_method(remapper.jar_index(), "a", "get", "()Ljava/lang/Object;");
    let (committed, messages) = with_vc(|vc| {
        remapper.put_mapping(vc, &root, EntryMapping::deobfuscated("getThing"))
    });
    assert!(committed);
    assert!(messages.is_empty());

    let specialized =
        entry_of_method(remapper.jar_index(), "b", "get", "()Ljava/lang/String;");
    let translated = remapper.deobfuscate(&specialized);
    assert_eq!(translated.value, "getThing");
    assert_eq!(translated.token_type, TokenType::Deobfuscated);

    let bridge = entry_of_method(remapper.jar_index(), "b", "get", "()Ljava/lang/Object;");
    assert_eq!(remapper.deobfuscate(&bridge).value, "getThing");
}
